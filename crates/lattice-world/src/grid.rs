//! 2D occupancy grid for the lattice.

use lattice_core::{GridConfig, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A square grid of occupied/empty cells with open (non-wrapping) edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create an empty `size × size` grid
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    /// Create a grid where each cell is independently occupied with
    /// probability `density`
    pub fn random<R: Rng + ?Sized>(size: usize, density: f64, rng: &mut R) -> Self {
        let mut grid = Self::new(size);
        grid.initialize(density, rng);
        grid
    }

    /// Create a randomly seeded grid from configuration
    pub fn from_config<R: Rng + ?Sized>(config: &GridConfig, rng: &mut R) -> Self {
        Self::random(config.size, config.density, rng)
    }

    /// Overwrite every cell with a fresh random draw
    pub fn initialize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) {
        for cell in &mut self.cells {
            *cell = rng.gen::<f64>() < density;
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, pos: Position) -> bool {
        let n = self.size as i64;
        (0..n).contains(&(pos.row as i64)) && (0..n).contains(&(pos.col as i64))
    }

    /// Occupancy at `(row, col)`; `false` for anything outside the grid
    pub fn get(&self, row: i32, col: i32) -> bool {
        self.get_pos(Position::new(row, col))
    }

    pub fn get_pos(&self, pos: Position) -> bool {
        match self.index(pos) {
            Some(index) => self.cells[index],
            None => false,
        }
    }

    /// Write occupancy at an in-range position.
    ///
    /// Out-of-range writes are ignored; callers only produce them through a
    /// logic error, which is caught by the debug assertion.
    pub fn set(&mut self, pos: Position, value: bool) {
        debug_assert!(self.contains(pos), "write outside grid at {pos}");
        if let Some(index) = self.index(pos) {
            self.cells[index] = value;
        }
    }

    /// Number of occupied orthogonal neighbours of `pos`
    pub fn occupied_neighbors(&self, pos: Position) -> usize {
        pos.neighbors().filter(|&n| self.get_pos(n)).count()
    }

    /// Total number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.row as usize * self.size + pos.col as usize)
        } else {
            None
        }
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let row = (index / self.size) as i32;
        let col = (index % self.size) as i32;
        Position::new(row, col)
    }

    /// Iterator over all cells with positions, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Position, bool)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (self.index_to_pos(i), cell))
    }

    /// Rows of the grid as slices
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells.chunks(self.size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10);
        assert_eq!(grid.size(), 10);
        assert_eq!(grid.cells.len(), 100);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new(4);
        grid.set(Position::new(1, 2), true);
        assert!(grid.get(1, 2));
        assert!(!grid.get(2, 1));
        grid.set(Position::new(1, 2), false);
        assert!(!grid.get(1, 2));
    }

    #[test]
    fn test_out_of_range_reads_are_empty() {
        let mut grid = Grid::new(4);
        for pos in grid.iter().map(|(p, _)| p).collect::<Vec<_>>() {
            grid.set(pos, true);
        }

        assert!(!grid.get(-1, 0));
        assert!(!grid.get(0, -1));
        assert!(!grid.get(4, 0));
        assert!(!grid.get(0, 4));
        assert!(!grid.get(4, 4));
        assert!(!grid.get(i32::MAX, i32::MIN));
    }

    #[test]
    fn test_no_wraparound_between_rows() {
        let mut grid = Grid::new(4);
        // (1, 0) is the next flat index after (0, 3)
        grid.set(Position::new(1, 0), true);
        assert!(!grid.get(0, 4));
        // (0, 3) is the previous flat index before (1, 0)
        grid.set(Position::new(0, 3), true);
        assert!(!grid.get(1, -1));
    }

    #[test]
    fn test_occupied_neighbors_at_edge() {
        let mut grid = Grid::new(3);
        grid.set(Position::new(0, 1), true);
        grid.set(Position::new(1, 0), true);
        grid.set(Position::new(1, 1), true);

        assert_eq!(grid.occupied_neighbors(Position::new(0, 0)), 2);
        assert_eq!(grid.occupied_neighbors(Position::new(1, 1)), 2);
        assert_eq!(grid.occupied_neighbors(Position::new(3, 1)), 0);
        assert_eq!(grid.occupied_neighbors(Position::new(2, 2)), 0);
    }

    #[test]
    fn test_random_density() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let grid = Grid::random(100, 0.1, &mut rng);
        let fraction = grid.occupied_count() as f64 / 10_000.0;
        assert!((fraction - 0.1).abs() < 0.02, "fraction was {fraction}");

        let empty = Grid::random(10, 0.0, &mut rng);
        assert_eq!(empty.occupied_count(), 0);
        let full = Grid::random(10, 1.0, &mut rng);
        assert_eq!(full.occupied_count(), 100);
    }

    #[test]
    fn test_initialize_overwrites_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = Grid::random(8, 1.0, &mut rng);
        grid.initialize(0.0, &mut rng);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.size(), 8);
    }

    #[test]
    fn test_grid_from_config() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = GridConfig {
            size: 20,
            density: 0.5,
            seed: None,
        };
        let grid = Grid::from_config(&config, &mut rng);
        assert_eq!(grid.size(), 20);
        assert!(grid.occupied_count() > 0);
    }

    #[test]
    fn test_rows_and_index_roundtrip() {
        let grid = Grid::new(5);
        assert_eq!(grid.rows().count(), 5);
        assert!(grid.rows().all(|row| row.len() == 5));
        assert_eq!(grid.index_to_pos(7), Position::new(1, 2));
    }
}
