//! Render collaborators that observe the grid after each tick.

use crate::grid::Grid;
use lattice_core::{Position, RenderConfig};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Read-only view of a lattice
pub trait GridView {
    fn size(&self) -> usize;
    fn get(&self, row: i32, col: i32) -> bool;
}

impl GridView for Grid {
    fn size(&self) -> usize {
        Grid::size(self)
    }

    fn get(&self, row: i32, col: i32) -> bool {
        Grid::get(self, row, col)
    }
}

/// Consumes the grid state after a tick
pub trait Renderer {
    fn render(&mut self, view: &dyn GridView, tick: u64);
}

/// Owned copy of the grid at a given tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub size: usize,
    pub tick: u64,
    cells: Vec<bool>,
}

impl Frame {
    pub fn capture(view: &dyn GridView, tick: u64) -> Self {
        let size = view.size();
        let mut cells = Vec::with_capacity(size * size);
        for row in 0..size as i32 {
            for col in 0..size as i32 {
                cells.push(view.get(row, col));
            }
        }
        Self { size, tick, cells }
    }

    pub fn empty() -> Self {
        Self {
            size: 0,
            tick: 0,
            cells: Vec::new(),
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// One string per row, `#` for occupied and `.` for empty
    pub fn text_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.size.max(1))
            .map(|row| row.iter().map(|&c| if c { '#' } else { '.' }).collect())
            .collect()
    }
}

impl GridView for Frame {
    fn size(&self) -> usize {
        self.size
    }

    fn get(&self, row: i32, col: i32) -> bool {
        let n = self.size as i32;
        if (0..n).contains(&row) && (0..n).contains(&col) {
            self.cells[(row * n + col) as usize]
        } else {
            false
        }
    }
}

/// Publishes each frame into a shared slot for concurrent readers
#[derive(Clone)]
pub struct SnapshotRenderer {
    latest: Arc<RwLock<Frame>>,
}

impl SnapshotRenderer {
    pub fn new() -> Self {
        Self {
            latest: Arc::new(RwLock::new(Frame::empty())),
        }
    }

    /// Clone of the most recently published frame
    pub fn latest(&self) -> Frame {
        self.latest.read().clone()
    }

    pub fn latest_tick(&self) -> u64 {
        self.latest.read().tick
    }
}

impl Default for SnapshotRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for SnapshotRenderer {
    fn render(&mut self, view: &dyn GridView, tick: u64) {
        let frame = Frame::capture(view, tick);
        *self.latest.write() = frame;
    }
}

/// Plain-text rendering, one line per row
#[derive(Debug, Default)]
pub struct TextRenderer {
    text: String,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, view: &dyn GridView, _tick: u64) {
        let size = view.size();
        self.text.clear();
        self.text.reserve(size * (size + 1));
        for row in 0..size as i32 {
            for col in 0..size as i32 {
                self.text.push(if view.get(row, col) { '#' } else { '.' });
            }
            self.text.push('\n');
        }
    }
}

/// RGB raster with each cell drawn as a `cell_size` square
#[derive(Debug)]
pub struct PixelRenderer {
    config: RenderConfig,
    width: usize,
    pixels: Vec<u8>,
}

impl PixelRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            width: 0,
            pixels: Vec::new(),
        }
    }

    /// Image edge length in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Colour of the pixel at `(x, y)`
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.width {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// Encode the current raster as binary PPM
    pub fn to_ppm(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.width);
        let mut out = Vec::with_capacity(header.len() + self.pixels.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&self.pixels);
        out
    }
}

impl Renderer for PixelRenderer {
    fn render(&mut self, view: &dyn GridView, _tick: u64) {
        let cell = self.config.cell_size;
        let size = view.size();
        self.width = size * cell;
        self.pixels.resize(self.width * self.width * 3, 0);

        for y in 0..self.width {
            for x in 0..self.width {
                let pos = Position::new((y / cell) as i32, (x / cell) as i32);
                let color = if view.get(pos.row, pos.col) {
                    self.config.occupied_color
                } else {
                    self.config.empty_color
                };
                let i = (y * self.width + x) * 3;
                self.pixels[i..i + 3].copy_from_slice(&color);
            }
        }
    }
}
