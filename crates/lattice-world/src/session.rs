//! Simulation session owning the grid for the lifetime of a run.

use crate::engine::{TickReport, UpdateEngine};
use crate::grid::Grid;
use lattice_core::{EngineConfig, GridConfig, TickParams};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

/// Owns the grid, the engine and the random stream.
///
/// Nothing outside the session mutates the grid; observers get a shared
/// reference through [`Session::grid`].
pub struct Session {
    grid: Grid,
    engine: UpdateEngine,
    rng: ChaCha8Rng,
    seed: u64,
    ticks: u64,
}

impl Session {
    pub fn new(grid_config: &GridConfig, engine_config: &EngineConfig) -> Self {
        let seed = grid_config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = Grid::from_config(grid_config, &mut rng);

        info!(
            event = "session_created",
            size = grid.size(),
            density = grid_config.density,
            seed = seed,
            occupied = grid.occupied_count(),
            "Seeded lattice"
        );

        Self {
            grid,
            engine: UpdateEngine::new(engine_config),
            rng,
            seed,
            ticks: 0,
        }
    }

    /// Start from an existing grid
    pub fn from_grid(grid: Grid, engine: UpdateEngine, seed: u64) -> Self {
        Self {
            grid,
            engine,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            ticks: 0,
        }
    }

    /// Advance the simulation by one tick
    pub fn tick(&mut self, params: &TickParams) -> TickReport {
        let report = self.engine.tick(&mut self.grid, params, &mut self.rng);
        self.ticks += 1;
        report
    }

    /// Run `ticks` ticks with fixed parameters
    #[instrument(skip(self), fields(seed = self.seed))]
    pub fn run(&mut self, ticks: u64, params: &TickParams) -> TickReport {
        info!("Running {} ticks at T={:.2}", ticks, params.temperature);

        let mut last = TickReport::default();
        for _ in 0..ticks {
            last = self.tick(params);
        }

        info!(
            event = "run_complete",
            ticks = self.ticks,
            occupied = self.grid.occupied_count(),
            "Run complete"
        );
        last
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
