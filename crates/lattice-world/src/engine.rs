//! Stochastic update engine.
//!
//! One tick attempts a fixed number of candidate moves. Each candidate picks an
//! occupied source cell and an empty destination, scores both positions by
//! their occupied orthogonal neighbours, and accepts the move with the logistic
//! probability `1 / (1 + exp(ΔE / T))`.

use crate::grid::Grid;
use lattice_core::{EngineConfig, MoveMethod, Position, TickParams};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A proposed relocation from `src` to `dst`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub src: Position,
    pub dst: Position,
}

impl Candidate {
    pub fn new(src: Position, dst: Position) -> Self {
        Self { src, dst }
    }
}

/// Why a candidate was dropped before any state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    SelfMove,
    OutOfBounds,
    SourceEmpty,
    DestinationOccupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Rejected(RejectReason),
    /// The cell moved to the destination
    Committed,
    /// The draw failed and the cell went back to its source
    Reverted,
}

/// Per-tick outcome counts, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub candidates: usize,
    pub self_moves: usize,
    pub out_of_bounds: usize,
    pub source_empty: usize,
    pub destination_occupied: usize,
    pub committed: usize,
    pub reverted: usize,
}

impl TickReport {
    pub fn record(&mut self, outcome: MoveOutcome) {
        self.candidates += 1;
        match outcome {
            MoveOutcome::Rejected(RejectReason::SelfMove) => self.self_moves += 1,
            MoveOutcome::Rejected(RejectReason::OutOfBounds) => self.out_of_bounds += 1,
            MoveOutcome::Rejected(RejectReason::SourceEmpty) => self.source_empty += 1,
            MoveOutcome::Rejected(RejectReason::DestinationOccupied) => {
                self.destination_occupied += 1
            }
            MoveOutcome::Committed => self.committed += 1,
            MoveOutcome::Reverted => self.reverted += 1,
        }
    }

    pub fn rejected(&self) -> usize {
        self.self_moves + self.out_of_bounds + self.source_empty + self.destination_occupied
    }

    /// Committed moves over evaluated (non-rejected) candidates
    pub fn acceptance_ratio(&self) -> f64 {
        let evaluated = self.committed + self.reverted;
        if evaluated == 0 {
            0.0
        } else {
            self.committed as f64 / evaluated as f64
        }
    }
}

/// Logistic acceptance probability for an energy change at temperature `t`
pub fn acceptance_probability(delta_e: f64, temperature: f64) -> f64 {
    1.0 / (1.0 + (delta_e / temperature).exp())
}

/// Negated count of occupied orthogonal neighbours
pub fn local_energy(grid: &Grid, pos: Position) -> i32 {
    -(grid.occupied_neighbors(pos) as i32)
}

#[derive(Debug, Clone)]
pub struct UpdateEngine {
    move_fraction: f64,
}

impl Default for UpdateEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl UpdateEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            move_fraction: config.move_fraction,
        }
    }

    /// Candidate moves per tick for a `size × size` grid (fraction truncated)
    pub fn candidates_per_tick(&self, size: usize) -> usize {
        ((size * size) as f64 * self.move_fraction) as usize
    }

    /// Draw a source uniformly and a destination according to `method`
    pub fn propose<R: Rng + ?Sized>(&self, size: usize, method: MoveMethod, rng: &mut R) -> Candidate {
        let n = size as i32;
        let src = Position::new(rng.gen_range(0..n), rng.gen_range(0..n));
        let dst = match method {
            MoveMethod::Adjacent => src.add(rng.gen_range(-1..=1), rng.gen_range(-1..=1)),
            MoveMethod::Teleport => Position::new(rng.gen_range(0..n), rng.gen_range(0..n)),
        };
        Candidate::new(src, dst)
    }

    /// Cheap checks that drop a candidate without touching the grid.
    ///
    /// The row upper bound is `row > N`, not `row >= N`: a destination one row
    /// past the bottom edge passes this check and is handled by the sentinel
    /// reads and the commit guard in [`UpdateEngine::attempt`].
    pub fn screen(grid: &Grid, candidate: &Candidate) -> Option<RejectReason> {
        let n = grid.size() as i32;
        let Candidate { src, dst } = *candidate;

        if dst == src {
            return Some(RejectReason::SelfMove);
        }
        if dst.col < 0 || dst.col >= n || dst.row < 0 || dst.row > n {
            return Some(RejectReason::OutOfBounds);
        }
        if !grid.get_pos(src) {
            return Some(RejectReason::SourceEmpty);
        }
        if grid.get_pos(dst) {
            return Some(RejectReason::DestinationOccupied);
        }
        None
    }

    /// Evaluate one candidate against the grid.
    ///
    /// `draw` supplies the uniform `r ∈ [0, 1)` and is only called when the
    /// candidate survives screening.
    pub fn attempt<F>(grid: &mut Grid, candidate: Candidate, temperature: f64, draw: F) -> MoveOutcome
    where
        F: FnOnce() -> f64,
    {
        if let Some(reason) = Self::screen(grid, &candidate) {
            return MoveOutcome::Rejected(reason);
        }
        let Candidate { src, dst } = candidate;

        // Lift the cell so it doesn't count as its own neighbour.
        grid.set(src, false);

        let e1 = local_energy(grid, src);
        let e2 = local_energy(grid, dst);
        let delta_e = f64::from(e2 - e1);
        let q = acceptance_probability(delta_e, temperature);
        let r = draw();

        if r < q && grid.contains(dst) {
            grid.set(dst, true);
            MoveOutcome::Committed
        } else {
            if r < q {
                trace!(src = %src, dst = %dst, "Accepted move lands outside grid, restoring source");
            }
            grid.set(src, true);
            MoveOutcome::Reverted
        }
    }

    /// Run one tick over the grid
    pub fn tick<R: Rng + ?Sized>(&self, grid: &mut Grid, params: &TickParams, rng: &mut R) -> TickReport {
        let size = grid.size();
        let mut report = TickReport::default();

        for _ in 0..self.candidates_per_tick(size) {
            let candidate = self.propose(size, params.move_method, rng);
            let outcome = Self::attempt(grid, candidate, params.temperature, || rng.gen::<f64>());
            report.record(outcome);
        }

        trace!(
            candidates = report.candidates,
            rejected = report.rejected(),
            committed = report.committed,
            reverted = report.reverted,
            "Tick complete"
        );
        report
    }
}
