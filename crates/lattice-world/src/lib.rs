//! Lattice world simulation.
//!
//! This module implements the 2D occupancy grid, the stochastic update engine
//! that moves occupied cells around, and the collaborators that observe it.

pub mod grid;
pub mod engine;
pub mod session;
pub mod render;

pub use grid::Grid;
pub use engine::{Candidate, MoveOutcome, RejectReason, TickReport, UpdateEngine};
pub use session::Session;
pub use render::{Frame, GridView, PixelRenderer, Renderer, SnapshotRenderer, TextRenderer};
