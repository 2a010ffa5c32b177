//! Core type definitions for the simulation.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Orthogonal (4-connected) neighbour offsets as `(row, col)` deltas.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Cell coordinate on the lattice.
///
/// Coordinates are signed so that proposed destinations may step off the
/// edge of the grid; such positions are never stored, only read through the
/// grid's out-of-range sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn add(&self, dr: i32, dc: i32) -> Self {
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    /// The four orthogonal neighbours, in `NEIGHBOR_OFFSETS` order
    pub fn neighbors(&self) -> impl Iterator<Item = Position> + '_ {
        NEIGHBOR_OFFSETS.iter().map(move |&(dr, dc)| self.add(dr, dc))
    }

    /// Chebyshev (king-move) distance to another position
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// How destination coordinates are proposed for a candidate move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveMethod {
    /// Step to one of the eight surrounding cells (or stay put)
    #[default]
    Adjacent,
    /// Jump to any cell of the grid
    Teleport,
}

impl MoveMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveMethod::Adjacent => "adjacent",
            MoveMethod::Teleport => "teleport",
        }
    }
}

impl fmt::Display for MoveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adjacent" => Ok(MoveMethod::Adjacent),
            "teleport" => Ok(MoveMethod::Teleport),
            _ => Err(Error::InvalidMoveMethod(s.to_string())),
        }
    }
}
