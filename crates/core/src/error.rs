//! Error taxonomy for level access, generation, and placement.

use thiserror::Error;

use crate::types::{LevelKind, OccupantId, Pos};

/// What stood in the way of a spawn or move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blocker {
    Wall,
    Object,
    Occupant(OccupantId),
}

/// Contract violations by the caller rather than gameplay outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("occupant {0:?} is not placed on this level")]
    NotPlaced(OccupantId),
    #[error("occupant {0:?} is already placed")]
    AlreadyPlaced(OccupantId),
    #[error("occupant {0:?} is not registered")]
    UnknownOccupant(OccupantId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("a {width}x{height} grid has no interior to carve")]
    NoInterior { width: usize, height: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DungeonError {
    #[error("position ({}, {}) is outside the level", .pos.x, .pos.y)]
    OutOfBounds { pos: Pos },
    #[error("position ({}, {}) is blocked by {blocker:?}", .pos.x, .pos.y)]
    Blocked { pos: Pos, blocker: Blocker },
    #[error("{kind:?} depth {depth} is outside 1..={max}")]
    InvalidDepth { kind: LevelKind, depth: u8, max: u8 },
    #[error(transparent)]
    InvalidUsage(#[from] UsageError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl DungeonError {
    /// Outcomes a player sees as "you can't go that way"; everything else is a bug upstream.
    pub fn is_gameplay_refusal(&self) -> bool {
        matches!(self, DungeonError::OutOfBounds { .. } | DungeonError::Blocked { .. })
    }
}
