use crate::{PieceKind, Position};

/// Errors raised while validating environment dimensions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{axis} must be at least {min}, got {value}")]
    DimensionTooSmall {
        axis: &'static str,
        value: usize,
        min: usize,
    },

    #[error("a {width}x{height} board cannot hold four distinct pieces")]
    TooFewCells { width: usize, height: usize },
}

/// Errors raised when a hand-built board is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("{kind:?} at {position} is out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        kind: PieceKind,
        position: Position,
        width: usize,
        height: usize,
    },

    #[error("{first:?} and {second:?} both occupy {position}")]
    Overlap {
        first: PieceKind,
        second: PieceKind,
        position: Position,
    },

    #[error("board is {found_width}x{found_height}, environment expects {width}x{height}")]
    SizeMismatch {
        width: usize,
        height: usize,
        found_width: usize,
        found_height: usize,
    },
}

/// Usage errors surfaced by the environment engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("step called before reset")]
    NotReset,

    #[error("episode has terminated, call reset before stepping again")]
    EpisodeTerminated,

    #[error("invalid board: {0}")]
    Board(#[from] BoardError),
}
