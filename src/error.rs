use thiserror::Error;

use crate::magic::Slider;

/// Errors surfaced by table construction and by the string-facing board API.
///
/// Construction errors (`MagicNumberNotFound`, `TableNotInitialized`,
/// `HashKeysNotInitialized`) mean the tables were built in the wrong order or
/// with a bad configuration; callers are expected to abort start-up on them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid magic numbers: no magic number found for {slider} on square {square}")]
    MagicNumberNotFound { square: u8, slider: Slider },

    #[error("invalid magic numbers: magic numbers not initialised")]
    TableNotInitialized,

    #[error("invalid hash keys: hash keys not initialised")]
    HashKeysNotInitialized,

    #[error("invalid FEN '{0}'")]
    InvalidFen(String),

    #[error("invalid move notation '{0}'")]
    InvalidMoveNotation(String),

    #[error("no pseudo-legal move matches '{0}'")]
    NoMatchingMove(String),

    #[error("move '{0}' leaves the king in check")]
    IllegalMove(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
