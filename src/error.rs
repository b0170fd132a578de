//! Error taxonomy for the trainer core
//!
//! Only I/O failures reach the user. Corrupt progress files are recovered
//! where they are loaded, and out-of-range positions cannot be produced by
//! the selector or the sequential order.

use crate::session::Phase;

/// Errors raised by the fretboard model, persistence and session driver
#[derive(Debug, thiserror::Error)]
pub enum FretboardError {
    #[error("position out of range: string {string}, fret {fret}")]
    OutOfRange { string: usize, fret: usize },

    #[error("persisted data is corrupt: {0}")]
    PersistenceCorrupt(String),

    #[error("session cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: Phase, to: Phase },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FretboardError>;
