//! Fretboard note trainer engine
//!
//! The engine decides which position to quiz, tracks per-position mastery
//! and drives a session to completion. Terminal I/O lives in `cli` behind
//! the `AnswerSource` and `Renderer` traits.

pub mod cli;
pub mod error;
pub mod fretboard;
pub mod session;
pub mod storage;

pub use error::{FretboardError, Result};
