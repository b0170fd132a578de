//! Fretboard model: positions, notes, answer keys and the sequential sweep
//!
//! # Components
//! - `note.rs`: Position, NoteIdentity and the standard-tuning mapping
//! - `sequence.rs`: Fixed traversal order for sequential mode

pub mod note;
pub mod sequence;

pub use note::{note_at, NoteIdentity, Position, Spelling, FRET_COUNT, POSITION_COUNT, STRING_COUNT};
pub use sequence::SequentialOrder;
