//! Session state types
//!
//! Maintains:
//! - Game mode and lifecycle phase
//! - The per-round view handed to the renderer
//! - The end-of-session summary

use crate::fretboard::{Position, Spelling};
use std::time::Duration;

/// Which way positions are chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Timed practice with weighted selection
    #[default]
    Random,
    /// Untimed sweep over every position in a fixed order
    Sequential,
}

/// Lifecycle of a game session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Playing,
    /// Time ran out or the sweep finished
    Completed,
    /// The learner pressed exit
    Aborted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Aborted)
    }
}

/// Everything the renderer needs to draw one round
#[derive(Clone, Debug, PartialEq)]
pub struct RoundView {
    pub position: Position,
    pub mode: Mode,
    pub spelling: Spelling,
    pub score: u32,
    pub high_score: u32,
    /// Countdown (random) or elapsed (sequential) seconds
    pub clock_secs: u64,
    /// 1-based index into the sweep (sequential only)
    pub sweep_index: usize,
    pub sweep_len: usize,
    pub learned: usize,
    pub total: usize,
    /// Position learned within the banner window
    pub banner: Option<Position>,
}

impl RoundView {
    pub fn progress_percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.learned * 100 / self.total
        }
    }
}

/// Final report once a session reaches a terminal phase
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub outcome: Phase,
    pub mode: Mode,
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub elapsed: Duration,
    pub answers: u32,
    /// `None` when nothing was answered
    pub accuracy: Option<f32>,
    /// Positions completed in the sweep
    pub swept: usize,
    pub learned: usize,
    pub total: usize,
}

impl Summary {
    pub fn progress_percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.learned * 100 / self.total
        }
    }
}
