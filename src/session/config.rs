//! Session configuration

use super::mastery::MasteryRules;
use super::state::Mode;
use crate::fretboard::Spelling;
use crate::storage::TableKey;
use std::time::Duration;

/// Tunables for one game session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub spelling: Spelling,
    /// Countdown for random mode
    pub round_budget: Duration,
    /// Correct answers at or above this latency do not count toward mastery
    pub response_threshold: Duration,
    /// Consecutive fast correct answers needed to learn a position
    pub learned_threshold: u32,
    /// How long the "learned" banner stays up
    pub banner_duration: Duration,
}

impl SessionConfig {
    pub fn new(mode: Mode, spelling: Spelling) -> Self {
        SessionConfig {
            mode,
            spelling,
            ..Self::default()
        }
    }

    pub fn mastery_rules(&self) -> MasteryRules {
        MasteryRules {
            response_threshold: self.response_threshold,
            learned_threshold: self.learned_threshold,
        }
    }

    /// Progress table this session reads and writes
    pub fn table_key(&self) -> TableKey {
        TableKey {
            mode: self.mode,
            spelling: self.spelling,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            mode: Mode::Random,
            spelling: Spelling::Sharps,
            round_budget: Duration::from_secs(120),
            response_threshold: Duration::from_secs(5),
            learned_threshold: 3,
            banner_duration: Duration::from_secs(5),
        }
    }
}
