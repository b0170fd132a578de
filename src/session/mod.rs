//! Session engine: mastery tracking, position selection and the game loop
//!
//! # Components
//! - `mastery.rs`: Per-position mastery records and their persistence
//! - `selector.rs`: Weighted random position selection
//! - `clock.rs`: Session countdown/elapsed timer and round latency
//! - `score.rs`: Score and answer totals
//! - `state.rs`: Mode, lifecycle phase, round view and summary
//! - `config.rs`: Session tunables
//! - `game.rs`: GameSession state machine and its I/O collaborators

pub mod clock;
pub mod config;
pub mod game;
pub mod mastery;
pub mod score;
pub mod selector;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use config::SessionConfig;
pub use game::{AnswerSource, GameSession, InputEvent, Progress, Renderer};
pub use mastery::{MasteryRecord, MasteryStore};
pub use state::{Mode, Phase, RoundView, Summary};
