//! Game session driver
//!
//! One run moves Init → Playing → Completed | Aborted. Progress and the
//! high score are read when play starts and written once when the run ends.
//! The countdown is only checked when input returns control, so an answer
//! already given when time runs out is still scored.

use super::clock::{Clock, RoundTimer, SessionClock};
use super::config::SessionConfig;
use super::mastery::{MasteryRecord, MasteryStore};
use super::score::Scorer;
use super::selector::PositionSelector;
use super::state::{Mode, Phase, RoundView, Summary};
use crate::error::{FretboardError, Result};
use crate::fretboard::{NoteIdentity, Position, SequentialOrder, POSITION_COUNT};
use crate::storage::{self, Storage};
use rand::rngs::StdRng;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One event from the input collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// An answer key and when it was pressed
    Answer { key: char, at: Instant },
    /// Explicit exit
    Exit,
    /// Nothing pressed within the poll window
    Idle,
}

/// Blocking source of answers
pub trait AnswerSource {
    /// Called as each new position is presented
    fn begin_round(&mut self) -> Result<()> {
        Ok(())
    }

    fn await_answer(&mut self) -> Result<InputEvent>;
}

/// Draws rounds and results
pub trait Renderer {
    fn show_round(&mut self, view: &RoundView) -> Result<()>;

    /// A wrong answer was given for the position in `view`
    fn show_wrong(&mut self, view: &RoundView) -> Result<()>;

    fn show_summary(&mut self, summary: &Summary) -> Result<()>;
}

/// Where learning progress and the high score live between runs
pub struct Progress {
    pub learning: Box<dyn Storage>,
    pub high_score: Box<dyn Storage>,
}

/// Result of one scored answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundOutcome {
    pub correct: bool,
    /// Correct, but at or over the response threshold
    pub slow: bool,
    pub just_learned: bool,
    pub record: MasteryRecord,
}

/// A single quiz run
pub struct GameSession<R: Rng = StdRng> {
    config: SessionConfig,
    progress: Progress,
    phase: Phase,
    mastery: MasteryStore,
    /// Stored high score as loaded at start
    high_score: u32,
    selector: PositionSelector<R>,
    sweep: SequentialOrder,
    scorer: Scorer,
    clock: Option<SessionClock>,
    previous: Option<Position>,
    banner: Option<(Position, Instant)>,
    loaded: bool,
}

impl<R: Rng> GameSession<R> {
    pub fn new(config: SessionConfig, progress: Progress, rng: R) -> Self {
        let mastery = MasteryStore::new(config.mastery_rules());
        GameSession {
            config,
            progress,
            phase: Phase::Init,
            mastery,
            high_score: 0,
            selector: PositionSelector::new(rng),
            sweep: SequentialOrder::new(),
            scorer: Scorer::new(),
            clock: None,
            previous: None,
            banner: None,
            loaded: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mastery(&self) -> &MasteryStore {
        &self.mastery
    }

    fn transition(&mut self, to: Phase) -> Result<()> {
        let allowed = matches!(
            (self.phase, to),
            (Phase::Init, Phase::Playing)
                | (Phase::Playing, Phase::Completed)
                | (Phase::Playing, Phase::Aborted)
        );
        if !allowed {
            return Err(FretboardError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }

    /// Read progress and the high score ahead of play. Only allowed before
    /// the session starts; `start` skips the read once this has run.
    pub fn load_progress(&mut self) -> Result<()> {
        if self.phase != Phase::Init {
            return Err(FretboardError::InvalidTransition {
                from: self.phase,
                to: Phase::Playing,
            });
        }
        self.mastery = MasteryStore::load(
            &*self.progress.learning,
            self.config.table_key(),
            self.config.mastery_rules(),
        )?;
        self.high_score = storage::load_high_score(&*self.progress.high_score)?;
        self.loaded = true;
        Ok(())
    }

    /// Init → Playing: load progress if needed and start the session clock
    pub fn start(&mut self, now: Instant) -> Result<()> {
        if self.phase != Phase::Init {
            return Err(FretboardError::InvalidTransition {
                from: self.phase,
                to: Phase::Playing,
            });
        }
        if !self.loaded {
            self.load_progress()?;
        }
        self.clock = Some(match self.config.mode {
            Mode::Random => SessionClock::countdown(now, self.config.round_budget),
            Mode::Sequential => SessionClock::count_up(now),
        });
        self.transition(Phase::Playing)?;
        info!(
            mode = ?self.config.mode,
            spelling = ?self.config.spelling,
            learned = self.mastery.learned_count(),
            high_score = self.high_score,
            "session started"
        );
        Ok(())
    }

    /// Next position to present; `None` once the sweep is exhausted
    pub fn next_position(&mut self) -> Option<Position> {
        if self.phase != Phase::Playing {
            return None;
        }
        let next = match self.config.mode {
            Mode::Random => self.selector.select(&self.mastery, self.previous),
            Mode::Sequential => self.sweep.next(),
        };
        if next.is_some() {
            self.previous = next;
        }
        next
    }

    /// Score one answer for `position`
    pub fn answer(
        &mut self,
        position: Position,
        chosen: NoteIdentity,
        latency: Duration,
        at: Instant,
    ) -> Result<RoundOutcome> {
        if self.phase != Phase::Playing {
            return Err(FretboardError::InvalidTransition {
                from: self.phase,
                to: Phase::Playing,
            });
        }
        let correct = chosen == position.note();
        let slow = correct && latency >= self.config.response_threshold;
        let update = self.mastery.record(position, correct, latency);
        self.scorer.record(correct, latency, slow);
        if update.just_learned {
            self.banner = Some((position, at));
        }
        debug!(
            %position,
            correct,
            latency_ms = latency.as_millis() as u64,
            streak = update.record.correct_streak,
            "answer scored"
        );
        Ok(RoundOutcome {
            correct,
            slow,
            just_learned: update.just_learned,
            record: update.record,
        })
    }

    /// Whether the random-mode countdown has run out
    pub fn time_up(&self, now: Instant) -> bool {
        self.config.mode == Mode::Random && self.clock.is_some_and(|c| c.is_expired(now))
    }

    fn current_high_score(&self) -> u32 {
        self.high_score.max(self.scorer.score())
    }

    pub fn view(&self, position: Position, now: Instant) -> RoundView {
        let banner = self
            .banner
            .filter(|(_, at)| now.saturating_duration_since(*at) < self.config.banner_duration)
            .map(|(p, _)| p);
        RoundView {
            position,
            mode: self.config.mode,
            spelling: self.config.spelling,
            score: self.scorer.score(),
            high_score: self.current_high_score(),
            clock_secs: self.clock.map(|c| c.display_secs(now)).unwrap_or(0),
            sweep_index: self.sweep.cursor(),
            sweep_len: self.sweep.len(),
            learned: self.mastery.learned_count(),
            total: POSITION_COUNT,
            banner,
        }
    }

    /// Playing → Completed | Aborted: flush progress and report
    pub fn finish(&mut self, outcome: Phase, now: Instant) -> Result<Summary> {
        self.transition(outcome)?;

        self.mastery
            .save(&mut *self.progress.learning, self.config.table_key())?;

        let score = self.scorer.score();
        let new_high_score = self.config.mode == Mode::Random && score > self.high_score;
        if new_high_score {
            storage::save_high_score(&mut *self.progress.high_score, score)?;
        }

        let summary = Summary {
            outcome,
            mode: self.config.mode,
            score,
            high_score: match self.config.mode {
                Mode::Random => self.current_high_score(),
                Mode::Sequential => self.high_score,
            },
            new_high_score,
            elapsed: self.clock.map(|c| c.elapsed(now)).unwrap_or_default(),
            answers: self.scorer.answers(),
            accuracy: self.scorer.accuracy(),
            swept: self.swept(),
            learned: self.mastery.learned_count(),
            total: POSITION_COUNT,
        };
        info!(
            outcome = ?summary.outcome,
            score = summary.score,
            answers = summary.answers,
            learned = summary.learned,
            "session finished"
        );
        Ok(summary)
    }

    /// Sweep positions answered correctly; the one on screen does not count
    fn swept(&self) -> usize {
        match (self.config.mode, self.phase) {
            (Mode::Sequential, Phase::Completed) => self.sweep.cursor(),
            (Mode::Sequential, _) => self.sweep.cursor().saturating_sub(1),
            (Mode::Random, _) => 0,
        }
    }

    /// Drive a whole run against the terminal collaborators
    pub fn run(
        &mut self,
        clock: &dyn Clock,
        input: &mut dyn AnswerSource,
        renderer: &mut dyn Renderer,
    ) -> Result<Summary> {
        self.start(clock.now())?;
        let outcome = match self.play(clock, input, renderer) {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Err(flush) = self.finish(Phase::Aborted, clock.now()) {
                    warn!(error = %flush, "could not save progress after failure");
                }
                return Err(e);
            }
        };
        let summary = self.finish(outcome, clock.now())?;
        renderer.show_summary(&summary)?;
        Ok(summary)
    }

    fn play(
        &mut self,
        clock: &dyn Clock,
        input: &mut dyn AnswerSource,
        renderer: &mut dyn Renderer,
    ) -> Result<Phase> {
        loop {
            let Some(position) = self.next_position() else {
                return Ok(Phase::Completed);
            };
            input.begin_round()?;
            let round = RoundTimer::start(clock.now());
            let mut shown = self.view(position, clock.now());
            renderer.show_round(&shown)?;

            loop {
                match input.await_answer()? {
                    InputEvent::Exit => return Ok(Phase::Aborted),
                    InputEvent::Idle => {
                        if self.time_up(clock.now()) {
                            return Ok(Phase::Completed);
                        }
                        // Redraw only when the clock or banner changed
                        let view = self.view(position, clock.now());
                        if view != shown {
                            renderer.show_round(&view)?;
                            shown = view;
                        }
                    }
                    InputEvent::Answer { key, at } => {
                        let Some(chosen) = NoteIdentity::from_answer_key(key) else {
                            continue;
                        };
                        let outcome = self.answer(position, chosen, round.latency(at), at)?;
                        if self.time_up(clock.now()) {
                            return Ok(Phase::Completed);
                        }
                        if outcome.correct {
                            break;
                        }
                        shown = self.view(position, clock.now());
                        renderer.show_wrong(&shown)?;
                    }
                }
            }
        }
    }
}
