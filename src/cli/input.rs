//! Keystroke input handling using crossterm
//!
//! Features:
//! - Polled keystroke capture with a short timeout
//! - Answer keys `0-9 . +`, exit on `x`, Esc or Ctrl+C
//! - Stale keystrokes discarded when a new position is shown

use crate::error::Result;
use crate::fretboard::note::ANSWER_KEYS;
use crate::session::{AnswerSource, InputEvent};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::Result as IoResult;
use std::time::{Duration, Instant};

/// Handles user input from terminal
pub struct InputHandler {
    /// Timeout for poll operations
    poll_timeout: Duration,
}

impl InputHandler {
    /// Create new input handler; 100ms polls keep the clock display live
    pub fn new() -> Self {
        InputHandler {
            poll_timeout: Duration::from_millis(100),
        }
    }

    /// Enable raw mode for terminal input
    pub fn enable_raw_mode() -> IoResult<()> {
        crossterm::terminal::enable_raw_mode()
    }

    /// Disable raw mode and restore terminal
    pub fn disable_raw_mode() -> IoResult<()> {
        crossterm::terminal::disable_raw_mode()
    }

    /// Poll for a key press with timeout; `None` if nothing arrived
    pub fn read_key(&self) -> IoResult<Option<KeyEvent>> {
        if !event::poll(self.poll_timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
            _ => Ok(None),
        }
    }

    /// Drop keystrokes typed before the current position appeared
    pub fn drain(&self) -> IoResult<()> {
        while event::poll(Duration::ZERO)? {
            event::read()?;
        }
        Ok(())
    }

    /// Block until a key is pressed; true for `y`
    pub fn confirm(&self) -> IoResult<bool> {
        self.drain()?;
        loop {
            if let Some(key) = self.read_key()? {
                return Ok(matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')));
            }
        }
    }

    /// Check if key event is an exit signal (x, Escape or Ctrl+C)
    pub fn is_exit(key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Esc => true,
            _ => false,
        }
    }

    /// Answer key carried by the event, if any
    pub fn answer_key(key: &KeyEvent) -> Option<char> {
        match key.code {
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                    && ANSWER_KEYS.contains(&c) =>
            {
                Some(c)
            }
            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerSource for InputHandler {
    fn begin_round(&mut self) -> Result<()> {
        self.drain()?;
        Ok(())
    }

    fn await_answer(&mut self) -> Result<InputEvent> {
        let Some(key) = self.read_key()? else {
            return Ok(InputEvent::Idle);
        };
        let at = Instant::now();
        if Self::is_exit(&key) {
            return Ok(InputEvent::Exit);
        }
        // Anything else is filtered here and never reaches the session
        Ok(match Self::answer_key(&key) {
            Some(key) => InputEvent::Answer { key, at },
            None => InputEvent::Idle,
        })
    }
}
