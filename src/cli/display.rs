//! Terminal display and UI rendering
//!
//! Features:
//! - Fretboard drawing with the quizzed position highlighted
//! - Score/clock/progress status line
//! - Answer choices in the active spelling
//! - End-of-session summary

use crate::error::Result;
use crate::fretboard::note::STRING_NAMES;
use crate::fretboard::{NoteIdentity, Position, Spelling, FRET_COUNT, STRING_COUNT};
use crate::session::clock::format_clock;
use crate::session::{Mode, Phase, Renderer, RoundView, Summary};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{stdout, Stdout, Write};
use std::thread;
use std::time::Duration;

const CELL_WIDTH: usize = 7;
const CHOICE_WIDTH: usize = 5;
const MARGIN: &str = "      ";
/// Inlay dots drawn between the G and D strings and under the board
const INLAY_FRETS: [usize; 4] = [3, 5, 7, 9];
const FLASH_INTERVAL: Duration = Duration::from_millis(150);

/// Terminal display manager
pub struct Display {
    /// Print string names and fret numbers around the board
    show_labels: bool,
}

impl Display {
    pub fn new(show_labels: bool) -> Self {
        Display { show_labels }
    }

    /// Clear screen
    pub fn clear(&self) -> Result<()> {
        let mut stdout = stdout();
        execute!(stdout, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        Ok(())
    }

    /// Print a line of plain text at a row
    pub fn show_line(&self, row: u16, text: &str) -> Result<()> {
        let mut stdout = stdout();
        execute!(stdout, cursor::MoveTo(0, row), Print(text))?;
        Ok(())
    }

    fn status_line(view: &RoundView) -> String {
        let mode = match view.spelling {
            Spelling::Sharps => "SHARPS",
            Spelling::Flats => "FLATS",
        };
        let progress = format!(
            "{}% ({}/{})",
            view.progress_percent(),
            view.learned,
            view.total
        );
        let clock = format_clock(view.clock_secs);
        match view.mode {
            Mode::Random => format!(
                "  Score: {}  |  High Score: {}  |  Time: {}  |  Mode: {}  |  {}",
                view.score, view.high_score, clock, mode, progress
            ),
            Mode::Sequential => format!(
                "  Position: {}/{}  |  Time: {}  |  Mode: {}  |  {}",
                view.sweep_index, view.sweep_len, clock, mode, progress
            ),
        }
    }

    fn cell(highlight: Option<Color>) -> Vec<(Option<Color>, String)> {
        let pad = (CELL_WIDTH - 1) / 2;
        match highlight {
            Some(color) => vec![
                (None, "─".repeat(pad)),
                (Some(color), "⬤".to_string()),
                (None, "─".repeat(CELL_WIDTH - 1 - pad)),
            ],
            None => vec![(None, "─".repeat(CELL_WIDTH))],
        }
    }

    fn draw_string(
        &self,
        out: &mut Stdout,
        row: u16,
        string: usize,
        target: Position,
        marker: Color,
    ) -> Result<()> {
        let label = if self.show_labels {
            format!("  {:<4}", STRING_NAMES[string])
        } else {
            MARGIN.to_string()
        };
        queue!(out, cursor::MoveTo(0, row), Print(label))?;
        for fret in 0..FRET_COUNT {
            let hit = target.string() == string && target.fret() == fret;
            for (color, text) in Self::cell(hit.then_some(marker)) {
                match color {
                    Some(color) => queue!(out, SetForegroundColor(color), Print(text), ResetColor)?,
                    None => queue!(out, Print(text))?,
                }
            }
            // Open-string column sits left of the nut
            let bar = if fret == 0 { "║" } else { "│" };
            queue!(out, SetForegroundColor(Color::Cyan), Print(bar), ResetColor)?;
        }
        Ok(())
    }

    fn draw_gap(&self, out: &mut Stdout, row: u16, inlays: bool) -> Result<()> {
        queue!(out, cursor::MoveTo(0, row), Print(MARGIN))?;
        for fret in 0..FRET_COUNT {
            let content = if inlays && INLAY_FRETS.contains(&fret) {
                format!("{:^width$}", "•", width = CELL_WIDTH)
            } else {
                " ".repeat(CELL_WIDTH)
            };
            let bar = if fret == 0 { "║" } else { "│" };
            queue!(
                out,
                Print(content),
                SetForegroundColor(Color::Cyan),
                Print(bar),
                ResetColor
            )?;
        }
        Ok(())
    }

    fn draw_round(&self, view: &RoundView, marker: Color) -> Result<()> {
        let mut out = stdout();
        queue!(
            out,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 1),
            SetForegroundColor(Color::Magenta),
            Print("  FRETBOARD TRAINER"),
            ResetColor,
            cursor::MoveTo(0, 2),
            Print(Self::status_line(view))
        )?;

        let mut row = 4;
        if self.show_labels {
            let mut numbers = MARGIN.to_string();
            for fret in 0..FRET_COUNT {
                numbers.push_str(&format!("{:^width$} ", fret, width = CELL_WIDTH));
            }
            queue!(out, cursor::MoveTo(0, row), Print(numbers))?;
            row += 2;
        }

        // High e on top, as the player sees the neck
        for string in (0..STRING_COUNT).rev() {
            self.draw_string(&mut out, row, string, view.position, marker)?;
            row += 1;
            if string > 0 {
                self.draw_gap(&mut out, row, string == 3)?;
                row += 1;
            }
        }
        self.draw_gap(&mut out, row, true)?;
        row += 2;

        if let Some(learned) = view.banner {
            queue!(
                out,
                cursor::MoveTo(0, row),
                SetForegroundColor(Color::Green),
                Print(format!(
                    "  ★ Learned: {} ({})",
                    learned,
                    learned.note().name(view.spelling)
                )),
                ResetColor
            )?;
        }
        row += 2;

        let mut keys = "  ".to_string();
        let mut notes = "  ".to_string();
        for note in NoteIdentity::chromatic() {
            keys.push_str(&format!("{:^width$}", note.answer_key(), width = CHOICE_WIDTH));
            notes.push_str(&format!(
                "{:^width$}",
                note.name(view.spelling),
                width = CHOICE_WIDTH
            ));
        }
        queue!(
            out,
            cursor::MoveTo(0, row),
            Print("  What note is highlighted?"),
            cursor::MoveTo(0, row + 2),
            SetForegroundColor(Color::Yellow),
            Print(keys),
            ResetColor,
            cursor::MoveTo(0, row + 3),
            Print(notes),
            cursor::MoveTo(0, row + 5),
            SetForegroundColor(Color::DarkGrey),
            Print("  Press 'x' to exit"),
            ResetColor
        )?;
        out.flush()?;
        Ok(())
    }

    /// Reset terminal state and cleanup
    pub fn shutdown(&self) -> Result<()> {
        let mut stdout = stdout();
        execute!(stdout, cursor::Show)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Default for Display {
    fn default() -> Self {
        Display::new(false)
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = self.shutdown();
    }
}

/// Accuracy as a whole percentage, or "-" when nothing was answered
fn accuracy_label(accuracy: Option<f32>) -> String {
    match accuracy {
        Some(accuracy) => format!("{:.0}%", accuracy * 100.0),
        None => "-".to_string(),
    }
}

impl Renderer for Display {
    fn show_round(&mut self, view: &RoundView) -> Result<()> {
        let mut stdout = stdout();
        execute!(stdout, cursor::Hide)?;
        self.draw_round(view, Color::Yellow)
    }

    fn show_wrong(&mut self, view: &RoundView) -> Result<()> {
        for _ in 0..2 {
            self.draw_round(view, Color::Red)?;
            thread::sleep(FLASH_INTERVAL);
            self.draw_round(view, Color::Yellow)?;
            thread::sleep(FLASH_INTERVAL);
        }
        Ok(())
    }

    fn show_summary(&mut self, summary: &Summary) -> Result<()> {
        let rule = "=".repeat(60);
        let mut lines: Vec<String> = vec![String::new(), rule.clone()];
        match (summary.mode, summary.outcome) {
            (Mode::Random, Phase::Aborted) => lines.push("  GAME OVER".to_string()),
            (Mode::Random, _) => lines.push("  TIME'S UP!".to_string()),
            (Mode::Sequential, Phase::Aborted) => lines.push("  STOPPED".to_string()),
            (Mode::Sequential, _) => lines.push("  COMPLETE!".to_string()),
        }
        lines.push(rule.clone());
        lines.push(String::new());

        match summary.mode {
            Mode::Random => {
                lines.push(format!("  Final Score: {}", summary.score));
                lines.push(format!("  High Score: {}", summary.high_score));
                if summary.new_high_score {
                    lines.push(String::new());
                    lines.push("  🎉 NEW HIGH SCORE! 🎉".to_string());
                }
            }
            Mode::Sequential => {
                lines.push(format!(
                    "  Final Time: {}",
                    format_clock(summary.elapsed.as_secs())
                ));
                lines.push(format!(
                    "  Positions covered: {}/{}",
                    summary.swept, summary.total
                ));
            }
        }
        lines.push(format!(
            "  Answers: {}  |  Accuracy: {}",
            summary.answers,
            accuracy_label(summary.accuracy)
        ));
        lines.push(format!(
            "  Progress: {}% Complete ({}/{} positions learned)",
            summary.progress_percent(),
            summary.learned,
            summary.total
        ));
        lines.push(String::new());
        lines.push(rule);

        self.clear()?;
        for (row, line) in lines.iter().enumerate() {
            self.show_line(row as u16, line)?;
        }
        let mut stdout = stdout();
        execute!(stdout, cursor::Show)?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(mode: Mode) -> RoundView {
        RoundView {
            position: Position::new(1, 3).unwrap(),
            mode,
            spelling: Spelling::Flats,
            score: 7,
            high_score: 12,
            clock_secs: 95,
            sweep_index: 4,
            sweep_len: 72,
            learned: 18,
            total: 72,
            banner: None,
        }
    }

    #[test]
    fn test_status_line_random() {
        let line = Display::status_line(&view(Mode::Random));
        assert_eq!(
            line,
            "  Score: 7  |  High Score: 12  |  Time: 1:35  |  Mode: FLATS  |  25% (18/72)"
        );
    }

    #[test]
    fn test_status_line_sequential() {
        let line = Display::status_line(&view(Mode::Sequential));
        assert!(line.starts_with("  Position: 4/72  |  Time: 1:35"));
    }

    #[test]
    fn test_accuracy_label() {
        assert_eq!(accuracy_label(None), "-");
        assert_eq!(accuracy_label(Some(0.75)), "75%");
        assert_eq!(accuracy_label(Some(1.0)), "100%");
    }

    #[test]
    fn test_highlighted_cell_is_centered() {
        let cell = Display::cell(Some(Color::Yellow));
        let text: String = cell.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(text.chars().count(), CELL_WIDTH);
        assert_eq!(text.chars().nth(3), Some('⬤'));
    }
}
