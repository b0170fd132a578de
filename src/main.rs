//! Fretboard Trainer - adaptive guitar note drills in the terminal
//!
//! Shows a position on the neck and asks for the note. Random mode is a
//! two-minute run weighted toward positions not yet learned; `--frets`
//! sweeps every position in a fixed order. Progress persists between runs.

use clap::Parser;
use fretboard_trainer::cli::{Display, InputHandler};
use fretboard_trainer::fretboard::Spelling;
use fretboard_trainer::session::{GameSession, Mode, Progress, SessionConfig, SystemClock};
use fretboard_trainer::storage::{JsonFile, HIGH_SCORE_FILE, LEARNING_FILE};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEBUG_LOG_FILE: &str = "fretboard_debug.log";

#[derive(Parser, Debug)]
#[command(name = "Fretboard Trainer")]
#[command(about = "Learn the notes of the guitar fretboard")]
struct Args {
    /// Use flat spellings instead of sharps
    #[arg(long)]
    flats: bool,

    /// Show string names and fret numbers
    #[arg(long)]
    labels: bool,

    /// Sequential mode: go through every position in order
    #[arg(long)]
    frets: bool,

    /// Seed for position selection (random each run if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding progress and high score files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Write debug logs to fretboard_debug.log in the data directory
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        let mode = if self.frets {
            Mode::Sequential
        } else {
            Mode::Random
        };
        let spelling = if self.flats {
            Spelling::Flats
        } else {
            Spelling::Sharps
        };
        SessionConfig::new(mode, spelling)
    }

    fn progress(&self) -> Progress {
        Progress {
            learning: Box::new(JsonFile::new(self.data_dir.join(LEARNING_FILE))),
            high_score: Box::new(JsonFile::new(self.data_dir.join(HIGH_SCORE_FILE))),
        }
    }

    fn rng(&self, run: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(run)),
            None => StdRng::from_entropy(),
        }
    }
}

/// Logs go to a file in debug mode, since the board owns the terminal
fn init_logging(debug: bool, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let default_level = if debug { "fretboard=debug" } else { "fretboard=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if debug {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join(DEBUG_LOG_FILE))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    fs::create_dir_all(&args.data_dir)?;
    init_logging(args.debug, &args.data_dir)?;

    let config = args.session_config();
    info!(
        mode = ?config.mode,
        spelling = ?config.spelling,
        seed = ?args.seed,
        data_dir = %args.data_dir.display(),
        "starting fretboard trainer"
    );

    let mut display = Display::new(args.labels);
    let mut input = InputHandler::new();

    let mut run = 0;
    loop {
        let mut session = GameSession::new(config.clone(), args.progress(), args.rng(run));
        // Warnings about unreadable progress files print before raw mode
        session.load_progress()?;
        InputHandler::enable_raw_mode()?;
        session.run(&SystemClock, &mut input, &mut display)?;
        run += 1;

        display.show_line(16, "  Play again? (y/n): ")?;
        let again = input.confirm()?;
        InputHandler::disable_raw_mode()?;
        if !again {
            break;
        }
    }

    // Cleanup
    display.shutdown()?;
    display.clear()?;
    println!("\n  Thanks for playing! 🎸\n");

    Ok(())
}
