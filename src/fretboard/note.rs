//! Positions and notes on a six-string guitar in standard tuning
//!
//! String 0 is the low E string, fret 0 is the open string. A position maps
//! to a pitch class by adding the fret offset to the open-string pitch.

use crate::error::{FretboardError, Result};
use std::fmt;

pub const STRING_COUNT: usize = 6;
pub const FRET_COUNT: usize = 12;
pub const POSITION_COUNT: usize = STRING_COUNT * FRET_COUNT;

/// Open-string pitch classes, low E to high E
const TUNING: [u8; STRING_COUNT] = [4, 9, 2, 7, 11, 4];

/// String names as printed next to the fretboard, low to high
pub const STRING_NAMES: [&str; STRING_COUNT] = ["E", "A", "D", "G", "B", "e"];

const SHARP_NAMES: [&str; 12] = [
    "C", "C♯", "D", "D♯", "E", "F", "F♯", "G", "G♯", "A", "A♯", "B",
];
const FLAT_NAMES: [&str; 12] = [
    "C", "D♭", "D", "E♭", "E", "F", "G♭", "G", "A♭", "A", "B♭", "B",
];

/// Keys bound to the twelve answer choices, in chromatic order from C
pub const ANSWER_KEYS: [char; 12] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', '+'];

/// Which enharmonic spelling to print for accidentals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Spelling {
    #[default]
    Sharps,
    Flats,
}

/// A (string, fret) coordinate inside the 6 × 12 practice domain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    string: u8,
    fret: u8,
}

impl Position {
    /// Build a position, rejecting indices outside the practice domain
    pub fn new(string: usize, fret: usize) -> Result<Self> {
        if string >= STRING_COUNT || fret >= FRET_COUNT {
            return Err(FretboardError::OutOfRange { string, fret });
        }
        Ok(Position {
            string: string as u8,
            fret: fret as u8,
        })
    }

    pub fn string(self) -> usize {
        self.string as usize
    }

    pub fn fret(self) -> usize {
        self.fret as usize
    }

    /// All 72 positions, string-major
    pub fn all() -> impl Iterator<Item = Position> {
        (0..STRING_COUNT).flat_map(|string| {
            (0..FRET_COUNT).map(move |fret| Position {
                string: string as u8,
                fret: fret as u8,
            })
        })
    }

    /// Persistence key, `"<string>-<fret>"`
    pub fn key(self) -> String {
        format!("{}-{}", self.string, self.fret)
    }

    /// Parse a persistence key; `None` for anything malformed or out of range
    pub fn from_key(key: &str) -> Option<Self> {
        let (string, fret) = key.split_once('-')?;
        Position::new(string.trim().parse().ok()?, fret.trim().parse().ok()?).ok()
    }

    /// Pitch sounding at this position
    pub fn note(self) -> NoteIdentity {
        let pitch = (TUNING[self.string()] + self.fret) % 12;
        NoteIdentity { pitch_class: pitch }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} string, fret {}",
            STRING_NAMES[self.string()],
            self.fret
        )
    }
}

/// Note lookup from raw indices
pub fn note_at(string: usize, fret: usize) -> Result<NoteIdentity> {
    Position::new(string, fret).map(Position::note)
}

/// A pitch class, 0 = C through 11 = B
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoteIdentity {
    pitch_class: u8,
}

impl NoteIdentity {
    pub fn pitch_class(self) -> u8 {
        self.pitch_class
    }

    pub fn sharp_name(self) -> &'static str {
        SHARP_NAMES[self.pitch_class as usize]
    }

    pub fn flat_name(self) -> &'static str {
        FLAT_NAMES[self.pitch_class as usize]
    }

    pub fn name(self, spelling: Spelling) -> &'static str {
        match spelling {
            Spelling::Sharps => self.sharp_name(),
            Spelling::Flats => self.flat_name(),
        }
    }

    /// The note chosen by an answer key, if the key is one of the twelve
    pub fn from_answer_key(key: char) -> Option<Self> {
        ANSWER_KEYS
            .iter()
            .position(|&k| k == key)
            .map(|idx| NoteIdentity {
                pitch_class: idx as u8,
            })
    }

    pub fn answer_key(self) -> char {
        ANSWER_KEYS[self.pitch_class as usize]
    }

    /// All twelve notes in the order the answer choices are listed
    pub fn chromatic() -> impl Iterator<Item = NoteIdentity> {
        (0..12u8).map(|pitch_class| NoteIdentity { pitch_class })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_strings_follow_standard_tuning() {
        let names: Vec<&str> = (0..STRING_COUNT)
            .map(|s| note_at(s, 0).unwrap().sharp_name())
            .collect();
        assert_eq!(names, vec!["E", "A", "D", "G", "B", "E"]);
    }

    #[test]
    fn test_fret_offsets_wrap_the_octave() {
        assert_eq!(note_at(0, 1).unwrap().sharp_name(), "F");
        assert_eq!(note_at(1, 3).unwrap().sharp_name(), "C");
        assert_eq!(note_at(4, 11).unwrap().sharp_name(), "A♯");
        assert_eq!(note_at(4, 11).unwrap().flat_name(), "B♭");
        assert_eq!(note_at(3, 5).unwrap().pitch_class(), 0);
    }

    #[test]
    fn test_note_lookup_is_deterministic() {
        for position in Position::all() {
            assert_eq!(position.note(), position.note());
            assert_eq!(
                note_at(position.string(), position.fret()).unwrap(),
                position.note()
            );
        }
    }

    #[test]
    fn test_out_of_range_indices_fail() {
        assert!(matches!(
            note_at(6, 0),
            Err(FretboardError::OutOfRange { string: 6, fret: 0 })
        ));
        assert!(matches!(
            Position::new(0, 12),
            Err(FretboardError::OutOfRange { string: 0, fret: 12 })
        ));
    }

    #[test]
    fn test_domain_has_72_distinct_positions() {
        let all: std::collections::HashSet<Position> = Position::all().collect();
        assert_eq!(all.len(), POSITION_COUNT);
    }

    #[test]
    fn test_position_keys() {
        let position = Position::new(5, 11).unwrap();
        assert_eq!(position.key(), "5-11");
        assert_eq!(Position::from_key("5-11"), Some(position));
        assert_eq!(Position::from_key("6-0"), None);
        assert_eq!(Position::from_key("banana"), None);
        assert_eq!(Position::from_key("1-"), None);
    }

    #[test]
    fn test_answer_keys_are_chromatic_from_c() {
        assert_eq!(NoteIdentity::from_answer_key('0').unwrap().sharp_name(), "C");
        assert_eq!(NoteIdentity::from_answer_key('.').unwrap().flat_name(), "B♭");
        assert_eq!(NoteIdentity::from_answer_key('+').unwrap().sharp_name(), "B");
        assert_eq!(NoteIdentity::from_answer_key('x'), None);
        for note in NoteIdentity::chromatic() {
            assert_eq!(NoteIdentity::from_answer_key(note.answer_key()), Some(note));
        }
    }
}
