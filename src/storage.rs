//! Persistence collaborators for learning progress and the high score
//!
//! Storage is a whole-document blob: read once when a session starts,
//! written once when it ends. The learning document holds one mastery table
//! per (game mode, spelling) pair; a session only replaces its own table.

use crate::error::{FretboardError, Result};
use crate::fretboard::Spelling;
use crate::session::Mode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const LEARNING_FILE: &str = "fretboard_learning.json";
pub const HIGH_SCORE_FILE: &str = "fretboard_highscore.json";

/// A blob store holding one serialized document
pub trait Storage {
    /// Current raw contents, `None` if nothing was ever written
    fn read(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replace the contents as a whole
    fn write(&mut self, contents: &str) -> io::Result<()>;
}

/// JSON file on disk, overwritten atomically via a sibling temp file
#[derive(Clone, Debug)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFile {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), bytes = contents.len(), "wrote progress file");
        Ok(())
    }
}

/// In-memory storage shared between a session and the test inspecting it
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    contents: std::rc::Rc<std::cell::RefCell<Option<String>>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn with_contents(contents: &str) -> Self {
        let storage = MemoryStorage::default();
        *storage.contents.borrow_mut() = Some(contents.to_string());
        storage
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.contents.borrow().clone().map(String::into_bytes))
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

/// Identifies one mastery table inside the learning document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableKey {
    pub mode: Mode,
    pub spelling: Spelling,
}

/// Raw entries of one table, keyed by `"<string>-<fret>"`
pub type Table = Map<String, Value>;

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
struct SpellingTables {
    sharps: Table,
    flats: Table,
}

impl SpellingTables {
    /// Pull both tables out of an object; anything malformed becomes empty
    fn take(root: &mut Map<String, Value>) -> Self {
        SpellingTables {
            sharps: take_table(root, "sharps"),
            flats: take_table(root, "flats"),
        }
    }

    fn get(&self, spelling: Spelling) -> &Table {
        match spelling {
            Spelling::Sharps => &self.sharps,
            Spelling::Flats => &self.flats,
        }
    }

    fn get_mut(&mut self, spelling: Spelling) -> &mut Table {
        match spelling {
            Spelling::Sharps => &mut self.sharps,
            Spelling::Flats => &mut self.flats,
        }
    }
}

/// The whole learning file: four tables, random/sequential × sharps/flats
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct LearningDocument {
    random: SpellingTables,
    sequential: SpellingTables,
}

impl LearningDocument {
    /// Parse a learning document, migrating the older layout that kept only
    /// top-level `sharps`/`flats` tables for random mode. A malformed table
    /// is read as empty without touching its siblings.
    pub fn parse(content: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(content)
            .map_err(|e| FretboardError::PersistenceCorrupt(e.to_string()))?;
        let Value::Object(mut root) = value else {
            return Err(FretboardError::PersistenceCorrupt(
                "learning document is not an object".to_string(),
            ));
        };

        if !root.contains_key("random") {
            return Ok(LearningDocument {
                random: SpellingTables::take(&mut root),
                sequential: SpellingTables::default(),
            });
        }

        Ok(LearningDocument {
            random: take_tables(&mut root, "random"),
            sequential: take_tables(&mut root, "sequential"),
        })
    }

    /// Read a document from storage; missing or corrupt data yields an
    /// empty document
    pub fn load(source: &dyn Storage) -> Result<Self> {
        let Some(content) = source.read()? else {
            debug!("no learning file, starting fresh");
            return Ok(LearningDocument::default());
        };
        match LearningDocument::parse(&content) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable learning file");
                Ok(LearningDocument::default())
            }
        }
    }

    pub fn save(&self, sink: &mut dyn Storage) -> Result<()> {
        let content = serde_json::to_string(self)
            .map_err(|e| FretboardError::PersistenceCorrupt(e.to_string()))?;
        sink.write(&content)?;
        Ok(())
    }

    pub fn table(&self, key: TableKey) -> &Table {
        self.tables(key.mode).get(key.spelling)
    }

    pub fn set_table(&mut self, key: TableKey, table: Table) {
        *self.tables_mut(key.mode).get_mut(key.spelling) = table;
    }

    fn tables(&self, mode: Mode) -> &SpellingTables {
        match mode {
            Mode::Random => &self.random,
            Mode::Sequential => &self.sequential,
        }
    }

    fn tables_mut(&mut self, mode: Mode) -> &mut SpellingTables {
        match mode {
            Mode::Random => &mut self.random,
            Mode::Sequential => &mut self.sequential,
        }
    }
}

fn take_table(root: &mut Map<String, Value>, key: &str) -> Table {
    match root.remove(key) {
        Some(Value::Object(table)) => table,
        None => Table::new(),
        Some(_) => {
            warn!(table = key, "ignoring malformed progress table");
            Table::new()
        }
    }
}

fn take_tables(root: &mut Map<String, Value>, key: &str) -> SpellingTables {
    match root.remove(key) {
        Some(Value::Object(mut tables)) => SpellingTables::take(&mut tables),
        None => SpellingTables::default(),
        Some(_) => {
            warn!(mode = key, "ignoring malformed progress tables");
            SpellingTables::default()
        }
    }
}

#[derive(Serialize, Deserialize)]
struct HighScoreDocument {
    #[serde(default)]
    high_score: u32,
}

/// Stored high score; missing or malformed data reads as 0
pub fn load_high_score(source: &dyn Storage) -> Result<u32> {
    let Some(content) = source.read()? else {
        return Ok(0);
    };
    match serde_json::from_slice::<HighScoreDocument>(&content) {
        Ok(doc) => Ok(doc.high_score),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable high score file");
            Ok(0)
        }
    }
}

pub fn save_high_score(sink: &mut dyn Storage, high_score: u32) -> Result<()> {
    let content = serde_json::to_string(&HighScoreDocument { high_score })
        .map_err(|e| FretboardError::PersistenceCorrupt(e.to_string()))?;
    sink.write(&content)?;
    Ok(())
}
