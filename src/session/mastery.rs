//! Per-position mastery tracking
//!
//! A position is learned after a run of consecutive correct answers, each
//! faster than the response threshold. A wrong or slow answer breaks the
//! run. Learned is never taken back.

use crate::error::Result;
use crate::fretboard::Position;
use crate::storage::{LearningDocument, Storage, Table, TableKey};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Thresholds deciding when an answer advances the streak
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MasteryRules {
    /// Correct answers at or above this latency reset the streak
    pub response_threshold: Duration,
    /// Streak length at which a position counts as learned
    pub learned_threshold: u32,
}

impl Default for MasteryRules {
    fn default() -> Self {
        MasteryRules {
            response_threshold: Duration::from_secs(5),
            learned_threshold: 3,
        }
    }
}

/// Mastery state of one position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryRecord {
    #[serde(default, alias = "correct_count")]
    pub correct_streak: u32,
    #[serde(default)]
    pub learned: bool,
    #[serde(default)]
    pub times_shown: u32,
    #[serde(default)]
    pub times_correct: u32,
}

impl MasteryRecord {
    /// Apply one answer; returns true if this answer made the position learned
    pub fn apply(&mut self, correct: bool, latency: Duration, rules: &MasteryRules) -> bool {
        self.times_shown += 1;
        if !correct {
            self.correct_streak = 0;
            return false;
        }

        self.times_correct += 1;
        if latency >= rules.response_threshold {
            self.correct_streak = 0;
            return false;
        }

        self.correct_streak += 1;
        if !self.learned && self.correct_streak >= rules.learned_threshold {
            self.learned = true;
            return true;
        }
        false
    }

    /// Fraction of answers that were correct, slow ones included
    pub fn accuracy(&self) -> Option<f32> {
        (self.times_shown > 0).then(|| self.times_correct as f32 / self.times_shown as f32)
    }
}

/// Result of recording an answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MasteryUpdate {
    pub record: MasteryRecord,
    pub just_learned: bool,
}

/// Mastery records for every position of one progress table
#[derive(Clone, Debug, Default)]
pub struct MasteryStore {
    records: FxHashMap<Position, MasteryRecord>,
    rules: MasteryRules,
}

impl MasteryStore {
    pub fn new(rules: MasteryRules) -> Self {
        MasteryStore {
            records: FxHashMap::default(),
            rules,
        }
    }

    pub fn rules(&self) -> &MasteryRules {
        &self.rules
    }

    /// Record for a position, created unmastered on first reference
    pub fn get(&mut self, position: Position) -> MasteryRecord {
        *self.records.entry(position).or_default()
    }

    /// Record for a position without creating it
    pub fn peek(&self, position: Position) -> MasteryRecord {
        self.records.get(&position).copied().unwrap_or_default()
    }

    pub fn is_learned(&self, position: Position) -> bool {
        self.records.get(&position).is_some_and(|r| r.learned)
    }

    /// Apply an answer to a position and return its updated record
    pub fn record(&mut self, position: Position, correct: bool, latency: Duration) -> MasteryUpdate {
        let rules = self.rules;
        let record = self.records.entry(position).or_default();
        let just_learned = record.apply(correct, latency, &rules);
        if just_learned {
            info!(%position, "position learned");
        }
        MasteryUpdate {
            record: *record,
            just_learned,
        }
    }

    pub fn all_positions(&self) -> Vec<Position> {
        Position::all().collect()
    }

    pub fn unmastered_positions(&self) -> Vec<Position> {
        Position::all().filter(|&p| !self.is_learned(p)).collect()
    }

    pub fn mastered_positions(&self) -> Vec<Position> {
        Position::all().filter(|&p| self.is_learned(p)).collect()
    }

    pub fn learned_count(&self) -> usize {
        self.records.values().filter(|r| r.learned).count()
    }

    /// Number of positions with a record
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build a store from persisted entries; malformed entries are dropped
    pub fn from_table(table: &Table, rules: MasteryRules) -> Self {
        let mut store = MasteryStore::new(rules);
        for (key, value) in table {
            let Some(position) = Position::from_key(key) else {
                debug!(key = %key, "skipping entry with bad position key");
                continue;
            };
            let Ok(mut record) = serde_json::from_value::<MasteryRecord>(value.clone()) else {
                debug!(key = %key, "skipping malformed mastery entry");
                continue;
            };
            // Older files only kept a capped counter
            if record.correct_streak >= rules.learned_threshold {
                record.learned = true;
            }
            store.records.insert(position, record);
        }
        store
    }

    pub fn to_table(&self) -> Table {
        let mut entries: Vec<(&Position, &MasteryRecord)> = self.records.iter().collect();
        entries.sort_by_key(|(position, _)| **position);
        entries
            .into_iter()
            .filter_map(|(position, record)| {
                serde_json::to_value(record)
                    .ok()
                    .map(|value| (position.key(), value))
            })
            .collect()
    }

    /// Load one table from the learning document; missing or corrupt data
    /// gives an empty store
    pub fn load(source: &dyn Storage, key: TableKey, rules: MasteryRules) -> Result<Self> {
        let doc = LearningDocument::load(source)?;
        let store = MasteryStore::from_table(doc.table(key), rules);
        debug!(?key, records = store.len(), learned = store.learned_count(), "loaded mastery table");
        Ok(store)
    }

    /// Replace this store's table in the learning document, keeping the others
    pub fn save(&self, storage: &mut dyn Storage, key: TableKey) -> Result<()> {
        let mut doc = LearningDocument::load(storage)?;
        doc.set_table(key, self.to_table());
        doc.save(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fretboard::{Spelling, POSITION_COUNT};
    use crate::session::Mode;
    use crate::storage::MemoryStorage;
    use serde_json::{json, Value};

    const FAST: Duration = Duration::from_millis(1200);
    const SLOW: Duration = Duration::from_millis(5000);

    fn pos(string: usize, fret: usize) -> Position {
        Position::new(string, fret).unwrap()
    }

    fn key() -> TableKey {
        TableKey {
            mode: Mode::Random,
            spelling: Spelling::Sharps,
        }
    }

    #[test]
    fn test_get_creates_default_record() {
        let mut store = MasteryStore::default();
        assert!(store.is_empty());
        assert_eq!(store.get(pos(2, 4)), MasteryRecord::default());
        assert_eq!(store.len(), 1);
        assert!(!store.is_learned(pos(2, 4)));
    }

    #[test]
    fn test_learned_after_three_fast_correct_answers() {
        let mut store = MasteryStore::default();
        let p = pos(0, 5);
        assert!(!store.record(p, true, FAST).just_learned);
        assert!(!store.record(p, true, FAST).just_learned);
        let update = store.record(p, true, FAST);
        assert!(update.just_learned);
        assert!(update.record.learned);
        assert_eq!(update.record.correct_streak, 3);
        assert_eq!(update.record.times_shown, 3);
        assert_eq!(update.record.times_correct, 3);
    }

    #[test]
    fn test_wrong_answer_resets_streak() {
        let mut store = MasteryStore::default();
        let p = pos(1, 7);
        store.record(p, true, FAST);
        store.record(p, true, FAST);
        let update = store.record(p, false, FAST);
        assert_eq!(update.record.correct_streak, 0);
        assert_eq!(update.record.times_correct, 2);

        store.record(p, true, FAST);
        store.record(p, true, FAST);
        assert!(!store.is_learned(p));
        assert!(store.record(p, true, FAST).just_learned);
    }

    #[test]
    fn test_slow_correct_answer_resets_streak_but_counts_as_correct() {
        let mut store = MasteryStore::default();
        let p = pos(3, 2);
        store.record(p, true, FAST);
        store.record(p, true, FAST);
        let update = store.record(p, true, SLOW);
        assert_eq!(update.record.correct_streak, 0);
        assert!(!update.record.learned);
        assert_eq!(update.record.times_correct, 3);
        assert_eq!(update.record.accuracy(), Some(1.0));

        // Just under the threshold still qualifies
        let just_under = Duration::from_millis(4999);
        store.record(p, true, just_under);
        store.record(p, true, just_under);
        assert!(store.record(p, true, just_under).just_learned);
    }

    #[test]
    fn test_learned_is_never_retracted() {
        let mut store = MasteryStore::default();
        let p = pos(5, 0);
        for _ in 0..3 {
            store.record(p, true, FAST);
        }
        for (correct, latency) in [(false, FAST), (true, SLOW), (false, SLOW), (true, FAST)] {
            let update = store.record(p, correct, latency);
            assert!(update.record.learned);
            assert!(!update.just_learned);
        }
        assert_eq!(store.mastered_positions(), vec![p]);
    }

    #[test]
    fn test_partitions_cover_the_domain() {
        let mut store = MasteryStore::default();
        for p in [pos(0, 0), pos(4, 9)] {
            for _ in 0..3 {
                store.record(p, true, FAST);
            }
        }
        store.record(pos(2, 2), false, FAST);
        assert_eq!(store.all_positions().len(), POSITION_COUNT);
        assert_eq!(store.mastered_positions(), vec![pos(0, 0), pos(4, 9)]);
        assert_eq!(store.unmastered_positions().len(), POSITION_COUNT - 2);
        assert_eq!(store.learned_count(), 2);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let mut store = MasteryStore::default();
        for _ in 0..3 {
            store.record(pos(0, 3), true, FAST);
        }
        store.record(pos(1, 10), false, FAST);
        store.record(pos(5, 11), true, SLOW);

        let mut storage = MemoryStorage::default();
        store.save(&mut storage, key()).unwrap();
        let reloaded = MasteryStore::load(&storage, key(), MasteryRules::default()).unwrap();

        assert_eq!(reloaded.len(), store.len());
        for p in Position::all() {
            assert_eq!(reloaded.peek(p), store.peek(p));
        }
    }

    #[test]
    fn test_save_keeps_other_tables() {
        let other = TableKey {
            mode: Mode::Sequential,
            spelling: Spelling::Flats,
        };
        let mut storage = MemoryStorage::default();
        let mut sequential = MasteryStore::default();
        sequential.record(pos(2, 2), true, FAST);
        sequential.save(&mut storage, other).unwrap();

        let mut random = MasteryStore::default();
        random.record(pos(4, 4), false, FAST);
        random.save(&mut storage, key()).unwrap();

        let reloaded = MasteryStore::load(&storage, other, MasteryRules::default()).unwrap();
        assert_eq!(reloaded.peek(pos(2, 2)).times_correct, 1);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_load_corrupt_or_missing_gives_empty_store() {
        let missing = MemoryStorage::default();
        let store = MasteryStore::load(&missing, key(), MasteryRules::default()).unwrap();
        assert!(store.is_empty());

        let corrupt = MemoryStorage::with_contents("{{{");
        let store = MasteryStore::load(&corrupt, key(), MasteryRules::default()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_entries_default_and_legacy_counts_are_learned() {
        let table = json!({
            "0-1": { "correct_streak": 1, "learned": false, "times_shown": 4, "times_correct": 2 },
            "0-2": { "correct_streak": "lots" },
            "9-9": { "correct_streak": 1 },
            "1-1": { "note": "A♯", "correct_count": 3, "last_time": 2.5 },
            "2-2": 17
        });
        let Value::Object(table) = table else { unreachable!() };
        let store = MasteryStore::from_table(&table, MasteryRules::default());

        assert_eq!(store.len(), 2);
        assert_eq!(store.peek(pos(0, 1)).times_shown, 4);
        assert_eq!(store.peek(pos(0, 2)), MasteryRecord::default());
        assert!(store.is_learned(pos(1, 1)));
        assert!(!store.is_learned(pos(2, 2)));
    }

}
