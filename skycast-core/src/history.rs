//! Bounded, persisted search history.
//!
//! The log itself is a plain value: [`HistoryLog::record`] returns a new log and
//! never touches its input. Reading and writing the persisted copy goes through
//! [`HistoryCache`], which swallows storage failures after logging them.

use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{error::PersistenceError, model::QuerySnapshot};

/// Maximum number of retained entries.
pub const HISTORY_CAPACITY: usize = 5;

/// One completed query: the city as entered plus its current conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub city: String,
    pub weather: QuerySnapshot,
}

impl HistoryEntry {
    pub fn new(city: impl Into<String>, weather: QuerySnapshot) -> Self {
        Self { city: city.into(), weather }
    }
}

/// Newest-first list of at most [`HISTORY_CAPACITY`] entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Build a log from newest-first entries, dropping anything past capacity.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        Self { entries }
    }

    /// Prepend `entry` and truncate to capacity. Duplicates are kept.
    pub fn record(&self, entry: HistoryEntry) -> HistoryLog {
        let entries = std::iter::once(entry)
            .chain(self.entries.iter().cloned())
            .take(HISTORY_CAPACITY)
            .collect();

        HistoryLog { entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

/// A single named storage slot holding the serialized log.
pub trait HistorySlot: Debug {
    /// `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>, PersistenceError>;

    /// Replace the stored value entirely.
    fn write(&self, contents: &str) -> Result<(), PersistenceError>;
}

/// Slot backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySlot for FileSlot {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename so readers never see a partial file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

/// In-memory slot.
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: RefCell<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self { contents: RefCell::new(Some(contents.into())) }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl HistorySlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &str) -> Result<(), PersistenceError> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

/// Reads and writes a [`HistoryLog`] through a [`HistorySlot`].
#[derive(Debug)]
pub struct HistoryCache<S: HistorySlot> {
    slot: S,
}

impl<S: HistorySlot> HistoryCache<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Load the persisted log. Missing or unreadable data yields an empty log.
    pub fn restore(&self) -> HistoryLog {
        let raw = match self.slot.read() {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return HistoryLog::default(),
            Err(err) => {
                warn!(error = %err, "could not read search history, starting empty");
                return HistoryLog::default();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => {
                if entries.len() > HISTORY_CAPACITY {
                    warn!(stored = entries.len(), "stored history exceeds capacity, truncating");
                }
                let log = HistoryLog::from_entries(entries);
                debug!(entries = log.len(), "restored search history");
                log
            }
            Err(err) => {
                warn!(error = %err, "stored search history is malformed, starting empty");
                HistoryLog::default()
            }
        }
    }

    /// Write the whole log, surfacing any failure.
    pub fn try_persist(&self, log: &HistoryLog) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(log.entries())?;
        self.slot.write(&json)
    }

    /// Replace the stored log with an empty one.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.try_persist(&HistoryLog::default())
    }

    /// Write the whole log; failures are logged and dropped.
    pub fn persist(&self, log: &HistoryLog) {
        if let Err(err) = self.try_persist(log) {
            warn!(error = %err, "failed to persist search history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn entry(city: &str, temp_c: f64) -> HistoryEntry {
        HistoryEntry::new(
            city,
            QuerySnapshot {
                location_name: city.to_string(),
                observed_at: DateTime::<Utc>::from_timestamp(1_717_000_000, 0).unwrap(),
                condition: "Sunny".into(),
                temperature_c: temp_c,
                temperature_f: temp_c * 1.8 + 32.0,
            },
        )
    }

    fn cities(log: &HistoryLog) -> Vec<&str> {
        log.iter().map(|e| e.city.as_str()).collect()
    }

    #[test]
    fn record_prepends_newest_first() {
        let log = HistoryLog::default()
            .record(entry("A", 1.0))
            .record(entry("B", 2.0))
            .record(entry("C", 3.0));

        assert_eq!(cities(&log), ["C", "B", "A"]);
    }

    #[test]
    fn record_never_exceeds_capacity() {
        let mut log = HistoryLog::default();
        for i in 0..12 {
            log = log.record(entry(&format!("city-{i}"), i as f64));
            assert!(log.len() <= HISTORY_CAPACITY);
            assert_eq!(log.len(), (i + 1).min(HISTORY_CAPACITY));
        }

        assert_eq!(cities(&log), ["city-11", "city-10", "city-9", "city-8", "city-7"]);
    }

    #[test]
    fn record_does_not_mutate_input() {
        let before = HistoryLog::default().record(entry("A", 1.0));
        let after = before.record(entry("B", 2.0));

        assert_eq!(cities(&before), ["A"]);
        assert_eq!(cities(&after), ["B", "A"]);
    }

    #[test]
    fn duplicates_are_not_collapsed() {
        let log = HistoryLog::default().record(entry("Paris", 1.0)).record(entry("Paris", 2.0));
        assert_eq!(cities(&log), ["Paris", "Paris"]);
    }

    #[test]
    fn restore_on_empty_slot_is_empty() {
        let cache = HistoryCache::new(MemorySlot::new());
        assert!(cache.restore().is_empty());

        let cache = HistoryCache::new(MemorySlot::with_contents("  "));
        assert!(cache.restore().is_empty());
    }

    #[test]
    fn restore_on_malformed_value_is_empty() {
        for raw in ["{not json", r#"{"city":"Paris"}"#, r#"[{"city":"Paris","weather":{}}]"#] {
            let cache = HistoryCache::new(MemorySlot::with_contents(raw));
            assert!(cache.restore().is_empty(), "expected empty log for {raw}");
        }
    }

    #[test]
    fn persist_then_restore_round_trips() {
        let cache = HistoryCache::new(MemorySlot::new());

        let mut log = HistoryLog::default();
        for n in 0..=HISTORY_CAPACITY {
            cache.persist(&log);
            assert_eq!(cache.restore(), log);
            log = log.record(entry(&format!("city-{n}"), n as f64 + 0.5));
        }
    }

    #[test]
    fn clear_stores_an_empty_log() {
        let cache = HistoryCache::new(MemorySlot::new());
        cache.persist(&HistoryLog::default().record(entry("Paris", 18.5)));

        cache.clear().unwrap();

        assert_eq!(cache.slot().contents().as_deref(), Some("[]"));
        assert!(cache.restore().is_empty());
    }

    #[test]
    fn round_trip_keeps_sub_second_observation_time() {
        let cache = HistoryCache::new(MemorySlot::new());

        let mut precise = entry("Paris", 18.5);
        precise.weather.observed_at =
            DateTime::<Utc>::from_timestamp(1_717_000_000, 123_000_000).unwrap();
        let log = HistoryLog::default().record(entry("Tokyo", 21.0)).record(precise);

        cache.persist(&log);
        assert_eq!(cache.restore(), log);
    }

    #[test]
    fn persisted_layout_matches_city_and_weather_objects() {
        let cache = HistoryCache::new(MemorySlot::new());
        cache.persist(&HistoryLog::default().record(entry("Paris", 18.5)));

        let stored = cache.slot().contents().unwrap();
        let value: serde_json::Value = serde_json::from_str(&stored).unwrap();

        assert_eq!(value[0]["city"], "Paris");
        assert_eq!(value[0]["weather"]["current"]["temp_c"], 18.5);
        assert_eq!(value[0]["weather"]["current"]["condition"]["text"], "Sunny");
    }

    #[test]
    fn oversized_store_is_truncated_on_restore() {
        let entries: Vec<_> = (0..8).map(|i| entry(&format!("c{i}"), i as f64)).collect();
        let raw = serde_json::to_string(&entries).unwrap();

        let log = HistoryCache::new(MemorySlot::with_contents(raw)).restore();
        assert_eq!(cities(&log), ["c0", "c1", "c2", "c3", "c4"]);
    }

    #[test]
    fn file_slot_round_trips_and_reports_missing_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("data").join("history.json"));

        assert!(slot.read().unwrap().is_none());

        slot.write("[]").unwrap();
        assert_eq!(slot.read().unwrap().as_deref(), Some("[]"));
        assert!(!slot.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn persist_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the target file makes the rename fail.
        let target = dir.path().join("history.json");
        fs::create_dir_all(target.join("blocker")).unwrap();

        let cache = HistoryCache::new(FileSlot::new(target.clone()));
        let log = HistoryLog::default().record(entry("A", 1.0));

        assert!(cache.try_persist(&log).is_err());
        cache.persist(&log);
    }
}
