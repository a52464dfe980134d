//! Execution history
//!
//! An ordered record of past runs keyed by the time they were recorded.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::Language;
use crate::types::ExecutionResult;

/// One recorded run
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub recorded_at: DateTime<Utc>,
    pub language: Language,
    /// Submitted source text
    pub source: String,
    pub result: ExecutionResult,
}

impl HistoryEntry {
    /// Text shown for this entry's output
    pub fn output(&self) -> &str {
        self.result.console_output()
    }
}

/// Timestamp-keyed run history, iterated oldest first
///
/// Recording at an existing timestamp replaces that entry.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: BTreeMap<DateTime<Utc>, HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry under its `recorded_at` time, returning any entry it replaced
    pub fn record(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.insert(entry.recorded_at, entry)
    }

    pub fn get(&self, at: &DateTime<Utc>) -> Option<&HistoryEntry> {
        self.entries.get(at)
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.values().next_back()
    }

    /// Entries in chronological order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
