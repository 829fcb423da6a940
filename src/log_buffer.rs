// src/log_buffer.rs

use crate::errors::{LoupeError, LoupeResult};
use crate::models::LogRecord;
use regex::Regex;

/// How many records the visible view retains.
pub const RETENTION_LIMIT: usize = 10_000;

/// In-memory history of one session's records.
///
/// Pages fetched from the gateway are merged in via [`replace`] and
/// [`append`]; the buffer keeps the full history sorted ascending by id
/// and de-duplicated, and derives `visible` (filtered, then truncated
/// to the trailing [`RETENTION_LIMIT`] entries) after every mutation.
/// Filtering runs over the full history before truncation, so a narrow
/// filter can surface records older than the last `RETENTION_LIMIT`
/// unfiltered ones.
///
/// Single-threaded by design: the UI loop owns the buffer and applies
/// at most one mutation at a time.
#[derive(Debug, Default)]
pub struct LogBuffer {
    all: Vec<LogRecord>,
    pattern: Option<Regex>,
    visible: Vec<LogRecord>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards any prior history and starts over from `records`.
    /// Used for the initial page of a session.
    pub fn replace(&mut self, records: Vec<LogRecord>) {
        self.all = records;
        self.normalize();
        self.recompute();
    }

    /// Merges the next fetched page into the history. An empty page is
    /// a no-op apart from the recompute.
    pub fn append(&mut self, records: Vec<LogRecord>) {
        self.all.extend(records);
        self.normalize();
        self.recompute();
    }

    /// Sets or clears the view filter. The pattern is compiled by the
    /// caller; syntax errors never reach the buffer.
    pub fn set_filter(&mut self, pattern: Option<Regex>) {
        self.pattern = pattern;
        self.recompute();
    }

    pub fn filter(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// The filtered, retention-bounded view. A snapshot: rebuilt on
    /// mutation, never a live window into the history.
    pub fn current_view(&self) -> &[LogRecord] {
        &self.visible
    }

    /// Highest id seen so far; the next pagination cursor is this + 1.
    pub fn highest_known_id(&self) -> LoupeResult<u64> {
        // `all` stays sorted, so the maximum is the last element.
        self.all
            .last()
            .map(|r| r.id)
            .ok_or(LoupeError::EmptyBuffer)
    }

    /// Total records held, before filtering and truncation.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Full re-sort plus de-dup on every mutation; fine at this scale
    /// and simpler than an incremental merge. Ids are expected unique,
    /// but overlapping pagination windows would repeat rows, so
    /// duplicates are dropped here rather than assumed away.
    fn normalize(&mut self) {
        self.all.sort_unstable_by_key(|r| r.id);
        self.all.dedup_by_key(|r| r.id);
    }

    fn recompute(&mut self) {
        let matches = |r: &LogRecord| match &self.pattern {
            Some(p) => p.is_match(&r.record.category) || p.is_match(&r.record.message),
            None => true,
        };
        let filtered: Vec<&LogRecord> = self.all.iter().filter(|r| matches(r)).collect();
        let skip = filtered.len().saturating_sub(RETENTION_LIMIT);
        self.visible = filtered.into_iter().skip(skip).cloned().collect();
    }
}
