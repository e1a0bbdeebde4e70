//! Edit log and history cursor.
//!
//! The log is append-only apart from truncation: undo and redo only move
//! the cursor, and pushing while entries are undone discards them.

use serde::{Deserialize, Serialize};

use crate::stroke::Stroke;

/// A stroke recorded in the edit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditLogEntry {
    /// Sequence number, strictly increasing over the lifetime of the log.
    /// Numbers are never reused, even after truncation or [`EditLog::clear`].
    pub seq: u64,
    /// The recorded stroke.
    pub stroke: Stroke,
}

/// Ordered strokes plus the cursor splitting applied from undone entries.
///
/// Invariant: `0 <= cursor <= entries.len()`. Entries at index `>= cursor`
/// are kept only for redo and are never returned by
/// [`active_entries`](Self::active_entries).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditLog {
    entries: Vec<EditLogEntry>,
    cursor: usize,
    next_seq: u64,
}

impl EditLog {
    /// Empty log with the cursor at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `stroke` at the cursor, discarding any undone entries first.
    ///
    /// Returns the sequence number assigned to the new entry.
    pub fn push(&mut self, stroke: Stroke) -> u64 {
        if self.cursor < self.entries.len() {
            tracing::debug!(
                discarded = self.entries.len() - self.cursor,
                "truncating redo branch"
            );
            self.entries.truncate(self.cursor);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(EditLogEntry { seq, stroke });
        self.cursor = self.entries.len();
        seq
    }

    /// Step the cursor back one entry. Returns `false` if nothing was
    /// applied.
    pub const fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Step the cursor forward one entry. Returns `false` if nothing was
    /// undone.
    pub const fn redo(&mut self) -> bool {
        if self.cursor == self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Entries before the cursor, in log order.
    #[must_use]
    pub fn active_entries(&self) -> &[EditLogEntry] {
        &self.entries[..self.cursor]
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub const fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Number of stored entries, applied and undone.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the log holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of applied entries.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sequence number of the last applied entry, if any.
    #[must_use]
    pub fn last_active_seq(&self) -> Option<u64> {
        self.active_entries().last().map(|e| e.seq)
    }

    /// Drop every entry. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{ColorTag, Point};

    fn line(x: f64) -> Stroke {
        Stroke::line(Point::new(x, 0.0), Point::new(x, 1.0), ColorTag::Manual).unwrap()
    }

    #[test]
    fn empty_log_is_valid_initial_state() {
        let mut log = EditLog::new();
        assert_eq!(log.cursor(), 0);
        assert!(log.is_empty());
        assert!(!log.can_undo());
        assert!(!log.can_redo());
        assert!(!log.undo());
        assert!(!log.redo());
        assert!(log.active_entries().is_empty());
    }

    #[test]
    fn push_advances_cursor() {
        let mut log = EditLog::new();
        log.push(line(0.0));
        log.push(line(1.0));
        assert_eq!(log.cursor(), 2);
        assert_eq!(log.active_entries().len(), 2);
        assert!(log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn undo_hides_entry_and_redo_restores_it() {
        let mut log = EditLog::new();
        log.push(line(0.0));
        log.push(line(1.0));
        assert!(log.undo());
        assert_eq!(log.active_entries().len(), 1);
        assert_eq!(log.len(), 2);
        assert!(log.can_redo());
        assert!(log.redo());
        assert_eq!(log.active_entries()[1].stroke, line(1.0));
        assert!(!log.redo());
    }

    #[test]
    fn push_after_undo_truncates_redo_branch() {
        let mut log = EditLog::new();
        log.push(line(0.0));
        log.push(line(1.0));
        log.push(line(2.0));
        log.undo();
        log.push(line(9.0));
        assert_eq!(log.len(), 3);
        assert!(!log.can_redo());
        assert!(!log.redo());
        let xs: Vec<_> = log.active_entries().iter().map(|e| e.stroke.clone()).collect();
        assert_eq!(xs, vec![line(0.0), line(1.0), line(9.0)]);
    }

    #[test]
    fn sequence_numbers_never_reused() {
        let mut log = EditLog::new();
        let a = log.push(line(0.0));
        let b = log.push(line(1.0));
        log.undo();
        let c = log.push(line(2.0));
        log.clear();
        let d = log.push(line(3.0));
        assert!(a < b && b < c && c < d);
        assert_eq!(log.last_active_seq(), Some(d));
    }

    #[test]
    fn last_active_seq_tracks_cursor() {
        let mut log = EditLog::new();
        let a = log.push(line(0.0));
        log.push(line(1.0));
        log.undo();
        assert_eq!(log.last_active_seq(), Some(a));
        log.undo();
        assert_eq!(log.last_active_seq(), None);
    }
}
