//! Timestamped status messages shown in the Command Center.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

/// Oldest entries are dropped past this many.
pub const STATUS_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub at: DateTime<Local>,
    pub level: StatusLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct StatusLog {
    entries: VecDeque<StatusEntry>,
}

impl StatusLog {
    pub fn push(&mut self, level: StatusLevel, message: impl Into<String>) {
        if self.entries.len() == STATUS_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(StatusEntry {
            at: Local::now(),
            level,
            message: message.into(),
        });
    }

    /// Oldest first.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &StatusEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&StatusEntry> {
        self.entries.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
