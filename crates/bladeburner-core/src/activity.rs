//! Bounded in-memory activity log.
//!
//! Keeps the most recent human-readable lines about completed actions,
//! world events and automation so a script or console can show them.

use std::collections::VecDeque;

/// A ring of the most recent log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ActivityLog {
    /// An empty log keeping at most `capacity` lines (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, dropping the oldest when full.
    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    /// Lines oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Number of lines held.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
