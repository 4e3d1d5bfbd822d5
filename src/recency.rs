//! Most-recently-focused bookkeeping and the two window orderings.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::FOCUS_HISTORY_CAPACITY;
use crate::window::WindowRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Alphabetical,
    #[default]
    Recency,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortMode::Alphabetical => "ALPHABETICAL",
            SortMode::Recency => "RECENCY",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SortMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alphabetical" | "alpha" => Ok(SortMode::Alphabetical),
            "recency" | "recent" | "mru" => Ok(SortMode::Recency),
            _ => Err(()),
        }
    }
}

/// Bounded most-recent-first list of focused window addresses.
///
/// Only confirmed commits are recorded; cycling through candidates during a
/// gesture never touches it.
#[derive(Debug, Clone)]
pub struct FocusHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for FocusHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusHistory {
    pub fn new() -> Self {
        Self::with_capacity(FOCUS_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Moves `address` to the front, dropping the oldest entries past
    /// capacity.
    pub fn record_focus(&mut self, address: &str) {
        if let Some(pos) = self.entries.iter().position(|a| a == address) {
            self.entries.remove(pos);
        }
        self.entries.push_front(address.to_string());
        self.entries.truncate(self.capacity);
    }

    pub fn position(&self, address: &str) -> Option<usize> {
        self.entries.iter().position(|a| a == address)
    }

    pub fn front(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn lexical(a: &WindowRecord, b: &WindowRecord) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

/// Orders `windows` for display.
///
/// Recency puts windows found in `history` first by history position, then
/// the rest lexically by `(class, title, address)`. Alphabetical ignores
/// history entirely. Both orders are total, so re-sorting is idempotent.
pub fn sort_windows(
    mut windows: Vec<WindowRecord>,
    mode: SortMode,
    history: &FocusHistory,
) -> Vec<WindowRecord> {
    match mode {
        SortMode::Alphabetical => windows.sort_by(lexical),
        SortMode::Recency => {
            let rank: HashMap<&str, usize> = history
                .iter()
                .enumerate()
                .map(|(idx, address)| (address, idx))
                .collect();
            windows.sort_by(|a, b| {
                match (rank.get(a.address.as_str()), rank.get(b.address.as_str())) {
                    (Some(ra), Some(rb)) => ra.cmp(rb),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => lexical(a, b),
                }
            });
        }
    }
    windows
}
