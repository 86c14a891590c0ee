//! Transition history tracking.
//!
//! Each machine keeps a bounded log of the transitions it executed, mostly
//! for debugging AI behavior frame by frame.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::time::Duration;

/// Records kept by a machine unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 32;

/// Record of a single executed transition.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionRecord {
    /// Name of the transition that ran
    pub transition: String,
    /// The state that was active before the transition, if any
    pub from: Option<String>,
    /// The state that became active
    pub to: String,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
    /// Ticks spent waiting on the completion callback, including the one
    /// on which the transition started
    pub ticks: u32,
}

/// Bounded, ordered history of executed transitions.
///
/// Once `limit` records are held, recording a new one drops the oldest.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{StateHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_limit(2);
/// for (from, to) in [("Idle", "Walk"), ("Walk", "Run"), ("Run", "Idle")] {
///     history.record(TransitionRecord {
///         transition: format!("{from}->{to}"),
///         from: Some(from.to_string()),
///         to: to.to_string(),
///         timestamp: Utc::now(),
///         ticks: 1,
///     });
/// }
///
/// assert_eq!(history.get_path(), vec!["Walk", "Run", "Idle"]);
/// ```
#[derive(Clone, Debug)]
pub struct StateHistory {
    records: VecDeque<TransitionRecord>,
    limit: usize,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHistory {
    /// Create an empty history holding up to [`DEFAULT_HISTORY_LIMIT`] records.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an empty history holding up to `limit` records. A limit of zero
    /// disables recording.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the limit, discarding the oldest records that no longer fit.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.trim();
    }

    /// Append a record, evicting the oldest when full.
    pub fn record(&mut self, record: TransitionRecord) {
        if self.limit == 0 {
            return;
        }
        self.records.push_back(record);
        self.trim();
    }

    fn trim(&mut self) {
        while self.records.len() > self.limit {
            self.records.pop_front();
        }
    }

    /// Names of the states traversed: the origin of the oldest retained
    /// record (when known), then the target of every record.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(from) = self.records.front().and_then(|r| r.from.as_deref()) {
            path.push(from);
        }
        path.extend(self.records.iter().map(|r| r.to.as_str()));
        path
    }

    /// Wall-clock time between the oldest and newest retained records.
    /// `None` when the history is empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: Option<&str>, to: &str) -> TransitionRecord {
        TransitionRecord {
            transition: format!("to_{to}"),
            from: from.map(str::to_string),
            to: to.to_string(),
            timestamp: Utc::now(),
            ticks: 1,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.limit(), DEFAULT_HISTORY_LIMIT);
        assert!(history.duration().is_none());
        assert!(history.get_path().is_empty());
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let mut history = StateHistory::new();
        history.record(record(Some("Idle"), "Walk"));
        history.record(record(Some("Walk"), "Run"));

        assert_eq!(history.get_path(), vec!["Idle", "Walk", "Run"]);
        assert_eq!(history.last().map(|r| r.to.as_str()), Some("Run"));
    }

    #[test]
    fn path_without_known_origin_starts_at_first_target() {
        let mut history = StateHistory::new();
        history.record(record(None, "Spawn"));

        assert_eq!(history.get_path(), vec!["Spawn"]);
    }

    #[test]
    fn oldest_records_are_evicted() {
        let mut history = StateHistory::with_limit(2);
        history.record(record(Some("A"), "B"));
        history.record(record(Some("B"), "C"));
        history.record(record(Some("C"), "D"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get_path(), vec!["B", "C", "D"]);
    }

    #[test]
    fn shrinking_limit_trims() {
        let mut history = StateHistory::new();
        for to in ["A", "B", "C", "D"] {
            history.record(record(None, to));
        }

        history.set_limit(1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.last().map(|r| r.to.as_str()), Some("D"));
    }

    #[test]
    fn zero_limit_disables_recording() {
        let mut history = StateHistory::with_limit(0);
        history.record(record(None, "A"));
        assert!(history.is_empty());
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let mut history = StateHistory::new();
        history.record(record(Some("A"), "B"));

        std::thread::sleep(std::time::Duration::from_millis(10));

        history.record(record(Some("B"), "C"));

        let duration = history.duration();
        assert!(duration.is_some());
        assert!(duration.unwrap() >= std::time::Duration::from_millis(10));
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let mut history = StateHistory::new();
        history.record(record(None, "A"));

        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn clear_empties() {
        let mut history = StateHistory::new();
        history.record(record(None, "A"));
        history.clear();
        assert!(history.is_empty());
    }
}
