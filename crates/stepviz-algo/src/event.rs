//! Event log produced by one backend operation.

use serde::{Deserialize, Serialize};

/// One step of an operation's execution.
///
/// `action` names the step kind and carries the subject identities plus any
/// numeric payload; `info` is the human-readable explanation shown on the
/// status line (empty when the backend has nothing to say).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord<A> {
    #[serde(flatten)]
    pub action: A,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,
}

impl<A> ActionRecord<A> {
    /// Create a record.
    pub fn new(action: A, info: impl Into<String>) -> Self {
        Self {
            action,
            info: info.into(),
        }
    }
}

/// Ordered, immutable sequence of [`ActionRecord`]s from exactly one operation.
///
/// Order is semantically significant: it is the order the algorithm executed
/// in and must be replayed that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog<A> {
    records: Vec<ActionRecord<A>>,
}

impl<A> EventLog<A> {
    /// Wrap an already ordered list of records.
    pub fn new(records: Vec<ActionRecord<A>>) -> Self {
        Self { records }
    }

    /// A log with no records.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the operation produced no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at position `index`.
    pub fn get(&self, index: usize) -> Option<&ActionRecord<A>> {
        self.records.get(index)
    }

    /// Records front to back.
    pub fn iter(&self) -> std::slice::Iter<'_, ActionRecord<A>> {
        self.records.iter()
    }

    /// All records as a slice.
    pub fn records(&self) -> &[ActionRecord<A>] {
        &self.records
    }

    /// Actions front to back, without their explanations.
    pub fn actions(&self) -> impl Iterator<Item = &A> + '_ {
        self.records.iter().map(|r| &r.action)
    }
}

impl<A> Default for EventLog<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A> FromIterator<ActionRecord<A>> for EventLog<A> {
    fn from_iter<I: IntoIterator<Item = ActionRecord<A>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, A> IntoIterator for &'a EventLog<A> {
    type Item = &'a ActionRecord<A>;
    type IntoIter = std::slice::Iter<'a, ActionRecord<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Append-only builder used by backends while an operation runs.
#[derive(Debug)]
pub(crate) struct Recorder<A> {
    records: Vec<ActionRecord<A>>,
}

impl<A> Recorder<A> {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, action: A, info: impl Into<String>) {
        self.records.push(ActionRecord::new(action, info));
    }

    pub(crate) fn finish(self) -> EventLog<A> {
        EventLog::new(self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TreeAction;

    #[test]
    fn log_preserves_push_order() {
        let mut recorder = Recorder::new();
        recorder.push(TreeAction::SearchVisit { key: 10 }, "");
        recorder.push(TreeAction::InsertNode { key: 5 }, "Inserted");
        let log = recorder.finish();

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(0).unwrap().action, TreeAction::SearchVisit { key: 10 });
        assert_eq!(log.get(1).unwrap().info, "Inserted");
        assert!(log.get(2).is_none());
    }

    #[test]
    fn record_serialization() {
        let record = ActionRecord::new(TreeAction::RotateEvent { key: 30 }, "Right rotate");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"rotate_event\""));
        assert!(json.contains("\"key\":30"));

        let parsed: ActionRecord<TreeAction> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn empty_info_is_omitted() {
        let record = ActionRecord::new(TreeAction::SearchVisit { key: 1 }, "");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("info"));
    }
}
