//! Binary heap backend (min or max), stored as an implicit array tree.

use serde::{Deserialize, Serialize};

use crate::event::Recorder;
use crate::{EventLog, Key, SnapshotSource};

/// Steps recorded by heap operations. Indices are array slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeapAction {
    /// `value` was appended at slot `index`.
    Insert { index: usize, value: Key },
    /// Slots `a` and `b` are being compared.
    Highlight { a: usize, b: usize },
    /// Slots `a` and `b` exchanged values.
    Swap { a: usize, b: usize },
    /// `value` was removed from the last slot `index`.
    Extract { index: usize, value: Key },
    /// The operation finished.
    Complete,
}

/// Heap contents in array order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapSnapshot {
    pub min_heap: bool,
    pub values: Vec<Key>,
}

/// Array-backed binary heap.
#[derive(Debug, Clone)]
pub struct Heap {
    values: Vec<Key>,
    min_heap: bool,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    /// Create an empty min-heap.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            min_heap: true,
        }
    }

    /// Switch between min (`true`) and max (`false`) ordering. Clears the heap.
    pub fn set_mode(&mut self, min_heap: bool) {
        self.min_heap = min_heap;
        self.values.clear();
    }

    /// Whether this is a min-heap.
    pub fn is_min_heap(&self) -> bool {
        self.min_heap
    }

    /// Current array.
    pub fn values(&self) -> &[Key] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Root value, if any.
    pub fn peek(&self) -> Option<Key> {
        self.values.first().copied()
    }

    fn outranks(&self, a: Key, b: Key) -> bool {
        if self.min_heap {
            a < b
        } else {
            a > b
        }
    }

    fn swap_slots(&mut self, a: usize, b: usize, log: &mut Recorder<HeapAction>) {
        log.push(HeapAction::Highlight { a, b }, "Comparing...");
        self.values.swap(a, b);
        log.push(HeapAction::Swap { a, b }, "Swapping");
    }

    fn sift_up(&mut self, mut index: usize, log: &mut Recorder<HeapAction>) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.outranks(self.values[index], self.values[parent]) {
                break;
            }
            self.swap_slots(index, parent, log);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize, log: &mut Recorder<HeapAction>) {
        let len = self.values.len();
        loop {
            let mut extreme = index;
            for child in [2 * index + 1, 2 * index + 2] {
                if child < len && self.outranks(self.values[child], self.values[extreme]) {
                    extreme = child;
                }
            }
            if extreme == index {
                break;
            }
            self.swap_slots(index, extreme, log);
            index = extreme;
        }
    }

    /// Append `value` and sift it up.
    pub fn insert(&mut self, value: Key) -> EventLog<HeapAction> {
        let mut log = Recorder::new();
        self.values.push(value);
        let index = self.values.len() - 1;
        log.push(HeapAction::Insert { index, value }, "Inserted");
        self.sift_up(index, &mut log);
        log.push(HeapAction::Complete, "Done");
        log.finish()
    }

    /// Remove the root: swap it with the last slot, pop, sift the new root
    /// down. Empty log on an empty heap.
    pub fn extract(&mut self) -> EventLog<HeapAction> {
        let mut log = Recorder::new();
        let Some(last) = self.values.len().checked_sub(1) else {
            return log.finish();
        };

        log.push(HeapAction::Highlight { a: 0, b: last }, "Swap root with last");
        self.values.swap(0, last);
        log.push(HeapAction::Swap { a: 0, b: last }, "Removing root");

        if let Some(value) = self.values.pop() {
            log.push(HeapAction::Extract { index: last, value }, "Extracted");
        }
        if !self.values.is_empty() {
            self.sift_down(0, &mut log);
        }
        log.push(HeapAction::Complete, "Done");
        log.finish()
    }
}

impl SnapshotSource for Heap {
    type Snapshot = HeapSnapshot;

    fn snapshot(&self) -> HeapSnapshot {
        HeapSnapshot {
            min_heap: self.min_heap,
            values: self.values.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(log: &EventLog<HeapAction>) -> Option<Key> {
        log.actions().find_map(|a| match a {
            HeapAction::Extract { value, .. } => Some(*value),
            _ => None,
        })
    }

    fn assert_heap_property(heap: &Heap) {
        let values = heap.values();
        for i in 1..values.len() {
            let parent = values[(i - 1) / 2];
            if heap.is_min_heap() {
                assert!(parent <= values[i]);
            } else {
                assert!(parent >= values[i]);
            }
        }
    }

    #[test]
    fn min_heap_round_trip() {
        let mut heap = Heap::new();
        for value in [7, 3, 9, 1] {
            heap.insert(value);
            assert_heap_property(&heap);
        }

        let mut order = Vec::new();
        for expected_len in (0..4).rev() {
            let log = heap.extract();
            order.extend(extracted(&log));
            assert_eq!(heap.len(), expected_len);
            assert_heap_property(&heap);
        }
        assert_eq!(order, vec![1, 3, 7, 9]);
    }

    #[test]
    fn max_heap_extracts_largest() {
        let mut heap = Heap::new();
        heap.set_mode(false);
        for value in [7, 3, 9, 1] {
            heap.insert(value);
        }
        assert_eq!(heap.peek(), Some(9));
        assert_eq!(extracted(&heap.extract()), Some(9));
    }

    #[test]
    fn insert_logs_sift_up() {
        let mut heap = Heap::new();
        heap.insert(5);
        let log = heap.insert(1);

        let actions: Vec<_> = log.actions().copied().collect();
        assert_eq!(actions, vec![
            HeapAction::Insert { index: 1, value: 1 },
            HeapAction::Highlight { a: 1, b: 0 },
            HeapAction::Swap { a: 1, b: 0 },
            HeapAction::Complete,
        ]);
        assert_eq!(heap.values(), &[1, 5]);
    }

    #[test]
    fn extract_on_empty_heap_is_empty_log() {
        let mut heap = Heap::new();
        assert!(heap.extract().is_empty());
    }

    #[test]
    fn set_mode_clears() {
        let mut heap = Heap::new();
        heap.insert(4);
        heap.set_mode(true);
        assert!(heap.is_empty());
        assert!(heap.snapshot().min_heap);
    }
}
