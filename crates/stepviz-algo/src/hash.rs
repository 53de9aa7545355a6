//! Separate-chaining hash table backend.
//!
//! Keys hash to `key mod buckets` (Euclidean, so negative keys land in range).
//! New keys are appended at the tail of their chain; a duplicate is reported
//! with a `duplicate` record and the chain is left as it was.

use serde::{Deserialize, Serialize};

use crate::event::Recorder;
use crate::{EventLog, Key, SnapshotSource};

/// Bucket count used by [`HashTable::new`].
pub const DEFAULT_BUCKETS: usize = 10;

/// Steps recorded by hash-table operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HashAction {
    /// `key` hashed to `bucket`.
    ComputeHash { bucket: usize, key: Key },
    /// The chain walk passed the entry holding `key`.
    Traverse { bucket: usize, key: Key },
    /// `key` was appended to the chain of `bucket`.
    Insert { bucket: usize, key: Key },
    /// `key` was already present; nothing changed.
    Duplicate { bucket: usize, key: Key },
    /// Search hit.
    Found { bucket: usize, key: Key },
    /// Search reached the end of the chain.
    NotFound { bucket: usize, key: Key },
}

impl HashAction {
    /// Bucket the step happens in.
    pub fn bucket(&self) -> usize {
        match self {
            HashAction::ComputeHash { bucket, .. }
            | HashAction::Traverse { bucket, .. }
            | HashAction::Insert { bucket, .. }
            | HashAction::Duplicate { bucket, .. }
            | HashAction::Found { bucket, .. }
            | HashAction::NotFound { bucket, .. } => *bucket,
        }
    }
}

/// One bucket of a [`HashSnapshot`], chain in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRow {
    pub index: usize,
    pub keys: Vec<Key>,
}

/// Every bucket in index order, empty buckets included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashSnapshot {
    pub buckets: Vec<BucketRow>,
}

/// Hash table with per-bucket chains.
#[derive(Debug, Clone)]
pub struct HashTable {
    buckets: Vec<Vec<Key>>,
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HashTable {
    /// Create a table with [`DEFAULT_BUCKETS`] buckets.
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Create a table with `count` buckets (at least one).
    pub fn with_buckets(count: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); count.max(1)],
        }
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket `key` belongs to.
    pub fn bucket_of(&self, key: Key) -> usize {
        key.rem_euclid(self.buckets.len() as i64) as usize
    }

    /// Chain of bucket `index`, if it exists.
    pub fn chain(&self, index: usize) -> Option<&[Key]> {
        self.buckets.get(index).map(Vec::as_slice)
    }

    /// Insert `key` at the tail of its chain unless it is already present.
    pub fn insert(&mut self, key: Key) -> EventLog<HashAction> {
        let mut log = Recorder::new();
        let bucket = self.bucket_of(key);
        let count = self.buckets.len();
        log.push(
            HashAction::ComputeHash { bucket, key },
            format!("Hash: {key} mod {count} = {bucket}"),
        );

        let chain = &mut self.buckets[bucket];
        let Some(&head) = chain.first() else {
            chain.push(key);
            log.push(HashAction::Insert { bucket, key }, "Inserted as head");
            return log.finish();
        };
        if head == key {
            log.push(HashAction::Duplicate { bucket, key }, "Duplicate key ignored");
            return log.finish();
        }

        for pair in chain.windows(2) {
            log.push(
                HashAction::Traverse { bucket, key: pair[0] },
                format!("Traversing {}", pair[0]),
            );
            if pair[1] == key {
                log.push(HashAction::Duplicate { bucket, key }, "Duplicate key ignored");
                return log.finish();
            }
        }

        let tail = chain[chain.len() - 1];
        log.push(HashAction::Traverse { bucket, key: tail }, "Reached tail");
        chain.push(key);
        log.push(HashAction::Insert { bucket, key }, "Inserted at tail");
        log.finish()
    }

    /// Walk the chain of `key`'s bucket looking for it.
    pub fn search(&self, key: Key) -> EventLog<HashAction> {
        let mut log = Recorder::new();
        let bucket = self.bucket_of(key);
        log.push(HashAction::ComputeHash { bucket, key }, format!("Searching bucket {bucket}"));

        for &entry in &self.buckets[bucket] {
            log.push(HashAction::Traverse { bucket, key: entry }, format!("Checking {entry}"));
            if entry == key {
                log.push(HashAction::Found { bucket, key }, format!("Found key {key}"));
                return log.finish();
            }
        }

        log.push(HashAction::NotFound { bucket, key }, "Key not found");
        log.finish()
    }
}

impl SnapshotSource for HashTable {
    type Snapshot = HashSnapshot;

    fn snapshot(&self) -> HashSnapshot {
        HashSnapshot {
            buckets: self
                .buckets
                .iter()
                .enumerate()
                .map(|(index, keys)| BucketRow {
                    index,
                    keys: keys.clone(),
                })
                .collect(),
        }
    }
}
