//! stepviz Algorithm Backends
//!
//! Reference implementations of the backend contract consumed by the replay
//! engine. Every mutating or query operation returns an [`EventLog`]: the
//! ordered, immutable record of what the algorithm did, step by step.
//!
//! # Contract
//!
//! - Operations never fail. A logically impossible request (duplicate insert,
//!   absent key, unknown start vertex) yields a log documenting the outcome.
//! - Each backend exposes its authoritative state through [`SnapshotSource`].
//!   A snapshot is always complete; there is no partial snapshot.
//!
//! # Families
//!
//! - [`AvlTree`]: balanced search tree insert/remove
//! - [`Graph`]: BFS, DFS, Dijkstra and Prim over an undirected weighted graph
//! - [`HashTable`]: separate chaining insert/search
//! - [`Heap`]: min/max binary heap insert/extract

mod event;
mod tree;
mod graph;
mod hash;
mod heap;

pub use event::{ActionRecord, EventLog};
pub use tree::{AvlTree, TreeAction, TreeNodeRow, TreeSnapshot};
pub use graph::{Algorithm, Graph, GraphAction, GraphSnapshot, WeightedEdge};
pub use hash::{BucketRow, HashAction, HashSnapshot, HashTable, DEFAULT_BUCKETS};
pub use heap::{Heap, HeapAction, HeapSnapshot};

/// Identity of a structural element (tree key, vertex id, hashed key, heap value).
pub type Key = i64;

/// Read access to a backend's authoritative state.
pub trait SnapshotSource {
    /// Complete description of the structure at one instant.
    type Snapshot: Clone + std::fmt::Debug + Send + 'static;

    /// Take a fresh snapshot.
    fn snapshot(&self) -> Self::Snapshot;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_backends_have_empty_snapshots() {
        assert!(AvlTree::new().snapshot().nodes.is_empty());
        assert!(Graph::new().snapshot().vertices.is_empty());
        assert!(Heap::new().snapshot().values.is_empty());

        let hash = HashTable::new().snapshot();
        assert_eq!(hash.buckets.len(), DEFAULT_BUCKETS);
        assert!(hash.buckets.iter().all(|b| b.keys.is_empty()));
    }
}
