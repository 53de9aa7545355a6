//! The session object: one backend, mirror and scheduler per family.
//!
//! Operations take raw user input. Input that does not parse (or names an
//! unknown start vertex) is skipped without touching the backend. Animated
//! operations claim the family's scheduler before anything else and replay
//! in a spawned task.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stepviz_algo::{Algorithm, AvlTree, EventLog, Graph, HashTable, Heap, Key};
use stepviz_layout::Point;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::VisConfig;
use crate::families::{
    Family, GraphMirror, HashMirror, HeapMirror, TreeMirror, Visualizer, DEFAULT_EDGES,
    DEFAULT_VERTICES,
};
use crate::scheduler::{Notice, PlayOutcome, PlaybackReport, PlaybackState, Scheduler};
use crate::surface::Canvas;

/// A replay running in the background.
#[derive(Debug)]
pub struct Playback(JoinHandle<PlayOutcome>);

impl Playback {
    /// Wait for the replay to finish. `None` if the task panicked or the
    /// replay was refused.
    pub async fn finish(self) -> Option<PlaybackReport> {
        match self.0.await {
            Ok(PlayOutcome::Completed(report)) => Some(report),
            Ok(PlayOutcome::Busy) | Err(_) => None,
        }
    }
}

/// What became of a request.
#[derive(Debug)]
pub enum Submission {
    /// A replay was started.
    Started(Playback),
    /// Another replay is running on that family; nothing was done.
    Busy,
    /// Input was invalid; nothing was done.
    Skipped,
    /// A non-animated change was applied and redrawn.
    Applied,
}

impl Submission {
    /// Short name used in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Submission::Started(_) => "started",
            Submission::Busy => "busy",
            Submission::Skipped => "skipped",
            Submission::Applied => "applied",
        }
    }
}

/// Playback state per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbenchStatus {
    pub tree: PlaybackState,
    pub graph: PlaybackState,
    pub hash: PlaybackState,
    pub heap: PlaybackState,
}

fn parse_key(input: &str) -> Option<Key> {
    input.trim().parse().ok()
}

/// Owns every structure shown by one session.
pub struct Workbench {
    tree: Scheduler<TreeMirror, Canvas>,
    graph: Scheduler<GraphMirror, Canvas>,
    hash: Scheduler<HashMirror, Canvas>,
    heap: Scheduler<HeapMirror, Canvas>,
}

impl Workbench {
    /// Build the four schedulers. The graph starts with a weighted triangle.
    pub fn new(config: &VisConfig) -> Self {
        let mut graph = Graph::new();
        let mut graph_mirror = GraphMirror::new(config.seed);
        for (id, at) in DEFAULT_VERTICES {
            graph.add_vertex(id);
            graph_mirror.place(id, Some(at));
        }
        for (u, v, weight) in DEFAULT_EDGES {
            graph.add_edge(u, v, weight);
        }

        let width = config.viewport_width;
        let delays = config.delays;
        info!(buckets = config.hash_buckets, width, "workbench ready");
        Self {
            tree: Scheduler::new(AvlTree::new(), TreeMirror::new(), Canvas::new(), delays.tree)
                .with_viewport(width),
            graph: Scheduler::new(graph, graph_mirror, Canvas::new(), delays.graph)
                .with_viewport(width),
            hash: Scheduler::new(
                HashTable::with_buckets(config.hash_buckets),
                HashMirror::new(config.hash_buckets),
                Canvas::new(),
                delays.hash,
            )
            .with_viewport(width),
            heap: Scheduler::new(Heap::new(), HeapMirror::new(), Canvas::new(), delays.heap)
                .with_viewport(width),
        }
    }

    pub fn status(&self) -> WorkbenchStatus {
        WorkbenchStatus {
            tree: self.tree.state(),
            graph: self.graph.state(),
            hash: self.hash.state(),
            heap: self.heap.state(),
        }
    }

    /// Current frame of one family.
    pub async fn scene(&self, family: Family) -> Canvas {
        match family {
            Family::Tree => self.tree.inspect(|s| s.surface.clone()).await,
            Family::Graph => self.graph.inspect(|s| s.surface.clone()).await,
            Family::Hash => self.hash.inspect(|s| s.surface.clone()).await,
            Family::Heap => self.heap.inspect(|s| s.surface.clone()).await,
        }
    }

    /// Change notifications for one family.
    pub fn subscribe(&self, family: Family) -> broadcast::Receiver<Notice> {
        match family {
            Family::Tree => self.tree.subscribe(),
            Family::Graph => self.graph.subscribe(),
            Family::Hash => self.hash.subscribe(),
            Family::Heap => self.heap.subscribe(),
        }
    }

    /// Claim the scheduler `pick` selects and replay `op` in the background.
    fn launch<V, F>(
        self: &Arc<Self>,
        pick: fn(&Workbench) -> &Scheduler<V, Canvas>,
        op: F,
    ) -> Submission
    where
        V: Visualizer,
        F: FnOnce(&mut V::Backend) -> EventLog<V::Action> + Send + 'static,
    {
        let Some(guard) = pick(self).try_begin() else {
            debug!(family = %V::FAMILY, "busy, request ignored");
            return Submission::Busy;
        };
        let bench = Arc::clone(self);
        let task = tokio::spawn(async move { pick(&bench).run(guard, op).await });
        Submission::Started(Playback(task))
    }

    fn tree_scheduler(&self) -> &Scheduler<TreeMirror, Canvas> {
        &self.tree
    }

    fn graph_scheduler(&self) -> &Scheduler<GraphMirror, Canvas> {
        &self.graph
    }

    fn hash_scheduler(&self) -> &Scheduler<HashMirror, Canvas> {
        &self.hash
    }

    fn heap_scheduler(&self) -> &Scheduler<HeapMirror, Canvas> {
        &self.heap
    }

    pub fn tree_insert(self: &Arc<Self>, input: &str) -> Submission {
        let Some(key) = parse_key(input) else {
            return Submission::Skipped;
        };
        self.launch(Self::tree_scheduler, move |tree| tree.insert(key))
    }

    pub fn tree_remove(self: &Arc<Self>, input: &str) -> Submission {
        let Some(key) = parse_key(input) else {
            return Submission::Skipped;
        };
        self.launch(Self::tree_scheduler, move |tree| tree.remove(key))
    }

    pub fn hash_insert(self: &Arc<Self>, input: &str) -> Submission {
        let Some(key) = parse_key(input) else {
            return Submission::Skipped;
        };
        self.launch(Self::hash_scheduler, move |table| table.insert(key))
    }

    pub fn hash_search(self: &Arc<Self>, input: &str) -> Submission {
        let Some(key) = parse_key(input) else {
            return Submission::Skipped;
        };
        self.launch(Self::hash_scheduler, move |table| table.search(key))
    }

    pub fn heap_insert(self: &Arc<Self>, input: &str) -> Submission {
        let Some(value) = parse_key(input) else {
            return Submission::Skipped;
        };
        self.launch(Self::heap_scheduler, move |heap| heap.insert(value))
    }

    pub fn heap_extract(self: &Arc<Self>) -> Submission {
        self.launch(Self::heap_scheduler, |heap| heap.extract())
    }

    /// Run a traversal from `start`. Skipped if `start` is not a vertex.
    pub async fn graph_run(self: &Arc<Self>, algorithm: Algorithm, start: &str) -> Submission {
        let Some(start) = parse_key(start) else {
            return Submission::Skipped;
        };
        let Some(guard) = self.graph.try_begin() else {
            return Submission::Busy;
        };
        if !self.graph.inspect(|s| s.backend.contains(start)).await {
            debug!(start, "unknown start vertex");
            return Submission::Skipped;
        }

        info!(%algorithm, start, "running graph algorithm");
        let bench = Arc::clone(self);
        let task = tokio::spawn(async move {
            bench.graph.run(guard, move |graph| graph.run(algorithm, start)).await
        });
        Submission::Started(Playback(task))
    }

    /// Add a vertex, pinned at `at` or spawned near the middle. Skipped if it
    /// already exists.
    pub async fn graph_add_vertex(&self, input: &str, at: Option<Point>) -> Submission {
        let Some(id) = parse_key(input) else {
            return Submission::Skipped;
        };
        let added = self
            .graph
            .update(move |graph, mirror| {
                if graph.contains(id) {
                    return false;
                }
                graph.add_vertex(id);
                let placed = mirror.place(id, at);
                debug!(id, %placed, "vertex added");
                true
            })
            .await;
        match added {
            None => Submission::Busy,
            Some(false) => Submission::Skipped,
            Some(true) => Submission::Applied,
        }
    }

    pub async fn graph_remove_vertex(&self, input: &str) -> Submission {
        let Some(id) = parse_key(input) else {
            return Submission::Skipped;
        };
        applied(self.graph.update(move |graph, _| graph.remove_vertex(id)).await)
    }

    /// Add or re-weight the undirected edge `u`–`v`.
    pub async fn graph_add_edge(&self, u: &str, v: &str, weight: &str) -> Submission {
        let (Some(u), Some(v), Some(weight)) = (parse_key(u), parse_key(v), parse_key(weight)) else {
            return Submission::Skipped;
        };
        applied(self.graph.update(move |graph, _| graph.add_edge(u, v, weight)).await)
    }

    /// Move a vertex. Allowed during playback.
    pub async fn graph_drag(&self, input: &str, to: Point) -> Submission {
        let Some(id) = parse_key(input) else {
            return Submission::Skipped;
        };
        if self.graph.view(move |mirror| mirror.drag(id, to)).await {
            debug!(id, %to, "vertex dragged");
            Submission::Applied
        } else {
            Submission::Skipped
        }
    }

    /// Switch the heap between min and max ordering; clears it.
    pub async fn heap_set_mode(&self, min_heap: bool) -> Submission {
        applied(self.heap.update(move |heap, _| heap.set_mode(min_heap)).await)
    }
}

fn applied(result: Option<()>) -> Submission {
    match result {
        Some(()) => Submission::Applied,
        None => Submission::Busy,
    }
}
