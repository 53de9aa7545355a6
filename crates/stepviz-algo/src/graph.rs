//! Undirected weighted graph backend.
//!
//! Structural edits (`add_vertex`, `remove_vertex`, `add_edge`) are not
//! logged; only the four algorithms produce event logs. Adjacency is kept in
//! a `BTreeMap` so vertex iteration order (and therefore every log) is
//! deterministic, and neighbour lists keep edge insertion order.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::event::Recorder;
use crate::{EventLog, Key, SnapshotSource};

/// Steps recorded by graph algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphAction {
    /// `node` was settled / processed.
    Visit { node: Key },
    /// `node` entered the queue, stack or priority queue.
    Push { node: Key },
    /// `node` left the queue, stack or priority queue.
    Pop { node: Key },
    /// Tentative distance (Dijkstra) or key (Prim) of `node`; `None` is infinity.
    UpdateDist { node: Key, value: Option<i64> },
    /// The edge `from`–`to` was used.
    HighlightEdge { from: Key, to: Key },
}

/// Graph algorithms that produce a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bfs,
    Dfs,
    Dijkstra,
    Prim,
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "prim" => Ok(Algorithm::Prim),
            other => Err(format!("unknown algorithm: {other}")),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::Prim => "prim",
        };
        f.write_str(name)
    }
}

/// An undirected edge as it appears in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedEdge {
    pub u: Key,
    pub v: Key,
    pub weight: i64,
}

/// Vertices in ascending order and each undirected edge once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub vertices: Vec<Key>,
    pub edges: Vec<WeightedEdge>,
}

impl GraphSnapshot {
    /// Whether the snapshot has an edge between `a` and `b` in either orientation.
    pub fn has_edge(&self, a: Key, b: Key) -> bool {
        self.edges
            .iter()
            .any(|e| (e.u == a && e.v == b) || (e.u == b && e.v == a))
    }
}

/// Adjacency-list graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: BTreeMap<Key, Vec<(Key, i64)>>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex; existing vertices are left alone.
    pub fn add_vertex(&mut self, id: Key) {
        self.adjacency.entry(id).or_default();
    }

    /// Remove a vertex and every edge touching it.
    pub fn remove_vertex(&mut self, id: Key) {
        self.adjacency.remove(&id);
        for neighbors in self.adjacency.values_mut() {
            neighbors.retain(|(n, _)| *n != id);
        }
    }

    /// Add the undirected edge `u`–`v`, creating missing endpoints.
    ///
    /// Re-adding an existing edge replaces its weight.
    pub fn add_edge(&mut self, u: Key, v: Key, weight: i64) {
        self.add_vertex(u);
        self.add_vertex(v);
        self.link(u, v, weight);
        if u != v {
            self.link(v, u, weight);
        }
    }

    fn link(&mut self, from: Key, to: Key, weight: i64) {
        let neighbors = self.adjacency.entry(from).or_default();
        match neighbors.iter_mut().find(|(n, _)| *n == to) {
            Some(existing) => existing.1 = weight,
            None => neighbors.push((to, weight)),
        }
    }

    /// Whether `id` is a vertex.
    pub fn contains(&self, id: Key) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbors(&self, id: Key) -> &[(Key, i64)] {
        self.adjacency.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Run `algorithm` from `start`.
    pub fn run(&self, algorithm: Algorithm, start: Key) -> EventLog<GraphAction> {
        match algorithm {
            Algorithm::Bfs => self.bfs(start),
            Algorithm::Dfs => self.dfs(start),
            Algorithm::Dijkstra => self.dijkstra(start),
            Algorithm::Prim => self.prim(start),
        }
    }

    /// Breadth-first traversal. Empty log if `start` is not a vertex.
    pub fn bfs(&self, start: Key) -> EventLog<GraphAction> {
        let mut log = Recorder::new();
        if !self.contains(start) {
            return log.finish();
        }

        let mut visited = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        log.push(GraphAction::Push { node: start }, "Start");

        while let Some(current) = queue.pop_front() {
            log.push(GraphAction::Pop { node: current }, "");
            log.push(GraphAction::Visit { node: current }, "");

            for &(neighbor, _) in self.neighbors(current) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                    log.push(GraphAction::Push { node: neighbor }, "");
                    log.push(GraphAction::HighlightEdge { from: current, to: neighbor }, "");
                }
            }
        }
        log.finish()
    }

    /// Depth-first traversal with an explicit stack. Empty log if `start` is
    /// not a vertex.
    pub fn dfs(&self, start: Key) -> EventLog<GraphAction> {
        let mut log = Recorder::new();
        if !self.contains(start) {
            return log.finish();
        }

        let mut visited = BTreeSet::new();
        let mut stack = vec![start];
        log.push(GraphAction::Push { node: start }, "Start");

        while let Some(current) = stack.pop() {
            log.push(GraphAction::Pop { node: current }, "");
            if !visited.insert(current) {
                continue;
            }
            log.push(GraphAction::Visit { node: current }, "");

            // Reverse so the first-listed neighbour is explored first.
            for &(neighbor, _) in self.neighbors(current).iter().rev() {
                if !visited.contains(&neighbor) {
                    stack.push(neighbor);
                    log.push(GraphAction::Push { node: neighbor }, "");
                    log.push(GraphAction::HighlightEdge { from: current, to: neighbor }, "");
                }
            }
        }
        log.finish()
    }

    /// Single-source shortest paths. Empty log if `start` is not a vertex.
    ///
    /// A vertex is never relaxed after it has been settled, so negative
    /// weights cannot make the run loop forever.
    pub fn dijkstra(&self, start: Key) -> EventLog<GraphAction> {
        let mut log = Recorder::new();
        if !self.contains(start) {
            return log.finish();
        }

        let mut dist: BTreeMap<Key, Option<i64>> = BTreeMap::new();
        for &node in self.adjacency.keys() {
            dist.insert(node, None);
            log.push(GraphAction::UpdateDist { node, value: None }, "INF");
        }
        dist.insert(start, Some(0));
        log.push(GraphAction::UpdateDist { node: start, value: Some(0) }, "0");

        let mut settled = BTreeSet::new();
        let mut queue = BinaryHeap::from([Reverse((0i64, start))]);
        log.push(GraphAction::Push { node: start }, "d:0");

        while let Some(Reverse((d, u))) = queue.pop() {
            log.push(GraphAction::Pop { node: u }, "");
            if dist.get(&u).copied().flatten().is_some_and(|best| d > best) || settled.contains(&u) {
                continue;
            }
            settled.insert(u);
            log.push(GraphAction::Visit { node: u }, "");

            for &(v, weight) in self.neighbors(u) {
                if settled.contains(&v) {
                    continue;
                }
                let candidate = d.saturating_add(weight);
                let improves = match dist.get(&v).copied().flatten() {
                    Some(current) => candidate < current,
                    None => true,
                };
                if improves {
                    dist.insert(v, Some(candidate));
                    queue.push(Reverse((candidate, v)));
                    log.push(GraphAction::UpdateDist { node: v, value: Some(candidate) }, candidate.to_string());
                    log.push(GraphAction::Push { node: v }, format!("d:{candidate}"));
                    log.push(GraphAction::HighlightEdge { from: u, to: v }, "");
                }
            }
        }
        log.finish()
    }

    /// Prim's minimum spanning tree. Empty log if `start` is not a vertex.
    pub fn prim(&self, start: Key) -> EventLog<GraphAction> {
        let mut log = Recorder::new();
        if !self.contains(start) {
            return log.finish();
        }

        let mut key: BTreeMap<Key, Option<i64>> = BTreeMap::new();
        for &node in self.adjacency.keys() {
            key.insert(node, None);
            log.push(GraphAction::UpdateDist { node, value: None }, "Key: INF");
        }
        key.insert(start, Some(0));
        log.push(GraphAction::UpdateDist { node: start, value: Some(0) }, "Key: 0");

        let mut in_tree = BTreeSet::new();
        let mut parent: BTreeMap<Key, Key> = BTreeMap::new();
        let mut queue = BinaryHeap::from([Reverse((0i64, start))]);
        log.push(GraphAction::Push { node: start }, "k:0");

        while let Some(Reverse((_, u))) = queue.pop() {
            log.push(GraphAction::Pop { node: u }, "");
            if !in_tree.insert(u) {
                continue;
            }
            log.push(GraphAction::Visit { node: u }, "");

            if let Some(&p) = parent.get(&u) {
                log.push(GraphAction::HighlightEdge { from: p, to: u }, "MST");
            }

            for &(v, weight) in self.neighbors(u) {
                if in_tree.contains(&v) {
                    continue;
                }
                let improves = match key.get(&v).copied().flatten() {
                    Some(current) => weight < current,
                    None => true,
                };
                if improves {
                    key.insert(v, Some(weight));
                    parent.insert(v, u);
                    queue.push(Reverse((weight, v)));
                    log.push(GraphAction::UpdateDist { node: v, value: Some(weight) }, format!("Key: {weight}"));
                    log.push(GraphAction::Push { node: v }, format!("k:{weight}"));
                }
            }
        }
        log.finish()
    }
}

impl SnapshotSource for Graph {
    type Snapshot = GraphSnapshot;

    fn snapshot(&self) -> GraphSnapshot {
        let vertices = self.adjacency.keys().copied().collect();
        let edges = self
            .adjacency
            .iter()
            .flat_map(|(&u, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |(v, _)| u <= *v)
                    .map(move |&(v, weight)| WeightedEdge { u, v, weight })
            })
            .collect();
        GraphSnapshot { vertices, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Vertices 1, 2, 3 with edges (1,2,4), (1,3,2), (2,3,5).
    fn triangle() -> Graph {
        let mut graph = Graph::new();
        for id in [1, 2, 3] {
            graph.add_vertex(id);
        }
        graph.add_edge(1, 2, 4);
        graph.add_edge(1, 3, 2);
        graph.add_edge(2, 3, 5);
        graph
    }

    fn final_values(log: &EventLog<GraphAction>) -> BTreeMap<Key, Option<i64>> {
        let mut values = BTreeMap::new();
        for action in log.actions() {
            if let GraphAction::UpdateDist { node, value } = action {
                values.insert(*node, *value);
            }
        }
        values
    }

    fn visit_order(log: &EventLog<GraphAction>) -> Vec<Key> {
        log.actions()
            .filter_map(|a| match a {
                GraphAction::Visit { node } => Some(*node),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn dijkstra_final_distances() {
        let graph = triangle();
        let log = graph.dijkstra(1);

        let values = final_values(&log);
        assert_eq!(values, BTreeMap::from([(1, Some(0)), (2, Some(4)), (3, Some(2))]));
    }

    #[test]
    fn highlighted_edges_exist() {
        let graph = triangle();
        let snapshot = graph.snapshot();
        for algorithm in [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Dijkstra, Algorithm::Prim] {
            for action in graph.run(algorithm, 1).actions() {
                if let GraphAction::HighlightEdge { from, to } = action {
                    assert!(snapshot.has_edge(*from, *to), "{algorithm}: {from}-{to} is not an edge");
                }
            }
        }
    }

    #[test]
    fn bfs_visits_level_by_level() {
        let mut graph = Graph::new();
        graph.add_edge(1, 2, 1);
        graph.add_edge(1, 3, 1);
        graph.add_edge(2, 4, 1);
        graph.add_edge(3, 5, 1);

        assert_eq!(visit_order(&graph.bfs(1)), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn dfs_follows_first_neighbour() {
        let mut graph = Graph::new();
        graph.add_edge(1, 2, 1);
        graph.add_edge(1, 3, 1);
        graph.add_edge(2, 4, 1);
        graph.add_edge(3, 5, 1);

        assert_eq!(visit_order(&graph.dfs(1)), vec![1, 2, 4, 3, 5]);
    }

    #[test]
    fn prim_highlights_spanning_tree() {
        let graph = triangle();
        let log = graph.prim(1);

        let tree_edges: Vec<(Key, Key)> = log
            .iter()
            .filter_map(|r| match r.action {
                GraphAction::HighlightEdge { from, to } => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(tree_edges, vec![(1, 3), (1, 2)]);
        assert!(log.iter().filter(|r| matches!(r.action, GraphAction::HighlightEdge { .. })).all(|r| r.info == "MST"));
    }

    #[test]
    fn unknown_start_gives_empty_log() {
        let graph = triangle();
        for algorithm in [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Dijkstra, Algorithm::Prim] {
            assert!(graph.run(algorithm, 99).is_empty());
        }
        assert_eq!(graph.vertex_count(), 3);
    }

    #[test]
    fn negative_weights_terminate() {
        let mut graph = Graph::new();
        graph.add_edge(1, 2, -3);
        graph.add_edge(2, 3, 1);
        let log = graph.dijkstra(1);
        assert_eq!(visit_order(&log).len(), 3);
    }

    #[test]
    fn re_adding_edge_replaces_weight() {
        let mut graph = triangle();
        graph.add_edge(2, 1, 9);

        let snapshot = graph.snapshot();
        assert_eq!(snapshot.edges.len(), 3);
        assert!(snapshot.edges.contains(&WeightedEdge { u: 1, v: 2, weight: 9 }));
    }

    #[test]
    fn remove_vertex_drops_incident_edges() {
        let mut graph = triangle();
        graph.remove_vertex(1);

        let snapshot = graph.snapshot();
        assert_eq!(snapshot.vertices, vec![2, 3]);
        assert_eq!(snapshot.edges, vec![WeightedEdge { u: 2, v: 3, weight: 5 }]);
    }

    #[test]
    fn algorithm_parses_case_insensitively() {
        assert_eq!("Dijkstra".parse::<Algorithm>(), Ok(Algorithm::Dijkstra));
        assert!("astar".parse::<Algorithm>().is_err());
    }
}
