//! Graph mirror with a traversal overlay.
//!
//! Vertex positions are user-owned and live here, not in the backend. The
//! overlay (visited and queued marks, distance badges, highlighted edges and
//! the frontier panel) is reset when a new log begins and survives resyncs
//! for entities that still exist.

use std::collections::{BTreeMap, BTreeSet};

use stepviz_algo::{ActionRecord, EventLog, Graph, GraphAction, Key, WeightedEdge};
use stepviz_layout::{ArrayLayout, GraphPlacement, Point};

use super::{Family, SnapshotOf, Step, Visualizer};
use crate::scene::{BoxShape, EdgeShape, Label, NodeShape, Scene};
use crate::surface::{Handle, Tone};

const NODE_RADIUS: f64 = 25.0;

/// Vertices the workbench starts with, and where they sit.
pub const DEFAULT_VERTICES: [(Key, Point); 3] = [
    (1, Point::new(400.0, 100.0)),
    (2, Point::new(250.0, 300.0)),
    (3, Point::new(550.0, 300.0)),
];

/// Edges `(u, v, weight)` the workbench starts with.
pub const DEFAULT_EDGES: [(Key, Key, i64); 3] = [(1, 2, 4), (1, 3, 2), (2, 3, 5)];

/// Frontier panel items, left to right under the graph.
const FRONTIER: ArrayLayout = ArrayLayout {
    start_x: 50.0,
    y: 540.0,
    cell_width: 80.0,
    cell_height: 30.0,
    gap: 8.0,
};

#[derive(Debug, Clone, Default, PartialEq)]
struct Overlay {
    visited: BTreeSet<Key>,
    queued: BTreeSet<Key>,
    badges: BTreeMap<Key, String>,
    path: BTreeSet<(Key, Key)>,
    frontier: Vec<(Key, String)>,
}

fn undirected(a: Key, b: Key) -> (Key, Key) {
    (a.min(b), a.max(b))
}

/// Local projection of a [`Graph`] plus vertex positions.
#[derive(Debug, Clone)]
pub struct GraphMirror {
    vertices: Vec<Key>,
    edges: Vec<WeightedEdge>,
    placement: GraphPlacement<Key>,
    overlay: Overlay,
}

impl GraphMirror {
    /// Create an empty mirror; `seed` drives random spawn points.
    pub fn new(seed: u64) -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            placement: GraphPlacement::new(seed),
            overlay: Overlay::default(),
        }
    }

    /// Pin `id` at `at`, or give it a spawn point if `at` is `None` and it
    /// has no position yet.
    pub fn place(&mut self, id: Key, at: Option<Point>) -> Point {
        self.placement.place(id, at)
    }

    /// Move a vertex. False if it has no position.
    pub fn drag(&mut self, id: Key, to: Point) -> bool {
        self.placement.drag(id, to)
    }

    pub fn position(&self, id: Key) -> Option<Point> {
        self.placement.position(id)
    }

    pub fn vertices(&self) -> &[Key] {
        &self.vertices
    }

    /// Frontier panel labels, oldest first.
    pub fn frontier(&self) -> impl Iterator<Item = &str> + '_ {
        self.overlay.frontier.iter().map(|(_, label)| label.as_str())
    }

    pub fn is_visited(&self, id: Key) -> bool {
        self.overlay.visited.contains(&id)
    }

    pub fn badge(&self, id: Key) -> Option<&str> {
        self.overlay.badges.get(&id).map(String::as_str)
    }

    fn tone_of(&self, id: Key) -> Tone {
        if self.overlay.visited.contains(&id) {
            Tone::Visited
        } else if self.overlay.queued.contains(&id) {
            Tone::Queued
        } else {
            Tone::Normal
        }
    }
}

impl Visualizer for GraphMirror {
    type Action = GraphAction;
    type Backend = Graph;

    const FAMILY: Family = Family::Graph;

    fn resync(&mut self, snapshot: SnapshotOf<Self>) {
        let alive: BTreeSet<Key> = snapshot.vertices.iter().copied().collect();
        self.placement.retain(|id| alive.contains(id));
        for &id in &snapshot.vertices {
            self.placement.place(id, None);
        }

        let edges: BTreeSet<(Key, Key)> = snapshot
            .edges
            .iter()
            .map(|edge| undirected(edge.u, edge.v))
            .collect();
        let overlay = &mut self.overlay;
        overlay.visited.retain(|id| alive.contains(id));
        overlay.queued.retain(|id| alive.contains(id));
        overlay.badges.retain(|id, _| alive.contains(id));
        overlay.path.retain(|edge| edges.contains(edge));
        overlay.frontier.retain(|(id, _)| alive.contains(id));

        self.vertices = snapshot.vertices;
        self.edges = snapshot.edges;
    }

    fn begin(&mut self, _log: &EventLog<GraphAction>) {
        self.overlay = Overlay::default();
    }

    fn step(&mut self, record: &ActionRecord<GraphAction>) -> Step {
        let info = record.info.as_str();
        let with_info = |text: String| {
            if info.is_empty() {
                text
            } else {
                format!("{text} [{info}]")
            }
        };

        match record.action {
            GraphAction::Visit { node } => {
                self.overlay.queued.remove(&node);
                self.overlay.visited.insert(node);
                Step::new()
                    .highlight(Handle::Node(node), Tone::Visited)
                    .status(with_info(format!("Visit {node}")))
            }
            GraphAction::Push { node } => {
                let label = with_info(node.to_string());
                self.overlay.frontier.push((node, label));
                let step = Step::new().redraw().status(with_info(format!("Push {node}")));
                if self.overlay.visited.contains(&node) {
                    step
                } else {
                    self.overlay.queued.insert(node);
                    step.highlight(Handle::Node(node), Tone::Queued)
                }
            }
            GraphAction::Pop { node } => {
                let frontier = &mut self.overlay.frontier;
                let step = match frontier.iter().position(|(id, _)| *id == node) {
                    Some(at) => {
                        frontier.remove(at);
                        Step::new().redraw()
                    }
                    None => Step::new(),
                };
                step.status(format!("Pop {node}"))
            }
            GraphAction::UpdateDist { node, value } => {
                let text = match (info.is_empty(), value) {
                    (false, _) => info.to_string(),
                    (true, Some(value)) => value.to_string(),
                    (true, None) => "INF".to_string(),
                };
                self.overlay.badges.insert(node, text.clone());
                Step::new()
                    .badge(Handle::Node(node), text.clone())
                    .status(format!("Update {node}: {text}"))
            }
            GraphAction::HighlightEdge { from, to } => {
                self.overlay.path.insert(undirected(from, to));
                Step::new()
                    .highlight(Handle::edge(from, to), Tone::Path)
                    .status(with_info(format!("Edge {from}-{to}")))
            }
        }
    }

    fn render(&self, _viewport_width: f64) -> Scene {
        let mut scene = Scene::new();

        for edge in &self.edges {
            let Some(line) = self.placement.edge_line(edge.u, edge.v) else {
                continue;
            };
            let tone = if self.overlay.path.contains(&undirected(edge.u, edge.v)) {
                Tone::Path
            } else {
                Tone::Normal
            };
            scene.push_edge(EdgeShape {
                handle: Handle::edge(edge.u, edge.v),
                from: line.from,
                to: line.to,
                tone,
                label: Some(Label {
                    at: line.label,
                    text: edge.weight.to_string(),
                }),
            });
        }

        for &id in &self.vertices {
            if let Some(center) = self.placement.position(id) {
                scene.push_node(NodeShape {
                    handle: Handle::Node(id),
                    center,
                    radius: NODE_RADIUS,
                    label: id.to_string(),
                    tone: self.tone_of(id),
                    badge: self.overlay.badges.get(&id).cloned(),
                });
            }
        }

        for (index, (_, label)) in self.overlay.frontier.iter().enumerate() {
            scene.push_box(BoxShape::new(Handle::Frontier(index), FRONTIER.cell(index), label.clone()));
        }
        scene
    }
}
