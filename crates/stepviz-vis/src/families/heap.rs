//! Heap mirror: the array, drawn both as a tree and as cells.
//!
//! Heap nodes are addressed by [`Handle::Slot`], array cells by
//! [`Handle::Cell`], and parent links by the [`Handle::Edge`] of their two
//! slot indices.

use stepviz_algo::{ActionRecord, Heap, HeapAction, Key};
use stepviz_layout::{ArrayLayout, ImplicitTree, TreeLayout};

use super::{Family, SnapshotOf, Step, Visualizer};
use crate::scene::{BoxShape, EdgeShape, Label, NodeShape, Scene};
use crate::surface::{Handle, Tone};

const NODE_RADIUS: f64 = 22.0;

/// Local projection of a [`Heap`].
#[derive(Debug, Clone)]
pub struct HeapMirror {
    values: Vec<Key>,
    min_heap: bool,
    cells: ArrayLayout,
}

impl Default for HeapMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapMirror {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            min_heap: true,
            cells: ArrayLayout::default(),
        }
    }

    pub fn values(&self) -> &[Key] {
        &self.values
    }

    pub fn is_min_heap(&self) -> bool {
        self.min_heap
    }

    fn mark(step: Step, index: usize, tone: Tone) -> Step {
        step.highlight(Handle::Slot(index), tone)
            .highlight(Handle::Cell(index), tone)
    }
}

impl Visualizer for HeapMirror {
    type Action = HeapAction;
    type Backend = Heap;

    const FAMILY: Family = Family::Heap;

    fn resync(&mut self, snapshot: SnapshotOf<Self>) {
        self.values = snapshot.values;
        self.min_heap = snapshot.min_heap;
    }

    fn step(&mut self, record: &ActionRecord<HeapAction>) -> Step {
        let step = Step::new().status(record.info.clone());
        match record.action {
            HeapAction::Insert { value, .. } => {
                self.values.push(value);
                Self::mark(step.redraw(), self.values.len() - 1, Tone::Inserted)
            }
            HeapAction::Highlight { a, b } => {
                let step = step.clear(Tone::Compare);
                Self::mark(Self::mark(step, a, Tone::Compare), b, Tone::Compare)
            }
            HeapAction::Swap { a, b } => {
                if a < self.values.len() && b < self.values.len() {
                    self.values.swap(a, b);
                    step.redraw()
                } else {
                    step
                }
            }
            HeapAction::Extract { .. } => match self.values.pop() {
                Some(_) => step.redraw(),
                None => step,
            },
            HeapAction::Complete => step,
        }
    }

    fn render(&self, viewport_width: f64) -> Scene {
        let positions = TreeLayout::HEAP.place(&ImplicitTree::new(self.values.len()), viewport_width);
        let mut scene = Scene::new();

        for index in 1..self.values.len() {
            let Some(parent) = ImplicitTree::parent(index) else {
                continue;
            };
            if let (Some(from), Some(to)) = (positions[parent], positions[index]) {
                scene.push_edge(EdgeShape {
                    handle: Handle::edge(parent as Key, index as Key),
                    from,
                    to,
                    tone: Tone::Normal,
                    label: None,
                });
            }
        }

        for (index, &value) in self.values.iter().enumerate() {
            if let Some(center) = positions[index] {
                scene.push_node(NodeShape {
                    handle: Handle::Slot(index),
                    center,
                    radius: NODE_RADIUS,
                    label: value.to_string(),
                    tone: Tone::Normal,
                    badge: None,
                });
            }
        }

        for (index, rect) in self.cells.cells(self.values.len()).into_iter().enumerate() {
            let mut cell = BoxShape::new(Handle::Cell(index), rect, self.values[index].to_string());
            cell.caption = Some(Label {
                at: rect.bottom_center(),
                text: index.to_string(),
            });
            scene.push_box(cell);
        }
        scene
    }
}
