//! Balanced-tree mirror.
//!
//! The mirror is an index arena. Replayed `insert_node` records attach a leaf
//! by plain search-tree descent; rotations are not replayed, so the shape can
//! drift from the backend's until the terminal resync.

use std::collections::HashMap;

use stepviz_algo::{ActionRecord, AvlTree, Key, TreeAction, TreeSnapshot};
use stepviz_layout::{BinaryShape, TreeLayout};

use super::{SnapshotOf, Step, Visualizer, Family};
use crate::scene::{EdgeShape, NodeShape, Scene};
use crate::surface::{Handle, Tone};

const NODE_RADIUS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    key: Key,
    left: Option<usize>,
    right: Option<usize>,
    /// Height and balance factor, once known.
    stats: Option<Stats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stats {
    height: u32,
    balance: i32,
}

impl Stats {
    fn badge(self) -> String {
        format!("H:{} BF:{}", self.height, self.balance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Where a slot hangs: under the root pointer or a parent's child link.
type Parent = Option<(usize, Side)>;

/// Successor replacement announced by `highlight_node`, completed by the
/// following `remove_node` of the successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Replacement {
    target: usize,
    successor: Key,
}

/// Local projection of an [`AvlTree`].
#[derive(Debug, Clone, Default)]
pub struct TreeMirror {
    slots: Vec<Slot>,
    root: Option<usize>,
    cursor: Option<usize>,
    pending: Option<Replacement>,
}

impl TreeMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys reachable from the root, in preorder.
    pub fn keys(&self) -> Vec<Key> {
        let mut keys = Vec::new();
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(index) = stack.pop() {
            let Some(slot) = self.slots.get(index) else {
                continue;
            };
            keys.push(slot.key);
            stack.extend(slot.right);
            stack.extend(slot.left);
        }
        keys
    }

    fn link_mut(&mut self, parent: Parent) -> &mut Option<usize> {
        match parent {
            None => &mut self.root,
            Some((index, Side::Left)) => &mut self.slots[index].left,
            Some((index, Side::Right)) => &mut self.slots[index].right,
        }
    }

    /// Search-tree descent from `start`. Returns the slot holding `key` (if
    /// any) and the link it hangs from or would hang from.
    fn descend(&self, start: Parent, key: Key) -> (Parent, Option<usize>) {
        let mut parent = start;
        let mut current = match start {
            None => self.root,
            Some((index, Side::Left)) => self.slots[index].left,
            Some((index, Side::Right)) => self.slots[index].right,
        };
        while let Some(index) = current {
            let slot = self.slots[index];
            if key == slot.key {
                return (parent, Some(index));
            }
            let side = if key < slot.key { Side::Left } else { Side::Right };
            parent = Some((index, side));
            current = if side == Side::Left { slot.left } else { slot.right };
        }
        (parent, None)
    }

    fn find(&self, key: Key) -> Option<usize> {
        self.descend(None, key).1
    }

    /// Attach `key` as a new leaf. False if already present.
    fn insert(&mut self, key: Key) -> bool {
        let (parent, found) = self.descend(None, key);
        if found.is_some() {
            return false;
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            key,
            left: None,
            right: None,
            stats: None,
        });
        *self.link_mut(parent) = Some(index);
        true
    }

    /// Replace the slot with its only child. False if it has two.
    fn splice(&mut self, parent: Parent, index: usize) -> bool {
        let slot = self.slots[index];
        let child = match (slot.left, slot.right) {
            (Some(_), Some(_)) => return false,
            (left, right) => left.or(right),
        };
        *self.link_mut(parent) = child;
        true
    }

    fn remove(&mut self, key: Key) -> bool {
        if let Some(Replacement { target, successor }) = self.pending.take() {
            if successor == key {
                let (parent, found) = self.descend(Some((target, Side::Right)), key);
                if let Some(index) = found {
                    if self.splice(parent, index) {
                        self.slots[target].key = key;
                        return true;
                    }
                }
                return false;
            }
        }
        match self.descend(None, key) {
            (parent, Some(index)) => self.splice(parent, index),
            (_, None) => false,
        }
    }
}

impl BinaryShape for TreeMirror {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn root(&self) -> Option<usize> {
        self.root
    }

    fn left(&self, index: usize) -> Option<usize> {
        self.slots.get(index)?.left
    }

    fn right(&self, index: usize) -> Option<usize> {
        self.slots.get(index)?.right
    }
}

fn kind(action: &TreeAction) -> &'static str {
    match action {
        TreeAction::SearchVisit { .. } => "search_visit",
        TreeAction::InsertNode { .. } => "insert_node",
        TreeAction::RemoveNode { .. } => "remove_node",
        TreeAction::HighlightNode { .. } => "highlight_node",
        TreeAction::UpdateStats { .. } => "update_stats",
        TreeAction::RotateEvent { .. } => "rotate_event",
    }
}

impl Visualizer for TreeMirror {
    type Action = TreeAction;
    type Backend = AvlTree;

    const FAMILY: Family = Family::Tree;

    fn resync(&mut self, snapshot: SnapshotOf<Self>) {
        let TreeSnapshot { nodes } = snapshot;
        let index: HashMap<Key, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, row)| (row.key, i))
            .collect();
        let lookup = |child: Option<Key>| child.and_then(|key| index.get(&key).copied());

        self.slots = nodes
            .iter()
            .map(|row| Slot {
                key: row.key,
                left: lookup(row.left),
                right: lookup(row.right),
                stats: Some(Stats {
                    height: row.height,
                    balance: row.balance_factor,
                }),
            })
            .collect();
        self.root = if self.slots.is_empty() { None } else { Some(0) };
        self.cursor = None;
        self.pending = None;
    }

    fn step(&mut self, record: &ActionRecord<TreeAction>) -> Step {
        let action = record.action;
        let key = action.key();
        let described = if record.info.is_empty() {
            kind(&action).to_string()
        } else {
            format!("{}: {}", kind(&action), record.info)
        };

        match action {
            TreeAction::SearchVisit { .. } => {
                self.cursor = self.find(key);
                Step::new()
                    .clear(Tone::Focus)
                    .highlight(Handle::Node(key), Tone::Focus)
                    .status(described)
            }
            TreeAction::InsertNode { .. } => {
                let step = if self.insert(key) { Step::new().redraw() } else { Step::new() };
                step.highlight(Handle::Node(key), Tone::Inserted)
                    .status(format!("Adding node {key}"))
            }
            TreeAction::RemoveNode { .. } => {
                let step = if self.remove(key) { Step::new().redraw() } else { Step::new() };
                step.status(format!("Removing node {key}"))
            }
            TreeAction::HighlightNode { .. } => {
                if let Some(target) = self.cursor.filter(|&i| self.slots[i].key != key) {
                    self.pending = Some(Replacement {
                        target,
                        successor: key,
                    });
                }
                Step::new()
                    .highlight(Handle::Node(key), Tone::Compare)
                    .status(described)
            }
            TreeAction::UpdateStats { height, balance, .. } => {
                let stats = Stats { height, balance };
                if let Some(index) = self.find(key) {
                    self.slots[index].stats = Some(stats);
                }
                let text = if record.info.is_empty() {
                    stats.badge()
                } else {
                    record.info.clone()
                };
                Step::new().badge(Handle::Node(key), text).status(described)
            }
            TreeAction::RotateEvent { .. } => Step::new()
                .highlight(Handle::Node(key), Tone::Rotating)
                .status(format!("Tree balancing: {}", record.info)),
        }
    }

    fn render(&self, viewport_width: f64) -> Scene {
        let positions = TreeLayout::TREE.place(self, viewport_width);
        let mut scene = Scene::new();

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(from) = positions[index] else {
                continue;
            };
            for child in [slot.left, slot.right].into_iter().flatten() {
                if let Some(to) = positions[child] {
                    scene.push_edge(EdgeShape {
                        handle: Handle::edge(slot.key, self.slots[child].key),
                        from,
                        to,
                        tone: Tone::Normal,
                        label: None,
                    });
                }
            }
        }

        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(center) = positions[index] {
                scene.push_node(NodeShape {
                    handle: Handle::Node(slot.key),
                    center,
                    radius: NODE_RADIUS,
                    label: slot.key.to_string(),
                    tone: Tone::Normal,
                    badge: slot.stats.map(Stats::badge),
                });
            }
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use stepviz_algo::{EventLog, SnapshotSource};
    use stepviz_layout::{Point, DEFAULT_VIEWPORT_WIDTH};

    fn replay(mirror: &mut TreeMirror, log: &EventLog<TreeAction>) {
        mirror.begin(log);
        for record in log {
            mirror.step(record);
        }
    }

    fn key_set(keys: impl IntoIterator<Item = Key>) -> BTreeSet<Key> {
        keys.into_iter().collect()
    }

    #[test]
    fn replayed_inserts_track_backend_keys() {
        let mut tree = AvlTree::new();
        let mut mirror = TreeMirror::new();
        for key in [50, 20, 80, 10, 30, 25, 5, 1, 90, 85] {
            replay(&mut mirror, &tree.insert(key));
        }

        let keys = mirror.keys();
        assert_eq!(keys.len(), key_set(keys.clone()).len());
        assert_eq!(key_set(keys), key_set(tree.snapshot().keys()));
    }

    #[test]
    fn replayed_removals_track_backend_keys() {
        let mut tree = AvlTree::new();
        let mut mirror = TreeMirror::new();
        for key in 1..=15 {
            tree.insert(key);
        }
        mirror.resync(tree.snapshot());

        // 8 is the root with two children; 1 is a leaf; 99 is absent.
        for key in [8, 1, 99, 4] {
            replay(&mut mirror, &tree.remove(key));
            assert_eq!(key_set(mirror.keys()), key_set(tree.snapshot().keys()));
        }
    }

    #[test]
    fn resync_rebuilds_shape() {
        let mut tree = AvlTree::new();
        for key in [1, 2, 3] {
            tree.insert(key);
        }
        let mut mirror = TreeMirror::new();
        mirror.resync(tree.snapshot());

        assert_eq!(mirror.keys(), vec![2, 1, 3]);
        let scene = mirror.render(DEFAULT_VIEWPORT_WIDTH);
        let root = scene.find(Handle::Node(2)).unwrap();
        assert!(matches!(root, crate::scene::Primitive::Node(n) if n.center == Point::new(400.0, 60.0)));
        assert!(scene.find(Handle::edge(2, 3)).is_some());
    }

    #[test]
    fn resynced_nodes_carry_height_and_balance() {
        let mut tree = AvlTree::new();
        for key in [4, 2, 6, 1] {
            tree.insert(key);
        }
        let mut mirror = TreeMirror::new();
        mirror.resync(tree.snapshot());

        let scene = mirror.render(DEFAULT_VIEWPORT_WIDTH);
        let badge = |key| match scene.find(Handle::Node(key)) {
            Some(crate::scene::Primitive::Node(node)) => node.badge.clone(),
            _ => None,
        };
        assert_eq!(badge(4).as_deref(), Some("H:3 BF:1"));
        assert_eq!(badge(2).as_deref(), Some("H:2 BF:1"));
        assert_eq!(badge(1).as_deref(), Some("H:1 BF:0"));
        assert_eq!(badge(6).as_deref(), Some("H:1 BF:0"));
    }

    #[test]
    fn replayed_stats_survive_redraw() {
        let mut mirror = TreeMirror::new();
        mirror.step(&ActionRecord::new(TreeAction::InsertNode { key: 7 }, ""));
        let scene = mirror.render(DEFAULT_VIEWPORT_WIDTH);
        assert!(matches!(scene.find(Handle::Node(7)), Some(crate::scene::Primitive::Node(n)) if n.badge.is_none()));

        mirror.step(&ActionRecord::new(
            TreeAction::UpdateStats {
                key: 7,
                height: 1,
                balance: 0,
            },
            "",
        ));
        let scene = mirror.render(DEFAULT_VIEWPORT_WIDTH);
        assert!(matches!(
            scene.find(Handle::Node(7)),
            Some(crate::scene::Primitive::Node(n)) if n.badge.as_deref() == Some("H:1 BF:0")
        ));
    }

    #[test]
    fn render_is_idempotent() {
        let mut tree = AvlTree::new();
        for key in [4, 2, 6, 1] {
            tree.insert(key);
        }
        let mut mirror = TreeMirror::new();
        mirror.resync(tree.snapshot());
        assert_eq!(mirror.render(640.0), mirror.render(640.0));
    }

    #[test]
    fn search_visit_moves_focus() {
        let mut mirror = TreeMirror::new();
        let step = mirror.step(&ActionRecord::new(TreeAction::SearchVisit { key: 3 }, ""));
        assert_eq!(step.effects, vec![
            super::super::Effect::Clear(Tone::Focus),
            super::super::Effect::Highlight(Handle::Node(3), Tone::Focus),
        ]);
        assert!(!step.redraw);
    }

    #[test]
    fn rotation_status() {
        let mut mirror = TreeMirror::new();
        let step = mirror.step(&ActionRecord::new(
            TreeAction::RotateEvent { key: 3 },
            "Right rotate (LL case)",
        ));
        assert_eq!(step.status.as_deref(), Some("Tree balancing: Right rotate (LL case)"));
    }
}
