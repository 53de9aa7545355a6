//! AVL tree backend.
//!
//! Insert and remove record the search path, height/balance updates and every
//! rotation. Duplicate inserts and removals of absent keys leave the tree
//! untouched; their logs simply contain no `insert_node` / `remove_node`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::event::Recorder;
use crate::{EventLog, Key, SnapshotSource};

/// Steps recorded by tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeAction {
    /// The search path passed through `key`.
    SearchVisit { key: Key },
    /// A new leaf holding `key` was attached.
    InsertNode { key: Key },
    /// The node holding `key` (at most one child) was spliced out.
    RemoveNode { key: Key },
    /// A node now holds `key` (successor replacement during removal).
    HighlightNode { key: Key },
    /// Height and balance factor of `key` were recomputed.
    UpdateStats { key: Key, height: u32, balance: i32 },
    /// A rotation pivoting on `key`.
    RotateEvent { key: Key },
}

impl TreeAction {
    /// The node this step is about.
    pub fn key(&self) -> Key {
        match self {
            TreeAction::SearchVisit { key }
            | TreeAction::InsertNode { key }
            | TreeAction::RemoveNode { key }
            | TreeAction::HighlightNode { key }
            | TreeAction::UpdateStats { key, .. }
            | TreeAction::RotateEvent { key } => *key,
        }
    }
}

/// One node of a [`TreeSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNodeRow {
    pub key: Key,
    pub height: u32,
    pub balance_factor: i32,
    pub left: Option<Key>,
    pub right: Option<Key>,
}

/// All nodes in preorder, root first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub nodes: Vec<TreeNodeRow>,
}

impl TreeSnapshot {
    /// Keys in snapshot (preorder) order.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.nodes.iter().map(|n| n.key)
    }
}

type Link = Option<Box<Node>>;

#[derive(Debug)]
struct Node {
    key: Key,
    height: u32,
    left: Link,
    right: Link,
}

impl Node {
    fn leaf(key: Key) -> Self {
        Self {
            key,
            height: 1,
            left: None,
            right: None,
        }
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance(&self) -> i32 {
        height(&self.left) as i32 - height(&self.right) as i32
    }
}

fn height(link: &Link) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn balance(link: &Link) -> i32 {
    link.as_ref().map_or(0, |n| n.balance())
}

/// Self-balancing binary search tree.
#[derive(Debug, Default)]
pub struct AvlTree {
    root: Link,
    len: usize,
}

impl AvlTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the whole tree (0 when empty).
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Whether `key` is stored.
    pub fn contains(&self, key: Key) -> bool {
        let mut current = &self.root;
        while let Some(node) = current {
            match key.cmp(&node.key) {
                Ordering::Less => current = &node.left,
                Ordering::Greater => current = &node.right,
                Ordering::Equal => return true,
            }
        }
        false
    }

    /// Insert `key`, rebalancing on the way back up.
    pub fn insert(&mut self, key: Key) -> EventLog<TreeAction> {
        let mut log = Recorder::new();
        let mut inserted = false;
        self.root = Some(insert(self.root.take(), key, &mut log, &mut inserted));
        if inserted {
            self.len += 1;
        }
        log.finish()
    }

    /// Remove `key`, rebalancing on the way back up.
    pub fn remove(&mut self, key: Key) -> EventLog<TreeAction> {
        let mut log = Recorder::new();
        let mut removed = false;
        self.root = remove(self.root.take(), key, &mut log, &mut removed);
        if removed {
            self.len -= 1;
        }
        log.finish()
    }
}

impl SnapshotSource for AvlTree {
    type Snapshot = TreeSnapshot;

    fn snapshot(&self) -> TreeSnapshot {
        let mut nodes = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            nodes.push(TreeNodeRow {
                key: node.key,
                height: node.height,
                balance_factor: node.balance(),
                left: node.left.as_ref().map(|n| n.key),
                right: node.right.as_ref().map(|n| n.key),
            });
            if let Some(right) = node.right.as_deref() {
                stack.push(right);
            }
            if let Some(left) = node.left.as_deref() {
                stack.push(left);
            }
        }
        TreeSnapshot { nodes }
    }
}

fn rotate_right(mut y: Box<Node>, log: &mut Recorder<TreeAction>) -> Box<Node> {
    log.push(TreeAction::RotateEvent { key: y.key }, "Right rotate (LL case)");
    let Some(mut x) = y.left.take() else {
        return y;
    };
    y.left = x.right.take();
    y.update_height();
    x.right = Some(y);
    x.update_height();
    x
}

fn rotate_left(mut x: Box<Node>, log: &mut Recorder<TreeAction>) -> Box<Node> {
    log.push(TreeAction::RotateEvent { key: x.key }, "Left rotate (RR case)");
    let Some(mut y) = x.right.take() else {
        return x;
    };
    x.right = y.left.take();
    x.update_height();
    y.left = Some(x);
    y.update_height();
    y
}

fn record_stats(node: &Node, log: &mut Recorder<TreeAction>) -> i32 {
    let balance = node.balance();
    log.push(
        TreeAction::UpdateStats {
            key: node.key,
            height: node.height,
            balance,
        },
        format!("H:{} BF:{}", node.height, balance),
    );
    balance
}

fn insert(link: Link, key: Key, log: &mut Recorder<TreeAction>, inserted: &mut bool) -> Box<Node> {
    let Some(mut node) = link else {
        log.push(TreeAction::InsertNode { key }, "Inserted");
        *inserted = true;
        return Box::new(Node::leaf(key));
    };

    log.push(TreeAction::SearchVisit { key: node.key }, "");
    match key.cmp(&node.key) {
        Ordering::Less => node.left = Some(insert(node.left.take(), key, log, inserted)),
        Ordering::Greater => node.right = Some(insert(node.right.take(), key, log, inserted)),
        Ordering::Equal => return node,
    }

    node.update_height();
    let balance = record_stats(&node, log);

    if balance > 1 {
        let left_key = node.left.as_ref().map_or(key, |n| n.key);
        if key < left_key {
            return rotate_right(node, log);
        }
        if key > left_key {
            log.push(TreeAction::RotateEvent { key: left_key }, "Left rotate (LR prep)");
            if let Some(left) = node.left.take() {
                node.left = Some(rotate_left(left, log));
            }
            return rotate_right(node, log);
        }
    }
    if balance < -1 {
        let right_key = node.right.as_ref().map_or(key, |n| n.key);
        if key > right_key {
            return rotate_left(node, log);
        }
        if key < right_key {
            log.push(TreeAction::RotateEvent { key: right_key }, "Right rotate (RL prep)");
            if let Some(right) = node.right.take() {
                node.right = Some(rotate_right(right, log));
            }
            return rotate_left(node, log);
        }
    }
    node
}

fn min_key(node: &Node) -> Key {
    let mut current = node;
    while let Some(left) = current.left.as_deref() {
        current = left;
    }
    current.key
}

fn remove(link: Link, key: Key, log: &mut Recorder<TreeAction>, removed: &mut bool) -> Link {
    let mut node = link?;

    log.push(TreeAction::SearchVisit { key: node.key }, "");
    match key.cmp(&node.key) {
        Ordering::Less => node.left = remove(node.left.take(), key, log, removed),
        Ordering::Greater => node.right = remove(node.right.take(), key, log, removed),
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, None) => {
                log.push(TreeAction::RemoveNode { key }, "Deleted");
                *removed = true;
                return None;
            }
            (Some(child), None) | (None, Some(child)) => {
                log.push(TreeAction::RemoveNode { key }, "Deleted");
                *removed = true;
                node = child;
            }
            (Some(left), Some(right)) => {
                let successor = min_key(&right);
                node.key = successor;
                node.left = Some(left);
                log.push(TreeAction::HighlightNode { key: successor }, "Replaced with successor");
                node.right = remove(Some(right), successor, log, removed);
            }
        },
    }

    node.update_height();
    let balance = record_stats(&node, log);

    if balance > 1 {
        if balance_of_left(&node) < 0 {
            if let Some(left) = node.left.take() {
                node.left = Some(rotate_left(left, log));
            }
        }
        return Some(rotate_right(node, log));
    }
    if balance < -1 {
        if balance_of_right(&node) > 0 {
            if let Some(right) = node.right.take() {
                node.right = Some(rotate_right(right, log));
            }
        }
        return Some(rotate_left(node, log));
    }
    Some(node)
}

fn balance_of_left(node: &Node) -> i32 {
    balance(&node.left)
}

fn balance_of_right(node: &Node) -> i32 {
    balance(&node.right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn inorder(snapshot: &TreeSnapshot) -> Vec<Key> {
        let mut keys: Vec<Key> = snapshot.keys().collect();
        keys.sort_unstable();
        keys
    }

    fn assert_balanced(tree: &AvlTree) {
        for row in tree.snapshot().nodes {
            assert!(row.balance_factor.abs() <= 1, "node {} unbalanced: {}", row.key, row.balance_factor);
        }
    }

    #[test]
    fn first_insert_is_root() {
        let mut tree = AvlTree::new();
        let log = tree.insert(10);

        assert_eq!(log.len(), 1);
        assert_eq!(log.get(0).unwrap().action, TreeAction::InsertNode { key: 10 });

        let snapshot = tree.snapshot();
        assert_eq!(snapshot.nodes[0], TreeNodeRow {
            key: 10,
            height: 1,
            balance_factor: 0,
            left: None,
            right: None,
        });
    }

    #[test]
    fn ascending_inserts_rotate_left() {
        let mut tree = AvlTree::new();
        tree.insert(10);
        tree.insert(20);
        let log = tree.insert(30);

        let actions: Vec<_> = log.actions().copied().collect();
        assert_eq!(actions, vec![
            TreeAction::SearchVisit { key: 10 },
            TreeAction::SearchVisit { key: 20 },
            TreeAction::InsertNode { key: 30 },
            TreeAction::UpdateStats { key: 20, height: 2, balance: -1 },
            TreeAction::UpdateStats { key: 10, height: 3, balance: -2 },
            TreeAction::RotateEvent { key: 10 },
        ]);

        let snapshot = tree.snapshot();
        assert_eq!(snapshot.nodes[0].key, 20);
        assert_eq!(snapshot.nodes[0].left, Some(10));
        assert_eq!(snapshot.nodes[0].right, Some(30));
    }

    #[test]
    fn left_right_case_logs_prep_rotation() {
        let mut tree = AvlTree::new();
        tree.insert(30);
        tree.insert(10);
        let log = tree.insert(20);

        let rotations: Vec<_> = log
            .iter()
            .filter(|r| matches!(r.action, TreeAction::RotateEvent { .. }))
            .map(|r| r.info.as_str())
            .collect();
        assert_eq!(rotations, vec!["Left rotate (LR prep)", "Left rotate (RR case)", "Right rotate (LL case)"]);
        assert_eq!(tree.snapshot().nodes[0].key, 20);
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let mut tree = AvlTree::new();
        tree.insert(5);
        let log = tree.insert(5);

        assert_eq!(tree.len(), 1);
        assert!(!log.actions().any(|a| matches!(a, TreeAction::InsertNode { .. })));
    }

    #[test]
    fn remove_absent_key_logs_search_only() {
        let mut tree = AvlTree::new();
        tree.insert(5);
        tree.insert(3);
        let log = tree.remove(4);

        assert_eq!(tree.len(), 2);
        assert!(log.actions().all(|a| !matches!(a, TreeAction::RemoveNode { .. })));
        assert_eq!(log.get(0).unwrap().action, TreeAction::SearchVisit { key: 5 });
    }

    #[test]
    fn remove_with_two_children_uses_successor() {
        let mut tree = AvlTree::new();
        for key in [20, 10, 30, 25, 40] {
            tree.insert(key);
        }
        let log = tree.remove(20);

        assert!(log.actions().any(|a| *a == TreeAction::HighlightNode { key: 25 }));
        assert!(log.actions().any(|a| *a == TreeAction::RemoveNode { key: 25 }));
        assert!(!tree.contains(20));
        assert!(tree.contains(25));
        assert_eq!(tree.snapshot().nodes[0].key, 25);
    }

    #[test]
    fn remove_empty_tree() {
        let mut tree = AvlTree::new();
        assert!(tree.remove(1).is_empty());
    }

    #[test]
    fn snapshot_is_preorder() {
        let mut tree = AvlTree::new();
        for key in [4, 2, 6, 1, 3, 5, 7] {
            tree.insert(key);
        }
        let keys: Vec<Key> = tree.snapshot().keys().collect();
        assert_eq!(keys, vec![4, 2, 1, 3, 6, 5, 7]);
    }

    proptest! {
        #[test]
        fn inserts_keep_unique_sorted_keys(keys in proptest::collection::vec(-50i64..50, 0..60)) {
            let mut tree = AvlTree::new();
            for &key in &keys {
                tree.insert(key);
            }

            let mut expected = keys.clone();
            expected.sort_unstable();
            expected.dedup();

            let snapshot = tree.snapshot();
            prop_assert_eq!(inorder(&snapshot), expected.clone());
            prop_assert_eq!(snapshot.nodes.len(), expected.len());
            prop_assert_eq!(tree.len(), expected.len());
            assert_balanced(&tree);
        }

        #[test]
        fn removes_keep_balance(keys in proptest::collection::vec(0i64..40, 1..40), victims in proptest::collection::vec(0i64..40, 0..20)) {
            let mut tree = AvlTree::new();
            for &key in &keys {
                tree.insert(key);
            }
            for &victim in &victims {
                tree.remove(victim);
                prop_assert!(!tree.contains(victim));
            }
            assert_balanced(&tree);
            prop_assert_eq!(tree.snapshot().nodes.len(), tree.len());
        }
    }
}
