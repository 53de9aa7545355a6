//! Binary-tree layout.
//!
//! The root sits at `(width / 2, start_y)`. A child is placed one level below
//! its parent, `offset` to the left or right, and the offset halves at every
//! depth starting from `width / 4`. Sibling subtrees of a complete tree never
//! overlap and the result depends only on the viewport width and tree shape.
//!
//! Placement walks an index-addressed arena with an explicit work-list, so a
//! degenerate (list-shaped) tree of any depth cannot exhaust the stack.

use crate::Point;

/// Index-addressed view of a binary tree.
///
/// Indices are arena slots in `0..len()`. Children outside that range are
/// treated as absent.
pub trait BinaryShape {
    /// Number of arena slots.
    fn len(&self) -> usize;

    /// Arena slot of the root, if the tree is non-empty.
    fn root(&self) -> Option<usize>;

    /// Arena slot of the left child of `index`.
    fn left(&self, index: usize) -> Option<usize>;

    /// Arena slot of the right child of `index`.
    fn right(&self, index: usize) -> Option<usize>;

    /// Whether the arena holds no slots.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The implicit array-as-tree view of a heap: children of `i` are `2i + 1`
/// and `2i + 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImplicitTree {
    len: usize,
}

impl ImplicitTree {
    /// View an array of `len` elements as a tree.
    pub const fn new(len: usize) -> Self {
        Self { len }
    }

    /// Parent slot of `index` (none for the root).
    pub const fn parent(index: usize) -> Option<usize> {
        if index == 0 {
            None
        } else {
            Some((index - 1) / 2)
        }
    }
}

impl BinaryShape for ImplicitTree {
    fn len(&self) -> usize {
        self.len
    }

    fn root(&self) -> Option<usize> {
        (self.len > 0).then_some(0)
    }

    fn left(&self, index: usize) -> Option<usize> {
        let child = 2 * index + 1;
        (child < self.len).then_some(child)
    }

    fn right(&self, index: usize) -> Option<usize> {
        let child = 2 * index + 2;
        (child < self.len).then_some(child)
    }
}

/// Parameters of the recursive halving layout.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeLayout {
    /// Vertical position of the root.
    pub start_y: f64,
    /// Vertical distance between depths.
    pub level_height: f64,
}

impl TreeLayout {
    /// Preset for balanced search trees.
    pub const TREE: Self = Self {
        start_y: 60.0,
        level_height: 70.0,
    };

    /// Preset for the heap-as-tree view.
    pub const HEAP: Self = Self {
        start_y: 50.0,
        level_height: 70.0,
    };

    /// Compute a position for every arena slot reachable from the root.
    ///
    /// The returned vector is indexed by arena slot; unreachable slots are
    /// `None`. A slot reachable along more than one path (malformed input) is
    /// placed at the first position the walk assigns it.
    pub fn place<S: BinaryShape + ?Sized>(&self, shape: &S, width: f64) -> Vec<Option<Point>> {
        let mut positions = vec![None; shape.len()];
        let Some(root) = shape.root() else {
            return positions;
        };

        let mut work = vec![(root, Point::new(width / 2.0, self.start_y), width / 4.0)];
        while let Some((index, at, offset)) = work.pop() {
            let Some(slot) = positions.get_mut(index) else {
                continue;
            };
            if slot.is_some() {
                continue;
            }
            *slot = Some(at);

            let below = at.y + self.level_height;
            // Right first so the left subtree is popped (and placed) first.
            if let Some(right) = shape.right(index) {
                work.push((right, Point::new(at.x + offset, below), offset / 2.0));
            }
            if let Some(left) = shape.left(index) {
                work.push((left, Point::new(at.x - offset, below), offset / 2.0));
            }
        }

        positions
    }
}

impl Default for TreeLayout {
    fn default() -> Self {
        Self::TREE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Arena used to exercise arbitrary shapes.
    struct Arena {
        root: Option<usize>,
        children: Vec<(Option<usize>, Option<usize>)>,
    }

    impl BinaryShape for Arena {
        fn len(&self) -> usize {
            self.children.len()
        }
        fn root(&self) -> Option<usize> {
            self.root
        }
        fn left(&self, index: usize) -> Option<usize> {
            self.children.get(index).and_then(|c| c.0)
        }
        fn right(&self, index: usize) -> Option<usize> {
            self.children.get(index).and_then(|c| c.1)
        }
    }

    /// Straightforward recursive formulation, kept as the reference.
    fn place_recursive(
        shape: &dyn BinaryShape,
        layout: &TreeLayout,
        index: Option<usize>,
        at: Point,
        offset: f64,
        out: &mut Vec<Option<Point>>,
    ) {
        let Some(index) = index else { return };
        out[index] = Some(at);
        let below = at.y + layout.level_height;
        place_recursive(shape, layout, shape.left(index), Point::new(at.x - offset, below), offset / 2.0, out);
        place_recursive(shape, layout, shape.right(index), Point::new(at.x + offset, below), offset / 2.0, out);
    }

    #[test]
    fn root_is_centered() {
        let positions = TreeLayout::TREE.place(&ImplicitTree::new(1), 800.0);
        assert_eq!(positions, vec![Some(Point::new(400.0, 60.0))]);
    }

    #[test]
    fn children_halve_the_offset() {
        let positions = TreeLayout::HEAP.place(&ImplicitTree::new(7), 800.0);
        let at = |i: usize| positions[i].unwrap();

        assert_eq!(at(0), Point::new(400.0, 50.0));
        assert_eq!(at(1), Point::new(200.0, 120.0));
        assert_eq!(at(2), Point::new(600.0, 120.0));
        assert_eq!(at(3), Point::new(100.0, 190.0));
        assert_eq!(at(4), Point::new(300.0, 190.0));
        assert_eq!(at(5), Point::new(500.0, 190.0));
        assert_eq!(at(6), Point::new(700.0, 190.0));
    }

    #[test]
    fn implicit_parent() {
        assert_eq!(ImplicitTree::parent(0), None);
        assert_eq!(ImplicitTree::parent(1), Some(0));
        assert_eq!(ImplicitTree::parent(2), Some(0));
        assert_eq!(ImplicitTree::parent(6), Some(2));
    }

    #[test]
    fn unreachable_slots_stay_unplaced() {
        let arena = Arena {
            root: Some(0),
            children: vec![(None, Some(1)), (None, None), (None, None)],
        };
        let positions = TreeLayout::TREE.place(&arena, 400.0);
        assert!(positions[0].is_some());
        assert_eq!(positions[1], Some(Point::new(300.0, 130.0)));
        assert_eq!(positions[2], None);
    }

    #[test]
    fn cycles_do_not_loop() {
        let arena = Arena {
            root: Some(0),
            children: vec![(Some(1), None), (Some(0), Some(1))],
        };
        let positions = TreeLayout::TREE.place(&arena, 400.0);
        assert_eq!(positions.iter().filter(|p| p.is_some()).count(), 2);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let depth = 100_000;
        let children = (0..depth)
            .map(|i| (None, (i + 1 < depth).then_some(i + 1)))
            .collect();
        let arena = Arena { root: Some(0), children };

        let positions = TreeLayout::TREE.place(&arena, 800.0);
        let last = positions[depth - 1].unwrap();
        assert_eq!(last.y, 60.0 + 70.0 * (depth - 1) as f64);
    }

    proptest! {
        #[test]
        fn matches_recursive_reference(len in 0usize..200, width in 100.0f64..2000.0) {
            let shape = ImplicitTree::new(len);
            let worklist = TreeLayout::HEAP.place(&shape, width);

            let mut reference = vec![None; len];
            place_recursive(&shape, &TreeLayout::HEAP, shape.root(), Point::new(width / 2.0, 50.0), width / 4.0, &mut reference);

            prop_assert_eq!(worklist, reference);
        }

        #[test]
        fn placement_is_deterministic(len in 0usize..200, width in 100.0f64..2000.0) {
            let shape = ImplicitTree::new(len);
            prop_assert_eq!(TreeLayout::TREE.place(&shape, width), TreeLayout::TREE.place(&shape, width));
        }
    }
}
