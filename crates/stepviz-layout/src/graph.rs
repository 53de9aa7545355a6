//! Graph placement.
//!
//! Graph positions are user-owned state, not derived from the structure. A
//! vertex gets its position once (caller-supplied, or a seeded random point in
//! the spawn area) and afterwards only moves when dragged. Edge endpoints are
//! recomputed from the current vertex positions on every query.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Point;

/// Endpoints of a drawn edge plus the anchor of its weight label.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeLine {
    pub from: Point,
    pub to: Point,
    pub label: Point,
}

/// User-owned vertex positions.
#[derive(Debug, Clone)]
pub struct GraphPlacement<K> {
    positions: BTreeMap<K, Point>,
    rng: StdRng,
    spawn_origin: Point,
    spawn_spread: f64,
}

impl<K: Ord + Copy> GraphPlacement<K> {
    /// Create an empty placement whose random spawn points derive from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            positions: BTreeMap::new(),
            rng: StdRng::seed_from_u64(seed),
            spawn_origin: Point::new(400.0, 300.0),
            spawn_spread: 50.0,
        }
    }

    /// Change the area new vertices spawn in.
    pub fn with_spawn(mut self, origin: Point, spread: f64) -> Self {
        self.spawn_origin = origin;
        self.spawn_spread = spread;
        self
    }

    /// Give `id` a position.
    ///
    /// An explicit `at` always wins. Without one, an already placed vertex
    /// keeps its position and a new vertex gets a random spawn point.
    pub fn place(&mut self, id: K, at: Option<Point>) -> Point {
        if let Some(at) = at {
            self.positions.insert(id, at);
            return at;
        }
        if let Some(existing) = self.positions.get(&id) {
            return *existing;
        }
        let spawned = Point::new(
            self.spawn_origin.x + self.rng.gen::<f64>() * self.spawn_spread,
            self.spawn_origin.y + self.rng.gen::<f64>() * self.spawn_spread,
        );
        self.positions.insert(id, spawned);
        spawned
    }

    /// Move an existing vertex. Returns false if `id` is not placed.
    pub fn drag(&mut self, id: K, to: Point) -> bool {
        match self.positions.get_mut(&id) {
            Some(position) => {
                *position = to;
                true
            }
            None => false,
        }
    }

    /// Forget a vertex.
    pub fn remove(&mut self, id: K) -> Option<Point> {
        self.positions.remove(&id)
    }

    /// Keep only vertices matching `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.positions.retain(|id, _| keep(id));
    }

    /// Current position of a vertex.
    pub fn position(&self, id: K) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Endpoints for the edge `u`–`v`, if both ends are placed.
    pub fn edge_line(&self, u: K, v: K) -> Option<EdgeLine> {
        let from = self.position(u)?;
        let to = self.position(v)?;
        Some(EdgeLine {
            from,
            to,
            label: from.midpoint(&to),
        })
    }

    /// Placed vertices in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (K, Point)> + '_ {
        self.positions.iter().map(|(id, at)| (*id, *at))
    }

    /// Number of placed vertices.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no vertex is placed.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_position_wins() {
        let mut placement = GraphPlacement::new(1);
        assert_eq!(placement.place(1, Some(Point::new(400.0, 100.0))), Point::new(400.0, 100.0));
        assert_eq!(placement.place(1, None), Point::new(400.0, 100.0));
    }

    #[test]
    fn spawn_points_stay_in_area() {
        let mut placement = GraphPlacement::new(7);
        for id in 0..50 {
            let at = placement.place(id, None);
            assert!((400.0..450.0).contains(&at.x));
            assert!((300.0..350.0).contains(&at.y));
        }
    }

    #[test]
    fn same_seed_same_spawns() {
        let mut a = GraphPlacement::new(42);
        let mut b = GraphPlacement::new(42);
        for id in 0..10 {
            assert_eq!(a.place(id, None), b.place(id, None));
        }
    }

    #[test]
    fn drag_updates_edge_endpoints() {
        let mut placement = GraphPlacement::new(0);
        placement.place(1, Some(Point::new(0.0, 0.0)));
        placement.place(2, Some(Point::new(100.0, 0.0)));

        let before = placement.edge_line(1, 2).unwrap();
        assert_eq!(before.label, Point::new(50.0, 0.0));

        assert!(placement.drag(2, Point::new(100.0, 100.0)));
        let after = placement.edge_line(1, 2).unwrap();
        assert_eq!(after.to, Point::new(100.0, 100.0));
        assert_eq!(after.label, Point::new(50.0, 50.0));
    }

    #[test]
    fn drag_of_unknown_vertex_is_rejected() {
        let mut placement: GraphPlacement<i64> = GraphPlacement::new(0);
        assert!(!placement.drag(9, Point::ORIGIN));
        assert!(placement.is_empty());
    }

    #[test]
    fn edge_to_removed_vertex_has_no_line() {
        let mut placement = GraphPlacement::new(0);
        placement.place(1, Some(Point::ORIGIN));
        placement.place(2, Some(Point::new(1.0, 1.0)));
        placement.remove(2);
        assert!(placement.edge_line(1, 2).is_none());
    }
}
