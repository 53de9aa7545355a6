//! stepviz Layout Engine
//!
//! Maps a structure snapshot to 2-D canvas positions.
//!
//! # Families
//!
//! - **Binary trees** (balanced tree, heap-as-tree): root centered at the top,
//!   children at `parent.x ∓ offset` one level below, offset halved per depth.
//! - **Arrays** (heap cells): fixed pitch, left to right.
//! - **Hash tables**: buckets on a row, chained entries stacked below.
//! - **Graphs**: positions are user-owned; this crate only seeds new vertices
//!   and recomputes edge endpoints from the current positions.
//!
//! Everything except [`GraphPlacement`] is stateless and deterministic: the
//! same input and viewport width always give the same coordinates.

mod geometry;
mod tree;
mod array;
mod hash;
mod graph;

pub use geometry::{Point, Rect};
pub use tree::{BinaryShape, ImplicitTree, TreeLayout};
pub use array::ArrayLayout;
pub use hash::{BucketPlacement, ChainPlacement, HashLayout};
pub use graph::{EdgeLine, GraphPlacement};

/// Default viewport width used when the caller has no measurement.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 800.0;
