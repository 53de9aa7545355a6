//! Hash-table layout.
//!
//! Buckets sit on one row at a fixed horizontal pitch, ordered by bucket
//! index. Chained entries hang below their bucket at a fixed vertical pitch in
//! chain (insertion) order. Each entry also gets an entering position slightly
//! below its rest position so a renderer can fade/slide it into place.

use crate::{Point, Rect};

/// Distance below the rest position an entry starts its entrance from.
const ENTER_DROP: f64 = 15.0;

/// Gap left between a connector line and the box it points at.
const CONNECTOR_GAP: f64 = 5.0;

/// Geometry constants for the bucket row and chains.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HashLayout {
    pub start_x: f64,
    pub start_y: f64,
    pub bucket_width: f64,
    pub bucket_height: f64,
    pub chain_width: f64,
    pub chain_height: f64,
    pub gap_x: f64,
    pub gap_y: f64,
}

impl Default for HashLayout {
    fn default() -> Self {
        Self {
            start_x: 50.0,
            start_y: 40.0,
            bucket_width: 60.0,
            bucket_height: 40.0,
            chain_width: 50.0,
            chain_height: 35.0,
            gap_x: 20.0,
            gap_y: 30.0,
        }
    }
}

/// Where one bucket and its chain go.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BucketPlacement {
    pub index: usize,
    pub rect: Rect,
    /// Anchor for the bucket index caption under the box.
    pub caption: Point,
    pub chain: Vec<ChainPlacement>,
}

/// Where one chained entry goes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainPlacement {
    /// Resting box.
    pub rest: Rect,
    /// Box the entrance transition starts from.
    pub enter_from: Rect,
    /// Connector from the previous box (bucket or entry) down to this one.
    pub connector: (Point, Point),
}

impl HashLayout {
    /// Box of bucket `index`.
    pub fn bucket(&self, index: usize) -> Rect {
        Rect::new(
            self.start_x + (self.bucket_width + self.gap_x) * index as f64,
            self.start_y,
            self.bucket_width,
            self.bucket_height,
        )
    }

    /// Place every bucket; `chain_lengths[i]` is the chain length of bucket `i`.
    pub fn place(&self, chain_lengths: &[usize]) -> Vec<BucketPlacement> {
        chain_lengths
            .iter()
            .enumerate()
            .map(|(index, &len)| self.place_bucket(index, len))
            .collect()
    }

    /// Place a single bucket with a chain of `len` entries.
    pub fn place_bucket(&self, index: usize, len: usize) -> BucketPlacement {
        let rect = self.bucket(index);
        let spine_x = rect.x + self.bucket_width / 2.0;
        let chain_x = rect.x + (self.bucket_width - self.chain_width) / 2.0;

        let mut previous_bottom = rect.y + rect.height;
        let mut y = previous_bottom + self.gap_y;
        let mut chain = Vec::with_capacity(len);
        for _ in 0..len {
            let rest = Rect::new(chain_x, y, self.chain_width, self.chain_height);
            chain.push(ChainPlacement {
                rest,
                enter_from: rest.translated(Point::new(0.0, ENTER_DROP)),
                connector: (
                    Point::new(spine_x, previous_bottom),
                    Point::new(spine_x, y - CONNECTOR_GAP),
                ),
            });
            previous_bottom = y + self.chain_height;
            y += self.chain_height + self.gap_y;
        }

        BucketPlacement {
            index,
            rect,
            caption: Point::new(spine_x, rect.y + rect.height + 15.0),
            chain,
        }
    }
}
