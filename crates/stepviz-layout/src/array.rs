//! Flat array view: one cell per slot, left to right at fixed pitch.

use crate::Rect;

/// Cell geometry for the array view of a heap.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayLayout {
    pub start_x: f64,
    pub y: f64,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
}

impl Default for ArrayLayout {
    fn default() -> Self {
        Self {
            start_x: 50.0,
            y: 420.0,
            cell_width: 50.0,
            cell_height: 50.0,
            gap: 8.0,
        }
    }
}

impl ArrayLayout {
    /// Horizontal distance between the left edges of neighbouring cells.
    pub fn pitch(&self) -> f64 {
        self.cell_width + self.gap
    }

    /// Box of cell `index`.
    pub fn cell(&self, index: usize) -> Rect {
        Rect::new(
            self.start_x + self.pitch() * index as f64,
            self.y,
            self.cell_width,
            self.cell_height,
        )
    }

    /// Boxes for an array of `len` cells.
    pub fn cells(&self, len: usize) -> Vec<Rect> {
        (0..len).map(|i| self.cell(i)).collect()
    }
}
