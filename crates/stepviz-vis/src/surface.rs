//! Drawing capability the replay core renders through.
//!
//! [`Canvas`] is the retained implementation served to web clients;
//! [`RecordingSurface`] additionally logs every call for inspection.

use serde::{Deserialize, Serialize};
use stepviz_algo::Key;

use crate::scene::{BoxShape, EdgeShape, NodeShape, Primitive};

/// Address of a drawn element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Handle {
    /// Tree node or graph vertex, by key.
    Node(Key),
    /// Undirected edge; build with [`Handle::edge`].
    Edge(Key, Key),
    /// Heap node, by array index.
    Slot(usize),
    /// Heap array cell, by index.
    Cell(usize),
    /// Hash bucket, by index.
    Bucket(usize),
    /// Hash chain entry, by key.
    Entry(Key),
    /// Frontier panel item, by position.
    Frontier(usize),
}

impl Handle {
    /// Edge handle with its endpoints in ascending order.
    pub fn edge(a: Key, b: Key) -> Self {
        Handle::Edge(a.min(b), a.max(b))
    }
}

/// Visual emphasis of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Normal,
    /// The single element currently under inspection.
    Focus,
    Visited,
    Queued,
    Path,
    Compare,
    Inserted,
    Found,
    Error,
    Rotating,
}

/// A drawing target.
///
/// `set_highlight` and `show_badge` report whether the handle was present;
/// absent handles are left alone.
pub trait Surface: Send {
    fn clear(&mut self);
    fn draw_node(&mut self, node: &NodeShape);
    fn draw_edge(&mut self, edge: &EdgeShape);
    fn draw_box(&mut self, shape: &BoxShape);
    fn set_highlight(&mut self, handle: Handle, tone: Tone) -> bool;
    fn show_badge(&mut self, handle: Handle, text: &str) -> bool;
    /// Reset every element with `tone` back to [`Tone::Normal`].
    fn clear_tone(&mut self, tone: Tone);
    fn set_status(&mut self, text: &str);
}

/// Retained surface: the current frame plus status line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    items: Vec<Primitive>,
    status: String,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drawn primitives in paint order.
    pub fn items(&self) -> &[Primitive] {
        &self.items
    }

    /// Current status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// First primitive addressed by `handle`.
    pub fn get(&self, handle: Handle) -> Option<&Primitive> {
        self.items.iter().find(|item| item.handle() == handle)
    }

    /// Tone of the element addressed by `handle`.
    pub fn tone_of(&self, handle: Handle) -> Option<Tone> {
        self.get(handle).map(Primitive::tone)
    }
}

impl Surface for Canvas {
    fn clear(&mut self) {
        self.items.clear();
    }

    fn draw_node(&mut self, node: &NodeShape) {
        self.items.push(Primitive::Node(node.clone()));
    }

    fn draw_edge(&mut self, edge: &EdgeShape) {
        self.items.push(Primitive::Edge(edge.clone()));
    }

    fn draw_box(&mut self, shape: &BoxShape) {
        self.items.push(Primitive::Box(shape.clone()));
    }

    fn set_highlight(&mut self, handle: Handle, tone: Tone) -> bool {
        let mut hit = false;
        for item in self.items.iter_mut().filter(|item| item.handle() == handle) {
            item.set_tone(tone);
            hit = true;
        }
        hit
    }

    fn show_badge(&mut self, handle: Handle, text: &str) -> bool {
        self.items
            .iter_mut()
            .find(|item| item.handle() == handle)
            .is_some_and(|item| item.set_badge(text))
    }

    fn clear_tone(&mut self, tone: Tone) {
        for item in self.items.iter_mut().filter(|item| item.tone() == tone) {
            item.set_tone(Tone::Normal);
        }
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }
}

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Clear,
    DrawNode(Handle),
    DrawEdge(Handle),
    DrawBox(Handle),
    Highlight { handle: Handle, tone: Tone, hit: bool },
    Badge { handle: Handle, text: String, hit: bool },
    ClearTone(Tone),
    Status(String),
}

/// Canvas that also records every call made against it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    canvas: Canvas,
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls so far, oldest first.
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Current retained frame.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Status texts set so far, oldest first.
    pub fn statuses(&self) -> impl Iterator<Item = &str> + '_ {
        self.calls.iter().filter_map(|call| match call {
            SurfaceCall::Status(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.calls.push(SurfaceCall::Clear);
        self.canvas.clear();
    }

    fn draw_node(&mut self, node: &NodeShape) {
        self.calls.push(SurfaceCall::DrawNode(node.handle));
        self.canvas.draw_node(node);
    }

    fn draw_edge(&mut self, edge: &EdgeShape) {
        self.calls.push(SurfaceCall::DrawEdge(edge.handle));
        self.canvas.draw_edge(edge);
    }

    fn draw_box(&mut self, shape: &BoxShape) {
        self.calls.push(SurfaceCall::DrawBox(shape.handle));
        self.canvas.draw_box(shape);
    }

    fn set_highlight(&mut self, handle: Handle, tone: Tone) -> bool {
        let hit = self.canvas.set_highlight(handle, tone);
        self.calls.push(SurfaceCall::Highlight { handle, tone, hit });
        hit
    }

    fn show_badge(&mut self, handle: Handle, text: &str) -> bool {
        let hit = self.canvas.show_badge(handle, text);
        self.calls.push(SurfaceCall::Badge {
            handle,
            text: text.to_string(),
            hit,
        });
        hit
    }

    fn clear_tone(&mut self, tone: Tone) {
        self.calls.push(SurfaceCall::ClearTone(tone));
        self.canvas.clear_tone(tone);
    }

    fn set_status(&mut self, text: &str) {
        self.calls.push(SurfaceCall::Status(text.to_string()));
        self.canvas.set_status(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepviz_layout::{Point, Rect};

    fn canvas_with_cell() -> Canvas {
        let mut canvas = Canvas::new();
        canvas.draw_box(&BoxShape::new(Handle::Cell(0), Rect::new(0.0, 0.0, 10.0, 10.0), "4"));
        canvas
    }

    #[test]
    fn edge_handles_are_undirected() {
        assert_eq!(Handle::edge(3, 1), Handle::edge(1, 3));
        assert_eq!(Handle::edge(3, 1), Handle::Edge(1, 3));
    }

    #[test]
    fn highlight_reports_missing_handles() {
        let mut canvas = canvas_with_cell();
        assert!(canvas.set_highlight(Handle::Cell(0), Tone::Compare));
        assert!(!canvas.set_highlight(Handle::Cell(1), Tone::Compare));
        assert_eq!(canvas.tone_of(Handle::Cell(0)), Some(Tone::Compare));
    }

    #[test]
    fn clear_tone_only_touches_that_tone() {
        let mut canvas = canvas_with_cell();
        canvas.draw_box(&BoxShape::new(Handle::Cell(1), Rect::new(20.0, 0.0, 10.0, 10.0), "5"));
        canvas.set_highlight(Handle::Cell(0), Tone::Compare);
        canvas.set_highlight(Handle::Cell(1), Tone::Found);

        canvas.clear_tone(Tone::Compare);
        assert_eq!(canvas.tone_of(Handle::Cell(0)), Some(Tone::Normal));
        assert_eq!(canvas.tone_of(Handle::Cell(1)), Some(Tone::Found));
    }

    #[test]
    fn badges_skip_edges() {
        let mut canvas = canvas_with_cell();
        canvas.draw_edge(&EdgeShape {
            handle: Handle::edge(1, 2),
            from: Point::ORIGIN,
            to: Point::new(5.0, 5.0),
            tone: Tone::Normal,
            label: None,
        });
        assert!(canvas.show_badge(Handle::Cell(0), "x"));
        assert!(!canvas.show_badge(Handle::edge(1, 2), "x"));
    }

    #[test]
    fn recording_surface_logs_hits_and_misses() {
        let mut surface = RecordingSurface::new();
        surface.set_highlight(Handle::Node(1), Tone::Focus);
        surface.set_status("hello");

        assert_eq!(surface.calls()[0], SurfaceCall::Highlight {
            handle: Handle::Node(1),
            tone: Tone::Focus,
            hit: false,
        });
        assert_eq!(surface.statuses().collect::<Vec<_>>(), vec!["hello"]);
        assert_eq!(surface.canvas().status(), "hello");
    }

    #[test]
    fn handles_serialize_tagged() {
        let json = serde_json::to_value(Handle::edge(2, 1)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "edge", "id": [1, 2] }));
    }
}
