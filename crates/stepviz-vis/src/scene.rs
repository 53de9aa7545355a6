//! Render output: a flat list of addressable drawing primitives.

use serde::{Deserialize, Serialize};
use stepviz_layout::{Point, Rect};

use crate::surface::{Handle, Surface, Tone};

/// A text anchored at a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub at: Point,
    pub text: String,
}

/// Circle with a centered label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeShape {
    pub handle: Handle,
    pub center: Point,
    pub radius: f64,
    pub label: String,
    pub tone: Tone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// Straight line, optionally labelled (edge weights).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeShape {
    pub handle: Handle,
    pub from: Point,
    pub to: Point,
    pub tone: Tone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

/// Rectangle with centered text: array cells, buckets, chain entries,
/// frontier items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub handle: Handle,
    pub rect: Rect,
    pub label: String,
    pub tone: Tone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Text drawn outside the box (bucket index, array index).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<Label>,
    /// Where the entrance transition starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enter_from: Option<Rect>,
    /// Incoming connector line (chained entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<(Point, Point)>,
}

impl BoxShape {
    /// Plain box with no caption, transition or connector.
    pub fn new(handle: Handle, rect: Rect, label: impl Into<String>) -> Self {
        Self {
            handle,
            rect,
            label: label.into(),
            tone: Tone::Normal,
            badge: None,
            caption: None,
            enter_from: None,
            connector: None,
        }
    }
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Primitive {
    Node(NodeShape),
    Edge(EdgeShape),
    Box(BoxShape),
}

impl Primitive {
    /// Handle addressing this primitive.
    pub fn handle(&self) -> Handle {
        match self {
            Primitive::Node(node) => node.handle,
            Primitive::Edge(edge) => edge.handle,
            Primitive::Box(shape) => shape.handle,
        }
    }

    /// Current tone.
    pub fn tone(&self) -> Tone {
        match self {
            Primitive::Node(node) => node.tone,
            Primitive::Edge(edge) => edge.tone,
            Primitive::Box(shape) => shape.tone,
        }
    }

    pub(crate) fn set_tone(&mut self, tone: Tone) {
        match self {
            Primitive::Node(node) => node.tone = tone,
            Primitive::Edge(edge) => edge.tone = tone,
            Primitive::Box(shape) => shape.tone = tone,
        }
    }

    /// Set the badge text. Edges carry no badge.
    pub(crate) fn set_badge(&mut self, text: &str) -> bool {
        match self {
            Primitive::Node(node) => node.badge = Some(text.to_string()),
            Primitive::Box(shape) => shape.badge = Some(text.to_string()),
            Primitive::Edge(_) => return false,
        }
        true
    }
}

/// Everything one render pass produced, in paint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    primitives: Vec<Primitive>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_node(&mut self, node: NodeShape) {
        self.primitives.push(Primitive::Node(node));
    }

    pub fn push_edge(&mut self, edge: EdgeShape) {
        self.primitives.push(Primitive::Edge(edge));
    }

    pub fn push_box(&mut self, shape: BoxShape) {
        self.primitives.push(Primitive::Box(shape));
    }

    /// Primitives in paint order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// First primitive addressed by `handle`.
    pub fn find(&self, handle: Handle) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.handle() == handle)
    }

    /// Replace the surface contents with this scene.
    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        for primitive in &self.primitives {
            match primitive {
                Primitive::Node(node) => surface.draw_node(node),
                Primitive::Edge(edge) => surface.draw_edge(edge),
                Primitive::Box(shape) => surface.draw_box(shape),
            }
        }
    }
}
