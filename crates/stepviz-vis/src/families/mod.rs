//! Per-family visual mirrors.
//!
//! A [`Visualizer`] keeps a local projection of one backend (the mirror),
//! translates each replayed record into mirror mutations plus visual
//! [`Effect`]s, and renders the mirror into a [`Scene`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stepviz_algo::{ActionRecord, EventLog, SnapshotSource};

use crate::scene::Scene;
use crate::surface::{Handle, Tone};

mod graph;
mod hash;
mod heap;
mod tree;

pub use graph::{GraphMirror, DEFAULT_EDGES, DEFAULT_VERTICES};
pub use hash::HashMirror;
pub use heap::HeapMirror;
pub use tree::TreeMirror;

/// Snapshot type of a visualizer's backend.
pub type SnapshotOf<V> = <<V as Visualizer>::Backend as SnapshotSource>::Snapshot;

/// Structure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Tree,
    Graph,
    Hash,
    Heap,
}

impl Family {
    pub const ALL: [Family; 4] = [Family::Tree, Family::Graph, Family::Hash, Family::Heap];

    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Tree => "tree",
            Family::Graph => "graph",
            Family::Hash => "hash",
            Family::Heap => "heap",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Family::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| format!("unknown family: {s}"))
    }
}

/// A visual change applied to the surface after a step.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Highlight(Handle, Tone),
    Badge(Handle, String),
    /// Reset every element carrying this tone.
    Clear(Tone),
}

/// Outcome of replaying one record against the mirror.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    /// Applied in order, after the redraw.
    pub effects: Vec<Effect>,
    /// The mirror structure changed and must be re-rendered first.
    pub redraw: bool,
    /// New status line, if any.
    pub status: Option<String>,
}

impl Step {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redraw(mut self) -> Self {
        self.redraw = true;
        self
    }

    pub fn status(mut self, text: impl Into<String>) -> Self {
        self.status = Some(text.into());
        self
    }

    pub fn highlight(mut self, handle: Handle, tone: Tone) -> Self {
        self.effects.push(Effect::Highlight(handle, tone));
        self
    }

    pub fn badge(mut self, handle: Handle, text: impl Into<String>) -> Self {
        self.effects.push(Effect::Badge(handle, text.into()));
        self
    }

    pub fn clear(mut self, tone: Tone) -> Self {
        self.effects.push(Effect::Clear(tone));
        self
    }
}

/// Mirror and renderer for one structure family.
pub trait Visualizer: Send + 'static {
    /// Record payload this family replays.
    type Action: Clone + fmt::Debug + Send + Sync + 'static;
    /// Backend whose snapshots this mirror reconciles against.
    type Backend: SnapshotSource + Send + 'static;

    const FAMILY: Family;

    /// Replace the mirror's structure with `snapshot`.
    fn resync(&mut self, snapshot: <Self::Backend as SnapshotSource>::Snapshot);

    /// Called once before the first record of `log` is replayed.
    fn begin(&mut self, _log: &EventLog<Self::Action>) {}

    /// Apply one record to the mirror and describe its visual effects.
    fn step(&mut self, record: &ActionRecord<Self::Action>) -> Step;

    /// Draw the mirror. Pure: equal mirrors give equal scenes.
    fn render(&self, viewport_width: f64) -> Scene;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_names_round_trip() {
        for family in Family::ALL {
            assert_eq!(family.as_str().parse::<Family>(), Ok(family));
        }
        assert!("forest".parse::<Family>().is_err());
    }

    #[test]
    fn step_builder_keeps_effect_order() {
        let step = Step::new()
            .clear(Tone::Focus)
            .highlight(Handle::Node(1), Tone::Focus)
            .status("s");
        assert_eq!(step.effects, vec![
            Effect::Clear(Tone::Focus),
            Effect::Highlight(Handle::Node(1), Tone::Focus),
        ]);
        assert!(!step.redraw);
        assert_eq!(step.status.as_deref(), Some("s"));
    }
}
