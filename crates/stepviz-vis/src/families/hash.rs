//! Hash-table mirror: one chain of keys per bucket.

use stepviz_algo::{ActionRecord, HashAction, HashTable, Key};
use stepviz_layout::HashLayout;

use super::{Family, SnapshotOf, Step, Visualizer};
use crate::scene::{BoxShape, Label, Scene};
use crate::surface::{Handle, Tone};

/// Local projection of a [`HashTable`].
#[derive(Debug, Clone)]
pub struct HashMirror {
    layout: HashLayout,
    chains: Vec<Vec<Key>>,
}

impl HashMirror {
    /// Create a mirror with `buckets` empty chains.
    pub fn new(buckets: usize) -> Self {
        Self {
            layout: HashLayout::default(),
            chains: vec![Vec::new(); buckets],
        }
    }

    /// Chain of bucket `index`.
    pub fn chain(&self, index: usize) -> Option<&[Key]> {
        self.chains.get(index).map(Vec::as_slice)
    }

    fn append(&mut self, bucket: usize, key: Key) -> bool {
        match self.chains.get_mut(bucket) {
            Some(chain) if !chain.contains(&key) => {
                chain.push(key);
                true
            }
            _ => false,
        }
    }
}

impl Visualizer for HashMirror {
    type Action = HashAction;
    type Backend = HashTable;

    const FAMILY: Family = Family::Hash;

    fn resync(&mut self, snapshot: SnapshotOf<Self>) {
        self.chains = snapshot.buckets.into_iter().map(|row| row.keys).collect();
    }

    fn step(&mut self, record: &ActionRecord<HashAction>) -> Step {
        let bucket = record.action.bucket();
        let step = Step::new()
            .clear(Tone::Compare)
            .clear(Tone::Focus)
            .status(record.info.clone());

        match record.action {
            HashAction::ComputeHash { .. } => step.highlight(Handle::Bucket(bucket), Tone::Compare),
            HashAction::Traverse { key, .. } => step
                .highlight(Handle::Bucket(bucket), Tone::Compare)
                .highlight(Handle::Entry(key), Tone::Focus),
            HashAction::Insert { key, .. } => {
                let step = if self.append(bucket, key) { step.redraw() } else { step };
                step.highlight(Handle::Entry(key), Tone::Inserted)
            }
            HashAction::Duplicate { key, .. } => step.highlight(Handle::Entry(key), Tone::Error),
            HashAction::Found { key, .. } => step.highlight(Handle::Entry(key), Tone::Found),
            HashAction::NotFound { .. } => step.highlight(Handle::Bucket(bucket), Tone::Error),
        }
    }

    fn render(&self, _viewport_width: f64) -> Scene {
        let lengths: Vec<usize> = self.chains.iter().map(Vec::len).collect();
        let mut scene = Scene::new();

        for (placed, chain) in self.layout.place(&lengths).into_iter().zip(&self.chains) {
            let mut bucket = BoxShape::new(Handle::Bucket(placed.index), placed.rect, "[ ]");
            bucket.caption = Some(Label {
                at: placed.caption,
                text: placed.index.to_string(),
            });
            scene.push_box(bucket);

            for (entry, &key) in placed.chain.iter().zip(chain) {
                let mut shape = BoxShape::new(Handle::Entry(key), entry.rest, key.to_string());
                shape.enter_from = Some(entry.enter_from);
                shape.connector = Some(entry.connector);
                scene.push_box(shape);
            }
        }
        scene
    }
}
