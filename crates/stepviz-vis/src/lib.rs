//! stepviz Visualization
//!
//! Step-by-step replay of data-structure operations.
//!
//! # Architecture
//!
//! - **Backends** (`stepviz-algo`): perform an operation and return its
//!   event log
//! - **Mirrors**: per-family local projection, mutated record by record
//! - **Scheduler**: paces the replay, one log at a time, then resyncs the
//!   mirror from the backend's snapshot
//! - **Surface**: drawing capability; [`Canvas`] retains the current frame
//! - **Server**: REST submissions plus a WebSocket per family
//!
//! # Usage
//!
//! ```ignore
//! let config = VisConfig::from_env()?;
//! let server = VisServer::new(Workbench::new(&config));
//! server.serve(config.addr).await?;
//! ```

mod config;
mod error;
mod families;
mod scene;
mod scheduler;
mod server;
mod surface;
mod workbench;

pub use config::{StepDelays, VisConfig};
pub use error::{Error, Result};
pub use families::{
    Effect, Family, GraphMirror, HashMirror, HeapMirror, SnapshotOf, Step, TreeMirror, Visualizer,
};
pub use scene::{BoxShape, EdgeShape, Label, NodeShape, Primitive, Scene};
pub use scheduler::{
    Notice, PlayOutcome, PlaybackGuard, PlaybackReport, PlaybackState, Scheduler, Stage,
    StepNotice, COMPLETE_STATUS,
};
pub use server::VisServer;
pub use surface::{Canvas, Handle, RecordingSurface, Surface, SurfaceCall, Tone};
pub use workbench::{Playback, Submission, Workbench, WorkbenchStatus};
