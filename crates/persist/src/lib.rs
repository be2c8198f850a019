//! Persistence: input recordings and a file-backed recording store.
//!
//! # Invariants
//! - A recording carries everything needed to rebuild its run: controller
//!   config, scene and the frame stream.
//! - Replaying a recording reproduces its final state hash bit for bit.
//! - Stored files are content-addressed and verified on load; any mismatch
//!   fails closed.

mod recording;
mod store;

pub use recording::{Recording, RecordedFrame, RECORDING_SCHEMA_VERSION};
pub use store::{IntegrityManifest, ManifestEntry, RecordingStore, StoreError, StoreMeta};
