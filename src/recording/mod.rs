//! Recording and playback log support.
//!
//! This module provides:
//! - The recorded-event log model and the persisted recording artifact
//! - Payload serialization into plain JSON mappings
//! - Loading playback logs and saving recording artifacts (plain or gzip JSON)

pub mod serialize;
pub mod store;
pub mod types;


pub use serialize::serialize_payload;
pub use store::{FileStore, NullStore, PlaybackStore, decode_log, read_log, write_artifact};
pub use types::{ARTIFACT_VERSION, LogSummary, RecordedEvent, RecordingArtifact};
