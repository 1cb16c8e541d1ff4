//! Data types for recorded input logs.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version tag written into every recording artifact.
pub const ARTIFACT_VERSION: &str = "1.0";

/// One bridged event captured while recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Bridged event name, e.g. `input:pointer-move`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Serialized payload (see [`super::serialize_payload`]).
    pub data: Value,
}

impl RecordedEvent {
    pub fn new(timestamp: i64, event_type: impl Into<String>, data: Value) -> Self {
        Self {
            timestamp,
            event_type: event_type.into(),
            data,
        }
    }
}

/// Persisted form of a finished recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingArtifact {
    pub version: String,
    /// ISO-8601 creation time.
    pub timestamp: String,
    pub events: Vec<RecordedEvent>,
}

impl RecordingArtifact {
    pub fn new(events: Vec<RecordedEvent>) -> Self {
        Self {
            version: ARTIFACT_VERSION.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            events,
        }
    }
}

/// Accepts both a full artifact and the bare `{ "events": [...] }` log shape.
#[derive(Debug, Deserialize)]
pub(crate) struct PlaybackLog {
    #[serde(default)]
    pub version: Option<String>,
    pub events: Vec<RecordedEvent>,
}

/// Aggregate view of a log, used for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSummary {
    pub count: usize,
    /// Milliseconds between the first and last event.
    pub duration_ms: i64,
    pub per_type: BTreeMap<String, usize>,
}

impl LogSummary {
    pub fn from_events(events: &[RecordedEvent]) -> Self {
        let mut per_type = BTreeMap::new();
        for event in events {
            *per_type.entry(event.event_type.clone()).or_insert(0) += 1;
        }
        let duration_ms = match (events.first(), events.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0,
        };
        Self {
            count: events.len(),
            duration_ms,
            per_type,
        }
    }
}
