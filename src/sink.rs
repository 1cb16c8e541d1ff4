//! Application event sinks that receive bridged input events.

use std::cell::RefCell;
use std::error::Error;
use std::io::Write;

use log::{error, info, warn};
use serde_json::{Value, json};

/// Publish-only channel plus an advisory error-report channel.
pub trait EventSink {
    fn publish(&self, event: &str, payload: Value);

    fn report_error(
        &self,
        context: Option<&Value>,
        error: &dyn Error,
        operation: &str,
        metadata: Value,
    );
}

/// Sink that forwards every publication to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: &str, payload: Value) {
        info!("{event}: {payload}");
    }

    fn report_error(
        &self,
        context: Option<&Value>,
        error: &dyn Error,
        operation: &str,
        metadata: Value,
    ) {
        error!(
            "{operation} failed: {error} (context: {}, metadata: {metadata})",
            context.cloned().unwrap_or(Value::Null)
        );
    }
}

/// Sink that writes one JSON object per publication, e.g. to stdout.
pub struct JsonLinesSink<W: Write> {
    writer: RefCell<W>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: RefCell::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn publish(&self, event: &str, payload: Value) {
        let line = json!({ "event": event, "payload": payload });
        let mut writer = self.writer.borrow_mut();
        if let Err(err) = writeln!(writer, "{line}") {
            warn!("Failed to write event {event}: {err}");
        }
    }

    fn report_error(
        &self,
        context: Option<&Value>,
        error: &dyn Error,
        operation: &str,
        metadata: Value,
    ) {
        LogSink.report_error(context, error, operation, metadata);
    }
}

/// One entry on the error-report channel of a [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedError {
    pub context: Option<Value>,
    pub message: String,
    pub operation: String,
    pub metadata: Value,
}

/// Sink that keeps every publication in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<(String, Value)>>,
    errors: RefCell<Vec<ReportedError>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.borrow().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Names starting with `prefix`, in publication order.
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.names()
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    pub fn last_payload(&self, event: &str) -> Option<Value> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find(|(name, _)| name == event)
            .map(|(_, payload)| payload.clone())
    }

    pub fn errors(&self) -> Vec<ReportedError> {
        self.errors.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
        self.errors.borrow_mut().clear();
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: &str, payload: Value) {
        self.events.borrow_mut().push((event.to_string(), payload));
    }

    fn report_error(
        &self,
        context: Option<&Value>,
        error: &dyn Error,
        operation: &str,
        metadata: Value,
    ) {
        self.errors.borrow_mut().push(ReportedError {
            context: context.cloned(),
            message: error.to_string(),
            operation: operation.to_string(),
            metadata,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_sink_writes_one_object_per_event() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.publish("input:wheel", json!({ "deltaY": { "value": 3.0 } }));
        sink.publish("input:undo", json!({}));

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "input:wheel");
        assert_eq!(lines[0]["payload"]["deltaY"]["value"], 3.0);
        assert_eq!(lines[1]["event"], "input:undo");
    }

    #[test]
    fn memory_sink_filters_by_prefix() {
        let sink = MemorySink::new();
        sink.publish("input-initialized", json!({}));
        sink.publish("input:pointer-move", json!({}));
        sink.publish("input:pointer-move", json!({ "n": 2 }));

        assert_eq!(sink.names_with_prefix("input:").len(), 2);
        assert_eq!(sink.count("input:pointer-move"), 2);
        assert_eq!(sink.last_payload("input:pointer-move"), Some(json!({ "n": 2 })));
    }
}
