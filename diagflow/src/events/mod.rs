//! Lifecycle events for observability.
//!
//! The dispatcher and the flow engine publish an [`Event`] at every state
//! change. Sinks are injected at construction; there is no process-global
//! sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Dotted event name, e.g. `tool.succeeded` or `flow.step.failed`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
    /// Event payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Event {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: Utc::now(),
            data,
        }
    }

    /// Returns a payload field, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = Event::new("tool.invoked", serde_json::json!({"tool": "echo"}));
        assert_eq!(event.event_type, "tool.invoked");
        assert_eq!(event.get("tool"), Some(&serde_json::json!("echo")));
        assert!(event.get("missing").is_none());
    }

    #[test]
    fn test_event_serializes_type_field() {
        let event = Event::new("flow.started", serde_json::json!({}));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "flow.started");
        assert!(json["timestamp"].is_string());
    }
}
