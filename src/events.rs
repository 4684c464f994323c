//! Core event types for the Docker event monitor
//!
//! This module defines the fundamental data structures used throughout the application
//! for representing Docker engine events and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// A single event reported by the Docker engine
///
/// Represents one decoded entry from the engine's event stream. Events are
/// immutable once collected and live only for the duration of one polling
/// iteration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// When the engine reports the event occurred
    pub timestamp: Timestamp,
    /// Lifecycle action (start, stop, die, ...)
    pub action: String,
    /// Object kind the event refers to (container, image, network, ...)
    pub kind: String,
    /// Identifier of the object the event refers to
    pub actor_id: Option<String>,
    /// Attributes reported for the actor (name, image, labels, ...)
    pub attributes: BTreeMap<String, String>,
    /// Human-readable offset from the moment the event was collected
    pub relative_age: String,
}

impl Event {
    /// Create an event, deriving its relative age from the collection time
    ///
    /// # Arguments
    ///
    /// * `timestamp` - When the event occurred according to the engine
    /// * `action` - Lifecycle action label
    /// * `kind` - Object kind the event refers to
    /// * `actor_id` - Identifier of the affected object, if reported
    /// * `attributes` - Actor attributes as reported by the engine
    /// * `collected_at` - When this event was pulled from the source
    pub fn new(
        timestamp: Timestamp,
        action: String,
        kind: String,
        actor_id: Option<String>,
        attributes: BTreeMap<String, String>,
        collected_at: Timestamp,
    ) -> Self {
        let relative_age = relative_age(timestamp, collected_at);
        Self {
            timestamp,
            action,
            kind,
            actor_id,
            attributes,
            relative_age,
        }
    }
}

/// Render the offset between an event and its collection time
///
/// Produces strings like "just now", "42s ago", "3m 12s ago" or "1h 2m ago".
/// Timestamps at or after `collected_at` render as "just now".
pub fn relative_age(timestamp: Timestamp, collected_at: Timestamp) -> String {
    let seconds = collected_at.signed_duration_since(timestamp).num_seconds();
    if seconds < 2 {
        "just now".to_string()
    } else if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s ago", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m ago", seconds / 3600, (seconds % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn attributes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_event_serialization() {
        let now = Utc::now();
        let event = Event::new(
            now - Duration::seconds(5),
            "start".to_string(),
            "container".to_string(),
            Some("abc123".to_string()),
            attributes(&[("name", "web"), ("image", "nginx:latest")]),
            now,
        );

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_event_derives_relative_age_at_collection() {
        let now = Utc::now();
        let event = Event::new(
            now - Duration::seconds(42),
            "die".to_string(),
            "container".to_string(),
            None,
            BTreeMap::new(),
            now,
        );

        assert_eq!(event.relative_age, "42s ago");
    }

    #[test]
    fn test_relative_age_formats() {
        let now = Utc::now();

        assert_eq!(relative_age(now, now), "just now");
        assert_eq!(relative_age(now + Duration::seconds(10), now), "just now");
        assert_eq!(relative_age(now - Duration::seconds(1), now), "just now");
        assert_eq!(relative_age(now - Duration::seconds(59), now), "59s ago");
        assert_eq!(relative_age(now - Duration::seconds(61), now), "1m 1s ago");
        assert_eq!(
            relative_age(now - Duration::seconds(192), now),
            "3m 12s ago"
        );
        assert_eq!(
            relative_age(now - Duration::seconds(3720), now),
            "1h 2m ago"
        );
    }

    #[test]
    fn test_attributes_render_in_stable_order() {
        let event = Event::new(
            Utc::now(),
            "create".to_string(),
            "container".to_string(),
            None,
            attributes(&[("name", "web"), ("image", "nginx")]),
            Utc::now(),
        );

        let keys: Vec<&String> = event.attributes.keys().collect();
        assert_eq!(keys, vec!["image", "name"]);
    }
}
