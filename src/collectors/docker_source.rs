use crate::collectors::event_source::EventSource;
use crate::error::CollectorError;
use crate::events::{Event, Timestamp};
use bollard::models::EventMessage;
use bollard::system::EventsOptions;
use bollard::Docker;
use chrono::{DateTime, Utc};
use futures_util::stream::StreamExt;
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;

/// Event source backed by the Docker engine
///
/// Queries the engine's `/events` endpoint through the Docker API client.
/// Windowed queries ask the engine for a closed `[since, until)` slice; the
/// engine replays the matching events and ends the stream. Live queries
/// leave the window open and wait for the next event to arrive.
pub struct DockerEventSource {
    docker: Docker,
}

impl DockerEventSource {
    /// Connect to the Docker daemon using the client's local defaults
    ///
    /// Honors the environment the Docker client reads implicitly
    /// (`DOCKER_HOST` and friends); falls back to the local socket.
    ///
    /// # Errors
    ///
    /// Returns `CollectorError::DockerApi` if the daemon is unreachable.
    pub fn connect() -> Result<Self, CollectorError> {
        let docker = Docker::connect_with_local_defaults()?;
        info!("Connected to Docker daemon");
        Ok(Self { docker })
    }
}

impl EventSource for DockerEventSource {
    fn events_between<'a>(
        &'a self,
        since: Timestamp,
        until: Timestamp,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Event>, CollectorError>> + Send + 'a>> {
        Box::pin(async move {
            let options = EventsOptions::<String> {
                since: Some(since),
                until: Some(until),
                filters: HashMap::new(),
            };

            // With `until` set the engine replays the window and closes
            // the stream, so draining it terminates.
            let mut stream = Box::pin(self.docker.events(Some(options)));
            let collected_at = Utc::now();
            let mut events = Vec::new();
            while let Some(message) = stream.next().await {
                events.push(event_from_message(message?, collected_at));
            }

            debug!(
                "Collected {} events between {} and {}",
                events.len(),
                since,
                until
            );
            Ok(events)
        })
    }

    fn next_event<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Event, CollectorError>> + Send + 'a>> {
        Box::pin(async move {
            let mut stream = Box::pin(self.docker.events::<String>(None));
            match stream.next().await {
                Some(message) => Ok(event_from_message(message?, Utc::now())),
                None => Err(CollectorError::StreamEnded),
            }
        })
    }
}

/// Convert a decoded engine message into an [`Event`]
///
/// Missing fields degrade to "unknown" labels rather than failing the
/// whole window; the engine omits them for some event kinds.
fn event_from_message(message: EventMessage, collected_at: Timestamp) -> Event {
    let timestamp = message
        .time
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(collected_at);
    let action = message.action.unwrap_or_else(|| "unknown".to_string());
    let kind = message
        .typ
        .map(|typ| typ.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let (actor_id, attributes) = match message.actor {
        Some(actor) => (
            actor.id,
            actor
                .attributes
                .map(|attrs| attrs.into_iter().collect::<BTreeMap<String, String>>())
                .unwrap_or_default(),
        ),
        None => (None, BTreeMap::new()),
    };

    Event::new(timestamp, action, kind, actor_id, attributes, collected_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{EventActor, EventMessageTypeEnum};
    use chrono::Duration;

    #[test]
    fn test_event_from_message_maps_fields() {
        let collected_at = Utc::now();
        let occurred = collected_at - Duration::seconds(30);
        let mut attributes = HashMap::new();
        attributes.insert("name".to_string(), "web".to_string());
        attributes.insert("image".to_string(), "nginx:latest".to_string());

        let message = EventMessage {
            typ: Some(EventMessageTypeEnum::CONTAINER),
            action: Some("start".to_string()),
            actor: Some(EventActor {
                id: Some("abc123".to_string()),
                attributes: Some(attributes),
            }),
            scope: None,
            time: Some(occurred.timestamp()),
            time_nano: None,
        };

        let event = event_from_message(message, collected_at);

        assert_eq!(event.action, "start");
        assert_eq!(event.kind, "container");
        assert_eq!(event.actor_id.as_deref(), Some("abc123"));
        assert_eq!(event.attributes.get("name").map(String::as_str), Some("web"));
        assert_eq!(event.timestamp.timestamp(), occurred.timestamp());
        assert_eq!(event.relative_age, "30s ago");
    }

    #[test]
    fn test_event_from_message_defaults_missing_fields() {
        let collected_at = Utc::now();
        let message = EventMessage {
            typ: None,
            action: None,
            actor: None,
            scope: None,
            time: None,
            time_nano: None,
        };

        let event = event_from_message(message, collected_at);

        assert_eq!(event.action, "unknown");
        assert_eq!(event.kind, "unknown");
        assert_eq!(event.actor_id, None);
        assert!(event.attributes.is_empty());
        assert_eq!(event.timestamp, collected_at);
        assert_eq!(event.relative_age, "just now");
    }
}
