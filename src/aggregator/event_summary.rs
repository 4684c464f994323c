//! Event summarization
//!
//! This module reduces a collected window of events to a count and a
//! per-action tally, and renders the subject and body of the outgoing
//! notification. Everything here is pure and synchronous.

use crate::events::Event;
use std::collections::BTreeMap;

/// Aggregated view of one collected window of events
///
/// The tally is keyed by the event's action; its counts always sum to
/// `count`. Keys are ordered so rendered reports are deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    /// Number of events in the window
    pub count: usize,
    /// Event counts grouped by action
    pub tally: BTreeMap<String, usize>,
}

/// Summarize a window of events into a count and per-action tally
pub fn summarize(events: &[Event]) -> EventSummary {
    let mut tally = BTreeMap::new();
    for event in events {
        *tally.entry(event.action.clone()).or_insert(0) += 1;
    }

    EventSummary {
        count: events.len(),
        tally,
    }
}

impl EventSummary {
    /// Whether the summarized window contained no events
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Subject line for the notification
    ///
    /// Always contains the literal event count.
    pub fn subject(&self) -> String {
        format!("[docker-events] {} docker events", self.count)
    }

    /// Body of the notification
    ///
    /// Renders the count header, the per-action tally, and a verbose dump
    /// of every event in the window.
    pub fn body(&self, events: &[Event]) -> String {
        let mut body = String::new();
        body.push_str(&format!("{} events\n\n", self.count));

        for (action, count) in &self.tally {
            body.push_str(&format!("{}: {}\n", action, count));
        }
        body.push('\n');

        for event in events {
            let dump = serde_json::to_string_pretty(event)
                .unwrap_or_else(|_| format!("{:?}", event));
            body.push_str(&dump);
            body.push('\n');
        }

        body.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn test_event(action: &str) -> Event {
        Event::new(
            Utc::now(),
            action.to_string(),
            "container".to_string(),
            Some("abc123".to_string()),
            BTreeMap::new(),
            Utc::now(),
        )
    }

    #[test]
    fn test_summarize_tallies_by_action() {
        let events = vec![test_event("start"), test_event("stop"), test_event("start")];

        let summary = summarize(&events);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.tally.get("start"), Some(&2));
        assert_eq!(summary.tally.get("stop"), Some(&1));
        assert_eq!(summary.tally.len(), 2);
    }

    #[test]
    fn test_summarize_empty_window() {
        let summary = summarize(&[]);

        assert!(summary.is_empty());
        assert_eq!(summary.count, 0);
        assert!(summary.tally.is_empty());
    }

    #[test]
    fn test_subject_contains_count() {
        let events = vec![test_event("start"), test_event("stop"), test_event("start")];

        let summary = summarize(&events);

        assert_eq!(summary.subject(), "[docker-events] 3 docker events");
    }

    #[test]
    fn test_body_renders_tally_and_dump() {
        let events = vec![test_event("start"), test_event("stop"), test_event("start")];
        let summary = summarize(&events);

        let body = summary.body(&events);

        assert!(body.starts_with("3 events\n"));
        assert!(body.contains("start: 2"));
        assert!(body.contains("stop: 1"));
        // Verbose dump includes every event
        assert_eq!(body.matches("\"actor_id\"").count(), 3);
        assert!(body.contains("abc123"));
    }

    #[test]
    fn test_body_tally_is_sorted_by_action() {
        let events = vec![test_event("stop"), test_event("die"), test_event("start")];
        let summary = summarize(&events);

        let body = summary.body(&events);

        let die = body.find("die: 1").unwrap();
        let start = body.find("start: 1").unwrap();
        let stop = body.find("stop: 1").unwrap();
        assert!(die < start && start < stop);
    }
}

// Property-based tests
#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::Utc;
    use quickcheck_macros::quickcheck;
    use std::collections::BTreeMap;

    const ACTIONS: &[&str] = &["start", "stop", "die", "create", "destroy", "pause"];

    fn events_from_seeds(seeds: &[u8]) -> Vec<Event> {
        seeds
            .iter()
            .map(|seed| {
                Event::new(
                    Utc::now(),
                    ACTIONS[*seed as usize % ACTIONS.len()].to_string(),
                    "container".to_string(),
                    None,
                    BTreeMap::new(),
                    Utc::now(),
                )
            })
            .collect()
    }

    #[quickcheck]
    fn prop_tally_counts_sum_to_event_count(seeds: Vec<u8>) -> bool {
        let events = events_from_seeds(&seeds);

        let summary = summarize(&events);

        summary.count == events.len()
            && summary.tally.values().sum::<usize>() == events.len()
    }

    #[quickcheck]
    fn prop_subject_contains_literal_count(seeds: Vec<u8>) -> bool {
        let events = events_from_seeds(&seeds);

        let summary = summarize(&events);

        summary.subject().contains(&events.len().to_string())
    }

    #[quickcheck]
    fn prop_every_action_appears_in_body(seeds: Vec<u8>) -> bool {
        let events = events_from_seeds(&seeds);
        let summary = summarize(&events);

        let body = summary.body(&events);

        summary
            .tally
            .iter()
            .all(|(action, count)| body.contains(&format!("{}: {}", action, count)))
    }
}
