use crate::error::CollectorError;
use crate::events::{Event, Timestamp};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

/// Trait for event source implementations
///
/// An event source answers two kinds of requests: all events the engine
/// reports for a half-open time window, and a blocking wait for the next
/// live event.
pub trait EventSource: Send + Sync {
    /// Collect the ordered events occurring in `[since, until)`
    ///
    /// May resolve to an empty vector when nothing happened in the window.
    fn events_between<'a>(
        &'a self,
        since: Timestamp,
        until: Timestamp,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Event>, CollectorError>> + Send + 'a>>;

    /// Block on the live feed until the next event arrives
    fn next_event<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Event, CollectorError>> + Send + 'a>>;
}

/// Mock event source for testing and development
///
/// Replays pre-configured event batches in order and records every window
/// it was queried with. Once the batches are exhausted, further queries
/// resolve to empty windows.
pub struct MockEventSource {
    batches: Mutex<VecDeque<Vec<Event>>>,
    queried_windows: Mutex<Vec<(Timestamp, Timestamp)>>,
    fail: bool,
}

impl MockEventSource {
    /// Create a mock source that replays the given batches in order
    pub fn with_batches(batches: Vec<Vec<Event>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            queried_windows: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Create a mock source with a single batch
    pub fn with_events(events: Vec<Event>) -> Self {
        Self::with_batches(vec![events])
    }

    /// Create a mock source whose calls always fail
    pub fn failing() -> Self {
        Self {
            batches: Mutex::new(VecDeque::new()),
            queried_windows: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// The windows passed to `events_between`, in call order
    pub fn queried_windows(&self) -> Vec<(Timestamp, Timestamp)> {
        self.queried_windows.lock().unwrap().clone()
    }
}

impl EventSource for MockEventSource {
    fn events_between<'a>(
        &'a self,
        since: Timestamp,
        until: Timestamp,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Event>, CollectorError>> + Send + 'a>> {
        Box::pin(async move {
            self.queried_windows.lock().unwrap().push((since, until));

            if self.fail {
                return Err(CollectorError::Unavailable("mock failure".to_string()));
            }

            Ok(self
                .batches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        })
    }

    fn next_event<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Event, CollectorError>> + Send + 'a>> {
        Box::pin(async move {
            if self.fail {
                return Err(CollectorError::Unavailable("mock failure".to_string()));
            }

            let mut batches = self.batches.lock().unwrap();
            match batches.front_mut().and_then(|batch| {
                if batch.is_empty() {
                    None
                } else {
                    Some(batch.remove(0))
                }
            }) {
                Some(event) => Ok(event),
                None => Err(CollectorError::StreamEnded),
            }
        })
    }
}
