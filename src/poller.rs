//! The polling loop
//!
//! Ties collection, aggregation and notification together: each iteration
//! collects events (a time-window query or a blocking wait for one live
//! event), summarizes them, sends the summary if any events exist, and
//! sleeps for the configured interval. The sleep doubles as the wait for
//! the shutdown signal.

use crate::aggregator::summarize;
use crate::collectors::EventSource;
use crate::config::{PollConfig, PollMode};
use crate::error::CollectorError;
use crate::events::{Event, Timestamp};
use crate::notifiers::Notifier;
use chrono::Utc;
use log::{debug, error, info};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Clock abstraction so tests can control window boundaries
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Clock backed by the system time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// The polling loop driving collection and notification
///
/// Runs on a single logical thread of control: the async event source and
/// notifier calls are driven to completion one at a time on a
/// current-thread runtime. Collection failures terminate the loop;
/// notification failures are logged and the loop keeps going.
pub struct EventPoller {
    interval: Duration,
    mode: PollMode,
    source: Arc<dyn EventSource>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    runtime: tokio::runtime::Runtime,
}

impl EventPoller {
    /// Create a poller from the poll configuration and injected components
    ///
    /// # Errors
    ///
    /// Returns an IO error if the async runtime cannot be built.
    pub fn new(
        config: &PollConfig,
        source: Arc<dyn EventSource>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            interval: config.interval(),
            mode: config.mode,
            source,
            notifier,
            clock,
            runtime,
        })
    }

    /// Run the loop until the shutdown channel fires
    ///
    /// In window mode each iteration marks the window start, sleeps the
    /// configured interval, then collects and reports what happened while
    /// sleeping. In live mode each iteration blocks for one event, reports
    /// it, then sleeps to space out notifications. The interval never
    /// depends on how many events were found.
    ///
    /// # Errors
    ///
    /// Returns `CollectorError` if event collection fails; there is no
    /// retry.
    pub fn run(&self, shutdown: Receiver<()>) -> Result<(), CollectorError> {
        info!(
            "Poll loop started (mode: {:?}, interval: {:?})",
            self.mode, self.interval
        );

        loop {
            match self.mode {
                PollMode::Window => {
                    let since = self.clock.now();
                    if self.sleep_or_shutdown(&shutdown) {
                        break;
                    }
                    let until = self.clock.now();
                    self.poll_window(since, until)?;
                }
                PollMode::Live => {
                    self.poll_live()?;
                    if self.sleep_or_shutdown(&shutdown) {
                        break;
                    }
                }
            }
        }

        info!("Poll loop stopped");
        Ok(())
    }

    /// Collect and report one `[since, until)` window
    ///
    /// Returns the number of events found. An empty window sends nothing.
    pub fn poll_window(
        &self,
        since: Timestamp,
        until: Timestamp,
    ) -> Result<usize, CollectorError> {
        debug!("Polling events between {} and {}", since, until);
        let events = self
            .runtime
            .block_on(self.source.events_between(since, until))?;
        Ok(self.dispatch(&events))
    }

    /// Block for the next live event and report it
    pub fn poll_live(&self) -> Result<usize, CollectorError> {
        debug!("Waiting for next live event");
        let event = self.runtime.block_on(self.source.next_event())?;
        Ok(self.dispatch(std::slice::from_ref(&event)))
    }

    /// Summarize a collected window and send the notification
    ///
    /// Delivery failures are logged, never propagated; the message is
    /// dropped and the loop moves on.
    fn dispatch(&self, events: &[Event]) -> usize {
        if events.is_empty() {
            debug!("No events in window, skipping notification");
            return 0;
        }

        let summary = summarize(events);
        let subject = summary.subject();
        let body = summary.body(events);

        info!("Sending e-mail: {}", subject);
        if let Err(e) = self.runtime.block_on(self.notifier.notify(&subject, &body)) {
            error!("Failed to deliver notification: {}", e);
        }

        events.len()
    }

    /// Sleep for the configured interval, waking early on shutdown
    ///
    /// Returns `true` when the loop should stop.
    fn sleep_or_shutdown(&self, shutdown: &Receiver<()>) -> bool {
        debug!("Sleeping for {:?}", self.interval);
        match shutdown.recv_timeout(self.interval) {
            Ok(()) => {
                info!("Shutdown signal received");
                true
            }
            Err(RecvTimeoutError::Disconnected) => {
                info!("Shutdown channel disconnected, stopping");
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}
