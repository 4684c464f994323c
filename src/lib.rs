/// Error types for the event monitor
pub mod error;

/// Core event types
pub mod events;

/// Docker event collection
pub mod collectors;

/// Event aggregation and summary formatting
pub mod aggregator;

/// Outbound e-mail notification
pub mod notifiers;

/// Configuration management
pub mod config;

/// The polling loop
pub mod poller;

// Re-export commonly used types
pub use error::{CollectorError, ConfigError, NotifyError};
