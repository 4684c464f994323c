/// Event source trait and test double
pub mod event_source;

/// Docker engine event source
pub mod docker_source;

pub use docker_source::DockerEventSource;
pub use event_source::{EventSource, MockEventSource};
