/// Event summarization and report formatting
pub mod event_summary;

pub use event_summary::{summarize, EventSummary};
