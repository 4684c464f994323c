/// Notifier trait and e-mail delivery implementations
pub mod mailer;

pub use mailer::{MailgunNotifier, MockNotifier, Notifier, SentMessage};
