use crate::config::EmailConfig;
use crate::error::NotifyError;
use log::{debug, info};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

/// Trait for notification delivery implementations
pub trait Notifier: Send + Sync {
    /// Deliver a message with the given subject line
    fn notify<'a>(
        &'a self,
        subject: &'a str,
        body: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;
}

/// Notifier that delivers summaries through a Mailgun-style e-mail API
///
/// Performs a single HTTP POST per message with basic auth and the form
/// fields `from`, `to`, `subject` and `text`. There is no retry; a failed
/// delivery is reported to the caller and the message is dropped.
pub struct MailgunNotifier {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
    to: String,
}

impl MailgunNotifier {
    /// Create a notifier for the configured endpoint and addresses
    ///
    /// # Arguments
    ///
    /// * `config` - E-mail endpoint and sender/recipient addresses
    /// * `api_key` - API key for basic auth (username is always `api`)
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::HttpError` if the HTTP client cannot be built.
    pub fn new(config: &EmailConfig, api_key: String) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            from: config.from.clone(),
            to: config.to.clone(),
        })
    }
}

impl Notifier for MailgunNotifier {
    fn notify<'a>(
        &'a self,
        subject: &'a str,
        body: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            debug!("Posting notification to {}", self.endpoint);

            let response = self
                .client
                .post(&self.endpoint)
                .basic_auth("api", Some(&self.api_key))
                .form(&[
                    ("from", self.from.as_str()),
                    ("to", self.to.as_str()),
                    ("subject", subject),
                    ("text", body),
                ])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<no response body>".to_string());
                return Err(NotifyError::Rejected {
                    status: status.as_u16(),
                    body,
                });
            }

            info!("Notification accepted ({})", status);
            Ok(())
        })
    }
}

/// A message captured by [`MockNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub subject: String,
    pub body: String,
}

/// Mock notifier for testing and development
///
/// Records every delivered message instead of performing network I/O, and
/// can be configured to fail every delivery.
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<SentMessage>>,
    fail: bool,
}

impl MockNotifier {
    /// Create a mock notifier that accepts every message
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock notifier that rejects every message
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages delivered so far, in order
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of messages delivered so far
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Notifier for MockNotifier {
    fn notify<'a>(
        &'a self,
        subject: &'a str,
        body: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            if self.fail {
                return Err(NotifyError::DeliveryFailed("mock failure".to_string()));
            }

            self.sent.lock().unwrap().push(SentMessage {
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_notifier_records_messages() {
        let notifier = MockNotifier::new();

        notifier.notify("subject one", "body one").await.unwrap();
        notifier.notify("subject two", "body two").await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].subject, "subject one");
        assert_eq!(sent[1].body, "body two");
    }

    #[tokio::test]
    async fn test_failing_mock_notifier() {
        let notifier = MockNotifier::failing();

        let result = notifier.notify("subject", "body").await;

        assert!(matches!(result, Err(NotifyError::DeliveryFailed(_))));
        assert_eq!(notifier.sent_count(), 0);
    }

    #[test]
    fn test_mailgun_notifier_construction() {
        let config = EmailConfig::default();

        let notifier = MailgunNotifier::new(&config, "key-test".to_string()).unwrap();

        assert_eq!(notifier.endpoint, config.endpoint);
        assert_eq!(notifier.from, config.from);
        assert_eq!(notifier.to, config.to);
    }
}
