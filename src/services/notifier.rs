//! Notification delivery with a bounded retry policy.
//!
//! Detection code never talks to a channel directly: it hands rendered text
//! to [`deliver`], which retries on a constant backoff and reports the result
//! as a [`DeliveryOutcome`] instead of an error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("channel rejected message with status {status}")]
    Rejected { status: u16 },
    #[error("channel error: {0}")]
    Channel(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, text: &str) -> Result<(), NotifierError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: usize,
    /// Fixed wait between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { attempts: usize },
    Failed { attempts: usize, reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }

    pub fn attempts(&self) -> usize {
        match self {
            DeliveryOutcome::Delivered { attempts } | DeliveryOutcome::Failed { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Send `text` through `notifier`, retrying per `policy`.
pub async fn deliver<N>(notifier: &N, text: &str, policy: &RetryPolicy) -> DeliveryOutcome
where
    N: Notifier + ?Sized,
{
    if policy.max_attempts == 0 {
        return DeliveryOutcome::Failed {
            attempts: 0,
            reason: "retry policy allows no attempts".to_string(),
        };
    }

    let attempts = AtomicUsize::new(0);
    let backoff = ConstantBuilder::default()
        .with_delay(policy.backoff)
        .with_max_times(policy.max_attempts - 1);

    let result = (|| {
        attempts.fetch_add(1, Ordering::Relaxed);
        notifier.send(text)
    })
    .retry(backoff)
    .notify(|err: &NotifierError, wait: Duration| {
        warn!(
            channel = notifier.name(),
            error = %err,
            wait_ms = wait.as_millis() as u64,
            "notification attempt failed, retrying"
        );
    })
    .await;

    let attempts = attempts.load(Ordering::Relaxed);
    match result {
        Ok(()) => {
            debug!(channel = notifier.name(), attempts, "notification delivered");
            DeliveryOutcome::Delivered { attempts }
        }
        Err(e) => DeliveryOutcome::Failed {
            attempts,
            reason: e.to_string(),
        },
    }
}

/// Posts alerts to a chat-bot webhook (`{"msgtype":"text","text":{"content":...}}`).
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, text: &str) -> Result<(), NotifierError> {
        let body = json!({
            "msgtype": "text",
            "text": { "content": text },
        });
        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifierError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Writes notifications to the log only. Used when no channel is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<(), NotifierError> {
        info!(channel = "log", message = %text, "notification");
        Ok(())
    }
}
