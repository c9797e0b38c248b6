//! Two-phase publishing with one degraded retry
//!
//! An attempt runs CREATE -> SETTLE -> PUBLISH:
//! - CREATE submits the text and must return a container id
//! - SETTLE waits a fixed delay for the backend to make the container visible
//! - PUBLISH turns the container into a visible post
//!
//! If the full report fails at any phase, the same sequence runs exactly once
//! more with the promotional footer stripped. A second failure is fatal.

mod threads;


pub use threads::ThreadsClient;

use crate::error::{ReportError, Result};
use crate::report::Report;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Remote two-endpoint publish API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublishApi: Send + Sync {
    /// Submit text, returning the container id
    async fn create_container(&self, text: &str) -> Result<String>;

    /// Publish a created container, returning the post id
    async fn publish_container(&self, container_id: &str) -> Result<String>;
}

/// Fixed wait between CREATE and PUBLISH
#[derive(Debug, Clone, Copy)]
pub struct SettleWait {
    delay: Duration,
}

impl SettleWait {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No wait, for tests and dry runs
    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn wait(&self) {
        if !self.delay.is_zero() {
            info!("Waiting {:?} for container to settle", self.delay);
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Text,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishPayload {
    pub text: String,
    pub media_type: MediaType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPhase {
    Create,
    Publish,
}

impl fmt::Display for PublishPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishPhase::Create => write!(f, "CREATE"),
            PublishPhase::Publish => write!(f, "PUBLISH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Published { container_id: String, published_id: String },
    Failed { phase: PublishPhase, error: String },
}

/// One CREATE -> SETTLE -> PUBLISH pass
#[derive(Debug, Clone, PartialEq)]
pub struct PublishAttempt {
    pub payload: PublishPayload,
    pub outcome: AttemptOutcome,
}

impl PublishAttempt {
    pub fn published_id(&self) -> Option<&str> {
        match &self.outcome {
            AttemptOutcome::Published { published_id, .. } => Some(published_id),
            AttemptOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<String> {
        match &self.outcome {
            AttemptOutcome::Failed { phase, error } => Some(format!("{} failed: {}", phase, error)),
            AttemptOutcome::Published { .. } => None,
        }
    }
}

/// Result of a successful delivery
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReceipt {
    pub published_id: String,
    /// True when the promotional content had to be stripped
    pub degraded: bool,
    pub text: String,
}

pub struct PublishCoordinator {
    api: Arc<dyn PublishApi>,
    settle: SettleWait,
}

impl PublishCoordinator {
    pub fn new(api: Arc<dyn PublishApi>, settle: SettleWait) -> Self {
        Self { api, settle }
    }

    /// Publish the report, falling back once to its degraded form
    pub async fn deliver(&self, report: &Report) -> Result<PublishReceipt> {
        let full = self.attempt(report.render()).await;
        if let Some(id) = full.published_id() {
            info!("Published full report: {}", id);
            return Ok(PublishReceipt {
                published_id: id.to_string(),
                degraded: false,
                text: full.payload.text,
            });
        }
        warn!(
            "Full report not published ({}), retrying without promo",
            full.failure().unwrap_or_default()
        );

        let degraded = self.attempt(report.degraded().render()).await;
        if let Some(id) = degraded.published_id() {
            info!("Published degraded report: {}", id);
            return Ok(PublishReceipt {
                published_id: id.to_string(),
                degraded: true,
                text: degraded.payload.text,
            });
        }

        let reason = degraded.failure().unwrap_or_default();
        error!("Degraded report not published: {}", reason);
        Err(ReportError::PublishFailed(reason))
    }

    /// Run one full pass. Never retries internally.
    pub async fn attempt(&self, text: String) -> PublishAttempt {
        let payload = PublishPayload {
            text,
            media_type: MediaType::Text,
        };

        let container_id = match self.api.create_container(&payload.text).await {
            Ok(id) => id,
            Err(e) => {
                return PublishAttempt {
                    payload,
                    outcome: AttemptOutcome::Failed {
                        phase: PublishPhase::Create,
                        error: e.to_string(),
                    },
                }
            }
        };

        self.settle.wait().await;

        let outcome = match self.api.publish_container(&container_id).await {
            Ok(published_id) => AttemptOutcome::Published {
                container_id,
                published_id,
            },
            Err(e) => AttemptOutcome::Failed {
                phase: PublishPhase::Publish,
                error: e.to_string(),
            },
        };

        PublishAttempt { payload, outcome }
    }
}
