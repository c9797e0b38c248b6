//! Threads Graph API client
//!
//! Posting is two calls: `POST /{user}/threads` creates a text container,
//! `POST /{user}/threads_publish` makes it visible.

use super::{MediaType, PublishApi};
use crate::config::PublishConfig;
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: Option<String>,
}

/// Threads API client
#[derive(Clone)]
pub struct ThreadsClient {
    http: Client,
    base_url: String,
    access_token: String,
    user_id: Arc<RwLock<Option<String>>>,
}

impl ThreadsClient {
    pub fn new(base_url: &str, access_token: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            user_id: Arc::new(RwLock::new(None)),
        })
    }

    /// Build from config; fails when no token is configured
    pub fn from_config(config: &PublishConfig) -> Result<Self> {
        let client = Self::new(
            &config.base_url,
            config.require_token()?,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(match &config.user_id {
            Some(id) => client.with_user_id(id.clone()),
            None => client,
        })
    }

    /// Skip the `/me` lookup
    pub fn with_user_id(mut self, id: String) -> Self {
        self.user_id = Arc::new(RwLock::new(Some(id)));
        self
    }

    /// User id for the token, looked up once via `/me`
    pub async fn user_id(&self) -> Result<String> {
        if let Some(id) = self.user_id.read().await.as_ref() {
            return Ok(id.clone());
        }

        let url = format!("{}/me", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("fields", "id"), ("access_token", self.access_token.as_str())])
            .send()
            .await?;
        let body = Self::checked_body(resp).await?;
        let parsed: IdResponse = serde_json::from_str(&body)?;
        let id = parsed
            .id
            .ok_or_else(|| ReportError::Auth(format!("no user id in /me response: {}", body)))?;

        info!("Resolved Threads user id {}", id);
        *self.user_id.write().await = Some(id.clone());
        Ok(id)
    }

    /// Response body for a success status, `Publish` error otherwise
    async fn checked_body(resp: Response) -> Result<String> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ReportError::Publish {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn parse_id(body: &str) -> Option<String> {
        serde_json::from_str::<IdResponse>(body).ok().and_then(|r| r.id)
    }
}

#[async_trait]
impl PublishApi for ThreadsClient {
    async fn create_container(&self, text: &str) -> Result<String> {
        let user_id = self.user_id().await?;
        let url = format!("{}/{}/threads", self.base_url, user_id);

        let resp = self
            .http
            .post(&url)
            .form(&[
                ("media_type", MediaType::Text.as_str()),
                ("text", text),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await?;

        let body = Self::checked_body(resp).await?;
        let id = Self::parse_id(&body).ok_or(ReportError::MissingContainerId(body))?;
        debug!("Created container {}", id);
        Ok(id)
    }

    async fn publish_container(&self, container_id: &str) -> Result<String> {
        let user_id = self.user_id().await?;
        let url = format!("{}/{}/threads_publish", self.base_url, user_id);

        let resp = self
            .http
            .post(&url)
            .form(&[
                ("creation_id", container_id),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await?;

        let body = Self::checked_body(resp).await?;
        Self::parse_id(&body)
            .ok_or_else(|| ReportError::Api(format!("publish response without id: {}", body)))
    }
}
