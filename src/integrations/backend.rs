//! Client for the repository backend API

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use super::fetch::retry_with_backoff;
use crate::config::BackendConfig;
use crate::domain::{Repository, RepositoryDetail, RepositoryList};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Fetch was cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }
}

/// Backend API client
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    retry_count: u32,
    retry_delay: Duration,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_config(&BackendConfig {
            base_url: base_url.into(),
            ..BackendConfig::default()
        })
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("fleetboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_count: config.retry_count,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry_count: u32, retry_delay: Duration) -> Self {
        self.retry_count = retry_count;
        self.retry_delay = retry_delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /list-repos`
    pub async fn list_repositories(&self) -> Result<Vec<Repository>, FetchError> {
        let url = format!("{}/list-repos", self.base_url);
        let response = self.client.get(&url).send().await?;
        let list: RepositoryList = self.handle_response(response).await?;
        tracing::debug!("Fetched {} repositories", list.repositories.len());
        Ok(list.repositories)
    }

    /// `GET /?repo=<name>`
    pub async fn get_repository(&self, repo: &str) -> Result<RepositoryDetail, FetchError> {
        let url = format!("{}/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("repo", repo)])
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<(), FetchError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(FetchError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }

    pub async fn list_repositories_with_retry(&self) -> Result<Vec<Repository>, FetchError> {
        retry_with_backoff(self.retry_count, self.retry_delay, || self.list_repositories()).await
    }

    pub async fn get_repository_with_retry(&self, repo: &str) -> Result<RepositoryDetail, FetchError> {
        retry_with_backoff(self.retry_count, self.retry_delay, || self.get_repository(repo)).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, FetchError> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
