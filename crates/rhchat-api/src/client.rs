// Backend API client.
//
// Every operation is a JSON POST to `base_url + endpoint`. Non-success
// statuses become `ApiError::Request` carrying the raw body; there is no
// retry or backoff, the user re-triggers failed actions from the UI.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use rhchat_core::config::{Config, Endpoints};
use rhchat_core::error::ApiError;
use rhchat_core::protocol::{
    ChatRequest, ChatResponse, ResumesRequest, ResumesResponse, SubquestionsRequest,
    SubquestionsResponse,
};

// ---------------------------------------------------------------------------
// ChatBackend
// ---------------------------------------------------------------------------

/// The three backend operations the session depends on.
///
/// `ApiClient` is the production implementation; tests substitute an
/// in-memory backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `POST /generate/`: answer a chat question. Returns the bot message.
    async fn generate_response(&self, request: &ChatRequest) -> Result<String, ApiError>;

    /// `POST /generate_subquestions/`: derive sub-questions from a job
    /// description.
    async fn generate_subquestions(&self, description: &str) -> Result<Vec<String>, ApiError>;

    /// `POST /retrieve_resumes/`: fetch resumes matching the sub-questions.
    async fn retrieve_resumes(&self, subquestions: &[String]) -> Result<Vec<String>, ApiError>;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// reqwest-backed client for the backend endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        endpoints: Endpoints,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ApiClient {
            http,
            base_url: base_url.into(),
            endpoints,
        })
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Self::new(
            config.api.base_url.clone(),
            config.api.endpoints.clone(),
            Duration::from_secs(config.api.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// POST `body` as JSON to `path` and decode the JSON response.
    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "API request failed");
                ApiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| {
                warn!(%url, status = status.as_u16(), error = %e, "failed to read error body");
                ApiError::Network(e.to_string())
            })?;
            warn!(%url, status = status.as_u16(), "API returned error status");
            return Err(ApiError::Request {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(%url, error = %e, "failed to decode API response");
            ApiError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn generate_response(&self, request: &ChatRequest) -> Result<String, ApiError> {
        let response: ChatResponse = self.post(&self.endpoints.generate, request).await?;
        Ok(response.message)
    }

    async fn generate_subquestions(&self, description: &str) -> Result<Vec<String>, ApiError> {
        let body = SubquestionsRequest {
            description: description.to_string(),
        };
        let response: SubquestionsResponse =
            self.post(&self.endpoints.subquestions, &body).await?;
        Ok(response.subquestions)
    }

    async fn retrieve_resumes(&self, subquestions: &[String]) -> Result<Vec<String>, ApiError> {
        let body = ResumesRequest {
            subquestions: subquestions.to_vec(),
        };
        let response: ResumesResponse = self.post(&self.endpoints.retrieve_resumes, &body).await?;
        Ok(response.resumes)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
