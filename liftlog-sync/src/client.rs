//! HTTP client for the remote logging endpoint.
//!
//! The endpoint exposes one POST target accepting `{action, data}` and
//! answering `{status: "success"|"error", message?}`, plus a GET on the
//! same base URL returning the full training history for hydration.

use crate::error::{SyncError, SyncResult};
use liftlog_types::{ActionPayload, TrainingData};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Configuration for the endpoint client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the action endpoint.
    pub base_url: String,
    /// Timeout applied to every request. Finite so one hung send cannot
    /// stall a replay batch indefinitely.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Configuration for a given endpoint URL, with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// The endpoint's answer to an action POST.
#[derive(Debug, Deserialize)]
struct ActionResponse {
    status: String,
    message: Option<String>,
}

/// Thin client over the endpoint's action contract.
#[derive(Clone)]
pub struct ActionApi {
    config: ApiConfig,
    client: Client,
}

impl ActionApi {
    /// Creates a client for the configured endpoint.
    pub fn new(config: ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to create HTTP client");
        Self { config, client }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Sends one action to the endpoint.
    ///
    /// Distinguishes the three ways a send can go wrong: no response at
    /// all (`Transport`), an explicit decline (`Rejected`), and an
    /// answer the client cannot interpret (`Protocol`).
    pub async fn send_action(&self, payload: &ActionPayload) -> SyncResult<()> {
        debug!(action = payload.name(), "sending action to endpoint");
        let response = self
            .client
            .post(&self.config.base_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        if let Ok(body) = serde_json::from_str::<ActionResponse>(&text) {
            if body.status == "success" {
                return Ok(());
            }
            return Err(SyncError::Rejected(
                body.message
                    .unwrap_or_else(|| "endpoint declined the action".to_string()),
            ));
        }

        // No decodable verdict. A transport-level error status still
        // means the action may succeed later; queue it.
        if !status.is_success() {
            return Err(SyncError::Transport(format!("endpoint returned HTTP {status}")));
        }
        Err(SyncError::Protocol(format!(
            "unrecognized response body ({} bytes)",
            text.len()
        )))
    }

    /// Fetches the full training history from the endpoint's read side.
    pub async fn fetch_training_data(&self) -> SyncResult<TrainingData> {
        let response = self
            .client
            .get(&self.config.base_url)
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        response
            .json::<TrainingData>()
            .await
            .map_err(|e| SyncError::Protocol(e.to_string()))
    }

    /// Whether the endpoint currently answers at all. Any HTTP response,
    /// including an error status, counts as reachable.
    pub async fn probe(&self) -> bool {
        self.client.head(&self.config.base_url).send().await.is_ok()
    }
}
