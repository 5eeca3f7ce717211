//! GatewayClient - Backend REST Adapter
//!
//! ## Responsibilities
//!
//! - Translate camera/detection operations into HTTP calls
//! - Decode JSON responses into domain models
//! - Derive stream resource URLs (pure, no network)
//!
//! Every failure is logged with the failing endpoint and rethrown. Recovery
//! policy belongs to the synchronizer, not here.

use crate::error::{Error, Result};
use crate::models::{Camera, CameraPatch, Detection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Fixed enumeration of legacy stream identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyStream {
    One,
    Two,
}

impl LegacyStream {
    /// Path segment suffix for the legacy stream
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyStream::One => "1",
            LegacyStream::Two => "2",
        }
    }
}

/// Typed request wrapper over the backend API
///
/// Owns no state beyond the base address and the HTTP client.
#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    /// Create a new gateway client with a custom request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================
    // Camera endpoints
    // ========================================

    /// List all cameras
    pub async fn list_cameras(&self) -> Result<Vec<Camera>> {
        self.get_json("/cameras/").await
    }

    /// List cameras flagged active by the backend
    pub async fn list_active_cameras(&self) -> Result<Vec<Camera>> {
        self.get_json("/cameras/active_cameras/").await
    }

    /// Get a single camera
    pub async fn get_camera(&self, id: i64) -> Result<Camera> {
        self.get_json(&format!("/cameras/{}/", id)).await
    }

    /// Create a camera
    pub async fn create_camera(&self, data: &CameraPatch) -> Result<Camera> {
        self.send_json(reqwest::Method::POST, "/cameras/", data)
            .await
    }

    /// Update a camera (PATCH semantics: unspecified fields unchanged)
    pub async fn update_camera(&self, id: i64, data: &CameraPatch) -> Result<Camera> {
        self.send_json(reqwest::Method::PATCH, &format!("/cameras/{}/", id), data)
            .await
    }

    /// Delete a camera
    pub async fn delete_camera(&self, id: i64) -> Result<()> {
        let endpoint = format!("/cameras/{}/", id);
        let url = format!("{}{}", self.base_url, endpoint);

        let resp = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| Self::log_transport(&endpoint, e))?;

        Self::check_status(&endpoint, &resp)?;
        Ok(())
    }

    // ========================================
    // Detection endpoints
    // ========================================

    /// List all detections
    pub async fn list_detections(&self) -> Result<Vec<Detection>> {
        self.get_json("/detections/").await
    }

    /// List the most recent detections, newest first, truncated server-side
    pub async fn list_recent_detections(&self, limit: usize) -> Result<Vec<Detection>> {
        self.get_json(&format!("/detections/recent/?limit={}", limit))
            .await
    }

    /// List detections for a single camera
    pub async fn list_detections_by_camera(&self, camera_id: i64) -> Result<Vec<Detection>> {
        self.get_json(&format!("/detections/by_camera/?camera_id={}", camera_id))
            .await
    }

    // ========================================
    // Stream resource derivation (pure)
    // ========================================

    /// Display URL for a camera's live image resource
    pub fn stream_url(&self, camera_id: i64) -> String {
        format!("{}/cameras/{}/stream/", self.media_root(), camera_id)
    }

    /// Display URL for a pre-configured legacy stream
    pub fn legacy_stream_url(&self, stream: LegacyStream) -> String {
        format!("{}/stream_{}/", self.media_root(), stream.as_str())
    }

    /// Base address with the trailing `/api` segment stripped
    fn media_root(&self) -> &str {
        self.base_url
            .strip_suffix("/api")
            .unwrap_or(&self.base_url)
    }

    // ========================================
    // Request plumbing
    // ========================================

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::log_transport(endpoint, e))?;

        Self::decode(endpoint, resp).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let resp = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| Self::log_transport(endpoint, e))?;

        Self::decode(endpoint, resp).await
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, resp: reqwest::Response) -> Result<T> {
        Self::check_status(endpoint, &resp)?;

        resp.json()
            .await
            .map_err(|e| Self::log_transport(endpoint, e))
    }

    fn check_status(endpoint: &str, resp: &reqwest::Response) -> Result<()> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        tracing::error!(
            endpoint = %endpoint,
            status = %status,
            "Gateway request rejected"
        );

        Err(Error::Gateway {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
        })
    }

    fn log_transport(endpoint: &str, e: reqwest::Error) -> Error {
        tracing::error!(
            endpoint = %endpoint,
            error = %e,
            "Gateway request failed"
        );
        Error::Transport(e)
    }
}
