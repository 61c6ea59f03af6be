//! HTTP client for the Task API.
//!
//! Requests signed upload URLs, pushes bytes to them and checks that the Task
//! API is reachable. The [`uploader`] module strings these calls together with
//! an [`ImageSource`] into the download-and-upload pipeline.

pub mod image_source;
pub mod uploader;

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use taskgen_core::config::SIGNED_URL_PATH;
use taskgen_core::{SignedUrlRequest, SignedUrlResponse, TaskgenError, TaskgenResult, UploaderConfig};
use validator::Validate;

pub use image_source::{HttpImageSource, ImageSource};
pub use uploader::ImageUploader;

const PING_PATH: &str = "/ping";

/// HTTP client for the Task API
#[derive(Clone, Debug)]
pub struct TaskApiClient {
    client: Client,
    base_url: String,
}

impl TaskApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TaskgenResult<Self> {
        let client = build_http_client(timeout)?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &UploaderConfig) -> TaskgenResult<Self> {
        Self::new(config.taskapi_url.clone(), config.http_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the Task API for a signed URL the file can be PUT to.
    ///
    /// The Task API answers `201 Created` with the JSON document as a plain
    /// text body, so the body is read as text and parsed regardless of its
    /// Content-Type header.
    pub async fn request_signed_url(
        &self,
        request: &SignedUrlRequest,
    ) -> TaskgenResult<SignedUrlResponse> {
        request.validate()?;

        let url = self.build_url(SIGNED_URL_PATH);
        let start = Instant::now();

        tracing::info!(
            url = %url,
            filename = %request.filename,
            content_type = ?request.content_type,
            "Requesting signed upload URL"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| TaskgenError::transport(format!("Failed to call {}", url), e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = error_body(response).await;
            tracing::warn!(url = %url, status = %status, body = %error_text, "Task API rejected signed URL request");
            return Err(TaskgenError::SignedUrl(format!(
                "Task API returned status {}: {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TaskgenError::transport("Failed to read Task API response", e))?;

        let signed: SignedUrlResponse = serde_json::from_str(&body).map_err(|e| {
            TaskgenError::SignedUrl(format!("Failed to parse Task API response: {}: {}", e, body))
        })?;

        tracing::info!(
            gcs_path = %signed.gcs_path,
            signed_url = %signed.signed_url,
            expected_content_type = %signed.expected_content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Received signed upload URL"
        );

        Ok(signed)
    }

    /// PUT raw bytes to a signed URL.
    ///
    /// The URL carries its own authorization; only the Content-Type the URL was
    /// signed for is sent along.
    pub async fn upload_to_signed_url(
        &self,
        signed: &SignedUrlResponse,
        data: Vec<u8>,
    ) -> TaskgenResult<StatusCode> {
        let size = data.len() as u64;
        let start = Instant::now();

        tracing::info!(
            gcs_path = %signed.gcs_path,
            signed_url = %signed.signed_url,
            size_bytes = size,
            "Uploading to signed URL"
        );

        let response = self
            .client
            .put(&signed.signed_url)
            .header(CONTENT_TYPE, signed.expected_content_type.as_str())
            .body(data)
            .send()
            .await
            .map_err(|e| TaskgenError::transport("Failed to reach signed upload URL", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = error_body(response).await;
            tracing::warn!(
                gcs_path = %signed.gcs_path,
                status = %status,
                body = %error_text,
                "Signed URL upload rejected"
            );
            return Err(TaskgenError::Upload(format!(
                "Storage returned status {}: {}",
                status, error_text
            )));
        }

        tracing::info!(
            gcs_path = %signed.gcs_path,
            status = %status,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload to signed URL successful"
        );

        Ok(status)
    }

    /// GET `/ping`; the Task API answers `pong`.
    pub async fn ping(&self) -> TaskgenResult<String> {
        let url = self.build_url(PING_PATH);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TaskgenError::transport(format!("Failed to call {}", url), e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = error_body(response).await;
            return Err(TaskgenError::TaskApi(format!(
                "Ping returned status {}: {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TaskgenError::transport("Failed to read ping response", e))?;

        Ok(body.trim().to_string())
    }

    /// Underlying HTTP client, shared with the image source.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> TaskgenResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TaskgenError::transport("Failed to create HTTP client", e))
}

async fn error_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}
