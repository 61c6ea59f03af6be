//! Image source abstraction
//!
//! The pipeline only needs "some bytes that look like an image". The default
//! source is an HTTP endpoint serving a random picture per request.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use taskgen_core::{TaskgenError, TaskgenResult};

use crate::build_http_client;

#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch one image. The content is not inspected.
    async fn fetch(&self) -> TaskgenResult<Bytes>;

    /// Human-readable origin, used in logs
    fn describe(&self) -> String;
}

/// Downloads a fresh image from a URL on every call.
///
/// Redirects are followed: picsum answers `/<w>/<h>` with a 302 to a
/// concrete picture.
#[derive(Clone, Debug)]
pub struct HttpImageSource {
    client: Client,
    url: String,
}

impl HttpImageSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> TaskgenResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            url: url.into(),
        })
    }

    /// Reuse an existing client (and its connection pool).
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
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
impl ImageSource for HttpImageSource {
    async fn fetch(&self) -> TaskgenResult<Bytes> {
        let start = Instant::now();

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            tracing::warn!(error = %e, url = %self.url, "Failed to download image");
            TaskgenError::transport(format!("Failed to download image from {}", self.url), e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskgenError::Download(format!(
                "{} returned status {}",
                self.url, status
            )));
        }

        let final_url = response.url().to_string();
        let data = response
            .bytes()
            .await
            .map_err(|e| TaskgenError::transport("Failed to read image body", e))?;

        tracing::info!(
            url = %self.url,
            final_url = %final_url,
            size_bytes = data.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Downloaded image"
        );

        Ok(data)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
