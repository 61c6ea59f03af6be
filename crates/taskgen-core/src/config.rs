//! Configuration module
//!
//! Uploader settings are read through a key lookup, normally the process
//! environment with CLI flags layered on top (see [`UploaderConfig::from_lookup`]).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{TaskgenError, TaskgenResult};

pub const TASKAPI_URL: &str = "TASKAPI_URL";
pub const IMAGE_SOURCE_URL: &str = "IMAGE_SOURCE_URL";
pub const IMAGE_WIDTH: &str = "IMAGE_WIDTH";
pub const IMAGE_HEIGHT: &str = "IMAGE_HEIGHT";
pub const TEMP_DIR: &str = "TEMP_DIR";
pub const IMAGE_SUFFIX: &str = "IMAGE_SUFFIX";
pub const UPLOAD_CONTENT_TYPE: &str = "UPLOAD_CONTENT_TYPE";
pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

const DEFAULT_IMAGE_SOURCE_URL: &str = "https://picsum.photos";
const DEFAULT_IMAGE_WIDTH: u32 = 1920;
const DEFAULT_IMAGE_HEIGHT: u32 = 1080;
const DEFAULT_TEMP_DIR: &str = "/tmp";
const DEFAULT_IMAGE_SUFFIX: &str = ".jpg";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Path appended to `TASKAPI_URL` to request a signed upload URL
pub const SIGNED_URL_PATH: &str = "/uploadSignedUrl";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Task API base URL, without trailing slash
    pub taskapi_url: String,
    /// Image service base URL; `/<width>/<height>` is appended
    pub image_source_url: String,
    pub image_width: u32,
    pub image_height: u32,
    /// Directory the downloaded image is staged in
    pub temp_dir: PathBuf,
    pub file_suffix: String,
    /// Content type requested from the Task API; `None` lets it decide
    pub content_type: Option<String>,
    pub http_timeout_secs: u64,
}

impl UploaderConfig {
    /// Build the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> TaskgenResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let taskapi_url = get(TASKAPI_URL)
            .ok_or_else(|| TaskgenError::Config(format!("{} must be set", TASKAPI_URL)))?;

        let config = Self {
            taskapi_url: taskapi_url.trim_end_matches('/').to_string(),
            image_source_url: get(IMAGE_SOURCE_URL)
                .unwrap_or_else(|| DEFAULT_IMAGE_SOURCE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            image_width: parse_var(get(IMAGE_WIDTH), IMAGE_WIDTH, DEFAULT_IMAGE_WIDTH)?,
            image_height: parse_var(get(IMAGE_HEIGHT), IMAGE_HEIGHT, DEFAULT_IMAGE_HEIGHT)?,
            temp_dir: get(TEMP_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMP_DIR)),
            file_suffix: get(IMAGE_SUFFIX).unwrap_or_else(|| DEFAULT_IMAGE_SUFFIX.to_string()),
            content_type: get(UPLOAD_CONTENT_TYPE),
            http_timeout_secs: parse_var(
                get(HTTP_TIMEOUT_SECS),
                HTTP_TIMEOUT_SECS,
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TaskgenResult<()> {
        validate_http_url(TASKAPI_URL, &self.taskapi_url)?;
        validate_http_url(IMAGE_SOURCE_URL, &self.image_source_url)?;

        if self.image_width == 0 || self.image_height == 0 {
            return Err(TaskgenError::Config(format!(
                "{} and {} must be greater than zero",
                IMAGE_WIDTH, IMAGE_HEIGHT
            )));
        }

        if self.http_timeout_secs == 0 {
            return Err(TaskgenError::Config(format!(
                "{} must be greater than zero",
                HTTP_TIMEOUT_SECS
            )));
        }

        Ok(())
    }

    /// URL of a random image with the configured dimensions (picsum layout)
    pub fn image_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.image_source_url, self.image_width, self.image_height
        )
    }

    pub fn signed_url_endpoint(&self) -> String {
        format!("{}{}", self.taskapi_url, SIGNED_URL_PATH)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_var<T: FromStr>(raw: Option<String>, name: &str, default: T) -> TaskgenResult<T> {
    match raw {
        Some(value) => value.parse().map_err(|_| {
            TaskgenError::Config(format!("{} must be a valid number, got '{}'", name, value))
        }),
        None => Ok(default),
    }
}

fn validate_http_url(name: &str, value: &str) -> TaskgenResult<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| TaskgenError::Config(format!("{} is not a valid URL ({}): {}", name, e, value)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(TaskgenError::Config(format!(
            "{} must use http or https, got '{}'",
            name,
            parsed.scheme()
        )));
    }

    Ok(())
}
