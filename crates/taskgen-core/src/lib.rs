//! taskgen core library
//!
//! Wire models for the Task API, uploader configuration and the error type
//! shared by the API client and the CLI.

pub mod config;
pub mod error;
pub mod models;

pub use config::UploaderConfig;
pub use error::{TaskgenError, TaskgenResult};
pub use models::{SignedUrlRequest, SignedUrlResponse, UploadOutcome};
