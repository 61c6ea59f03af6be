//! Wire models exchanged with the Task API and reported by the CLI

pub mod outcome;
pub mod signed_url;

pub use outcome::UploadOutcome;
pub use signed_url::{SignedUrlRequest, SignedUrlResponse};
