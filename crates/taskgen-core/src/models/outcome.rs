use serde::{Deserialize, Serialize};

use super::SignedUrlResponse;

/// Summary of one completed download-and-upload run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Basename sent to the Task API
    pub filename: String,
    pub gcs_path: String,
    pub signed_url: String,
    /// Content-Type sent with the PUT
    pub content_type: String,
    pub bytes_uploaded: u64,
    /// HTTP status returned by the signed URL
    pub status: u16,
}

impl UploadOutcome {
    pub fn new(
        filename: impl Into<String>,
        signed: &SignedUrlResponse,
        bytes_uploaded: u64,
        status: u16,
    ) -> Self {
        Self {
            filename: filename.into(),
            gcs_path: signed.gcs_path.clone(),
            signed_url: signed.signed_url.clone(),
            content_type: signed.expected_content_type.clone(),
            bytes_uploaded,
            status,
        }
    }
}
