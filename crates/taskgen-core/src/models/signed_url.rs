use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{TaskgenError, TaskgenResult};

/// Request body for `POST /uploadSignedUrl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlRequest {
    /// Object name under the Task API's upload prefix (a basename, never a path)
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Filename must be between 1 and 255 characters"
        ),
        custom(function = "validate_basename")
    )]
    pub filename: String,
    /// Content type the object will be uploaded with. When absent the Task API
    /// derives one from the filename extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Content type must be between 1 and 255 characters"
    ))]
    pub content_type: Option<String>,
}

impl SignedUrlRequest {
    pub fn new(filename: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
        }
    }

    /// Build a request for a local file, using its basename as the object name.
    pub fn for_path(path: &Path, content_type: Option<String>) -> TaskgenResult<Self> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                TaskgenError::Validation(format!(
                    "Path has no UTF-8 file name: {}",
                    path.display()
                ))
            })?;

        Ok(Self::new(filename, content_type))
    }
}

fn validate_basename(filename: &str) -> Result<(), ValidationError> {
    if filename.contains('/') || filename.contains('\\') {
        let mut err = ValidationError::new("basename");
        err.message = Some("Filename must not contain path separators".into());
        return Err(err);
    }
    Ok(())
}

/// Response from `POST /uploadSignedUrl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    /// Final object location, e.g. `gs://bucket/upload/name.jpg`
    pub gcs_path: String,
    /// Pre-authorized URL accepting a single PUT
    pub signed_url: String,
    /// Content-Type the signed URL was issued for; the PUT must send exactly this
    pub expected_content_type: String,
}
