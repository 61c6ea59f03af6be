#![allow(dead_code)]

use std::path::Path;

use taskgen_core::UploaderConfig;

/// Smallest valid PNG (1x1), served as the "random image"
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 dimensions
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE,
    0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, // IDAT chunk
    0x08, 0xD7, 0x63, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01,
    0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45,
    0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82, // IEND chunk
];

/// Config pointing both the Task API and the image source at one mock server
pub fn test_config(server_url: &str, temp_dir: &Path) -> UploaderConfig {
    UploaderConfig {
        taskapi_url: server_url.to_string(),
        image_source_url: server_url.to_string(),
        image_width: 1920,
        image_height: 1080,
        temp_dir: temp_dir.to_path_buf(),
        file_suffix: ".jpg".to_string(),
        content_type: None,
        http_timeout_secs: 5,
    }
}

/// Task API response body as the real service sends it (JSON text)
pub fn signed_url_body(server_url: &str, object: &str, content_type: &str) -> String {
    serde_json::json!({
        "gcsPath": format!("gs://test-bucket/upload/{}", object),
        "signedUrl": format!("{}/signed/upload/{}", server_url, object),
        "expectedContentType": content_type,
    })
    .to_string()
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).map(|mut d| d.next().is_none()).unwrap_or(false)
}
