//! Download-and-upload pipeline
//!
//! One [`ImageUploader::run`] call:
//! 1. stages a temporary file and downloads an image into it,
//! 2. asks the Task API for a signed URL named after the file's basename,
//! 3. PUTs the file's bytes to that URL,
//! 4. removes the temporary file, whatever happened before.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::Instrument;
use taskgen_core::{SignedUrlRequest, TaskgenResult, UploadOutcome, UploaderConfig};

use crate::image_source::{HttpImageSource, ImageSource};
use crate::TaskApiClient;

const TEMP_FILE_PREFIX: &str = "taskgen-";

pub struct ImageUploader<S = HttpImageSource> {
    client: TaskApiClient,
    source: S,
    temp_dir: PathBuf,
    file_suffix: String,
    content_type: Option<String>,
}

impl ImageUploader<HttpImageSource> {
    /// Uploader wired to the Task API and image service named in the config.
    pub fn from_config(config: &UploaderConfig) -> TaskgenResult<Self> {
        let client = TaskApiClient::from_config(config)?;
        let source = HttpImageSource::with_client(client.client().clone(), config.image_url());
        Ok(Self::new(client, source, config))
    }
}

impl<S: ImageSource> ImageUploader<S> {
    pub fn new(client: TaskApiClient, source: S, config: &UploaderConfig) -> Self {
        Self {
            client,
            source,
            temp_dir: config.temp_dir.clone(),
            file_suffix: config.file_suffix.clone(),
            content_type: config.content_type.clone(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Run the pipeline once.
    ///
    /// The temporary file is removed on success and on failure. If the returned
    /// future is dropped mid-flight the [`NamedTempFile`] guard removes it.
    pub async fn run(&self) -> TaskgenResult<UploadOutcome> {
        let mut staged = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(&self.file_suffix)
            .tempfile_in(&self.temp_dir)?;

        let result = self.process(&mut staged).await;

        let path = staged.path().to_path_buf();
        tracing::info!(path = %path.display(), "Removing temporary file");
        if let Err(e) = staged.close() {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove temporary file");
        }

        result
    }

    /// Run the pipeline `count` times, one after another, handing each outcome
    /// to `on_outcome`. Stops at the first failure; later runs are not
    /// attempted. Returns the number of completed runs.
    pub async fn run_many<F>(&self, count: u32, mut on_outcome: F) -> TaskgenResult<u32>
    where
        F: FnMut(&UploadOutcome),
    {
        for index in 1..=count {
            let outcome = self
                .run()
                .instrument(tracing::info_span!("upload", index, count))
                .await?;
            on_outcome(&outcome);
        }

        Ok(count)
    }

    async fn process(&self, staged: &mut NamedTempFile) -> TaskgenResult<UploadOutcome> {
        let image = self.source.fetch().await?;
        staged.as_file_mut().write_all(&image)?;
        staged.as_file_mut().flush()?;

        let path = staged.path();
        tracing::info!(
            path = %path.display(),
            source = %self.source.describe(),
            size_bytes = image.len() as u64,
            "Saved image"
        );

        let request = SignedUrlRequest::for_path(path, self.content_type.clone())?;
        let signed = self.client.request_signed_url(&request).await?;

        tracing::info!(
            gcs_path = %signed.gcs_path,
            signed_url = %signed.signed_url,
            "Uploading to GCS path"
        );

        let data = tokio::fs::read(path).await?;
        let size = data.len() as u64;
        let status = self.client.upload_to_signed_url(&signed, data).await?;

        Ok(UploadOutcome::new(
            request.filename,
            &signed,
            size,
            status.as_u16(),
        ))
    }
}
