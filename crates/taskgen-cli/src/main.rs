//! taskgen: push random images through the Task API's signed upload flow.
//!
//! Set TASKAPI_URL (or pass --taskapi-url). Other settings are documented on
//! `taskgen_core::UploaderConfig`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use taskgen_api_client::{ImageUploader, TaskApiClient};
use taskgen_cli::{exit_code, init_tracing, print_json, ConfigOverrides};
use taskgen_core::config::{
    HTTP_TIMEOUT_SECS, IMAGE_HEIGHT, IMAGE_SOURCE_URL, IMAGE_SUFFIX, IMAGE_WIDTH, TASKAPI_URL,
    TEMP_DIR, UPLOAD_CONTENT_TYPE,
};
use taskgen_core::{SignedUrlRequest, TaskgenError, TaskgenResult};

#[derive(Parser, Debug)]
#[command(name = "taskgen", about = "Generate upload tasks from random images", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Task API base URL (overrides TASKAPI_URL)
    #[arg(long, global = true, value_name = "URL")]
    taskapi_url: Option<String>,

    /// HTTP timeout in seconds (overrides HTTP_TIMEOUT_SECS)
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download a random image and upload it through a signed URL
    Upload {
        /// Number of images to upload, one after another
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
        /// Image service base URL (overrides IMAGE_SOURCE_URL)
        #[arg(long, value_name = "URL")]
        image_url: Option<String>,
        /// Image width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Image height in pixels
        #[arg(long)]
        height: Option<u32>,
        /// Directory for the temporary image file
        #[arg(long, value_name = "DIR")]
        temp_dir: Option<PathBuf>,
        /// Suffix of the temporary file, e.g. ".jpg"
        #[arg(long)]
        suffix: Option<String>,
        /// Content type to request instead of letting the Task API decide
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Request a signed upload URL without uploading anything
    SignedUrl {
        /// Object file name
        filename: String,
        /// Content type to request
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Check that the Task API is reachable
    Ping,
}

impl Cli {
    fn overrides(&self) -> TaskgenResult<ConfigOverrides> {
        let mut overrides = ConfigOverrides::new();
        overrides
            .set(TASKAPI_URL, self.common.taskapi_url.as_deref())
            .set(HTTP_TIMEOUT_SECS, self.common.timeout);

        if let Commands::Upload {
            image_url,
            width,
            height,
            temp_dir,
            suffix,
            content_type,
            ..
        } = &self.command
        {
            let temp_dir = temp_dir
                .as_deref()
                .map(|dir| {
                    dir.to_str().ok_or_else(|| {
                        TaskgenError::Validation(format!(
                            "--temp-dir must be valid UTF-8: {}",
                            dir.display()
                        ))
                    })
                })
                .transpose()?;

            overrides
                .set(IMAGE_SOURCE_URL, image_url.as_deref())
                .set(IMAGE_WIDTH, *width)
                .set(IMAGE_HEIGHT, *height)
                .set(TEMP_DIR, temp_dir)
                .set(IMAGE_SUFFIX, suffix.as_deref())
                .set(UPLOAD_CONTENT_TYPE, content_type.as_deref());
        }

        Ok(overrides)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{:#}", e);
            tracing::error!(error = %message, "taskgen failed");
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli
        .overrides()?
        .resolve()
        .context("Invalid configuration. Set TASKAPI_URL or pass --taskapi-url")?;

    match cli.command {
        Commands::Upload { count, .. } => {
            let uploader =
                ImageUploader::from_config(&config).context("Failed to create uploader")?;

            tracing::info!(
                count,
                image_url = %config.image_url(),
                taskapi_url = %config.taskapi_url,
                temp_dir = %uploader.temp_dir().display(),
                "Starting image uploads"
            );

            let mut completed = 0;
            let result = uploader
                .run_many(count, |outcome| {
                    completed += 1;
                    if let Err(e) = print_json(outcome) {
                        tracing::warn!(error = %e, "Failed to print upload outcome");
                    }
                })
                .await;
            result.with_context(|| format!("Upload {} of {} failed", completed + 1, count))?;
        }
        Commands::SignedUrl {
            filename,
            content_type,
        } => {
            let client = TaskApiClient::from_config(&config)?;
            let request = SignedUrlRequest::new(filename, content_type);
            let response = client.request_signed_url(&request).await?;
            print_json(&response)?;
        }
        Commands::Ping => {
            let client = TaskApiClient::from_config(&config)?;
            let reply = client.ping().await?;
            tracing::info!(taskapi_url = %client.base_url(), reply = %reply, "Task API reachable");
            print_json(&serde_json::json!({ "taskapi_url": client.base_url(), "reply": reply }))?;
        }
    }

    Ok(())
}
