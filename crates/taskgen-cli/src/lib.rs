use std::collections::HashMap;

use anyhow::Context;
use serde::Serialize;
use taskgen_core::{TaskgenError, TaskgenResult, UploaderConfig};

/// Exit code for failures reported by a remote service
pub const EXIT_REMOTE_FAILURE: u8 = 1;
/// Exit code for configuration, input and local filesystem failures
pub const EXIT_LOCAL_FAILURE: u8 = 2;

/// Initialize tracing for CLI binaries.
///
/// `RUST_LOG` picks the filter (default `info`); `LOG_FORMAT=json` switches to
/// one JSON object per line.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Map an error chain to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let remote = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<TaskgenError>())
        .map(TaskgenError::is_remote)
        .unwrap_or(false);

    if remote {
        EXIT_REMOTE_FAILURE
    } else {
        EXIT_LOCAL_FAILURE
    }
}

/// Command-line values layered over the environment, keyed by env var name.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    values: HashMap<&'static str, String>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an override when the flag was given.
    pub fn set<V: ToString>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.values.insert(key, v.to_string());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Resolve the config: overrides first, then `fallback` (normally the
    /// process environment).
    pub fn resolve_with<F>(&self, fallback: F) -> TaskgenResult<UploaderConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        UploaderConfig::from_lookup(|key| {
            self.get(key)
                .map(str::to_string)
                .or_else(|| fallback(key))
        })
    }

    /// Resolve against the process environment. `.env` is loaded once by the
    /// binary before this runs.
    pub fn resolve(&self) -> TaskgenResult<UploaderConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }
}
