use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MapperError, MapperResult};

/// Woopra destination settings. Loaded from environment variables with the
/// prefix `WOOPRA__` and, optionally, a settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WoopraSettings {
    /// Project domain registered with Woopra, sent as `host`.
    #[serde(default)]
    pub domain: String,
    /// Idle timeout in milliseconds forwarded with every hit.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl WoopraSettings {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    /// Check required settings. Mapping assumes this has passed.
    pub fn validate(&self) -> MapperResult<()> {
        if self.domain.trim().is_empty() {
            warn!("Woopra settings rejected: domain is empty");
            return Err(MapperError::MissingSetting("domain"));
        }
        Ok(())
    }

    /// Load settings from the environment only.
    pub fn load() -> MapperResult<Self> {
        let config = config::Config::builder()
            .add_source(environment())
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load settings from `path`, with environment variables layered on top.
    /// A missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> MapperResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(environment())
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("WOOPRA")
        .separator("__")
        .try_parsing(true)
}
