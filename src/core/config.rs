//! Engine configuration from YAML

use crate::{
    error::{PipelineError, Result},
    execution::ThreadCount,
};
use serde::Deserialize;
use std::path::Path;

/// Environment variable overriding the configured thread count
pub const THREADS_ENV_VAR: &str = "PPIPELINE_THREADS";

/// Engine settings loaded from YAML
///
/// ```yaml
/// name: "numbers"
/// thread_count: "x2"   # or an integer, or omitted for one per CPU
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Name used in log output
    #[serde(default)]
    pub name: Option<String>,

    /// Worker pool size
    #[serde(default)]
    pub thread_count: Option<ThreadCount>,
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EngineConfig = if yaml.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| PipelineError::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply `PPIPELINE_THREADS` if it is set
    pub fn with_env_override(self) -> Result<Self> {
        match std::env::var(THREADS_ENV_VAR) {
            Ok(value) => self.with_thread_setting(&value),
            Err(_) => Ok(self),
        }
    }

    /// Override the thread count from a textual setting
    pub fn with_thread_setting(mut self, value: &str) -> Result<Self> {
        self.thread_count = Some(ThreadCount::parse_setting(value)?);
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(thread_count) = self.thread_count {
            thread_count.resolve()?;
        }
        Ok(())
    }
}
