//! Configuration management module for the suite orchestration engine.
//!
//! Provides hierarchical configuration loading from multiple sources with priority:
//! 1. Default values (hardcoded)
//! 2. `CONFIG_PATH` config file
//! 3. Caller-supplied override file
//! 4. Environment variables (highest priority)
//!

mod execution;
mod logging;
mod ssh;
pub use execution::*;
pub use logging::*;
pub use ssh::*;

#[cfg(test)]
mod config_test;

//---
use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EngineConfig {
    /// Step dispatch defaults (default cluster, timeout, parallelism)
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Remote command transport parameters
    #[serde(default)]
    pub ssh: SshConfig,
    /// Log file destination
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from multiple sources with priority:
    /// 1. Hardcoded defaults
    /// 2. `CONFIG_PATH` file
    /// 3. Environment variables
    ///
    /// # Returns
    /// Merged configuration with proper priority ordering
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder();

        // 1. Optional main config file
        if let Ok(path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        // 2. Environment variables (highest priority)
        builder = builder.add_source(
            Environment::with_prefix("TENGINE")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Merges a caller-supplied config file over the current settings
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let merged: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path).required(true))
            .build()?
            .try_deserialize()?;
        Ok(merged)
    }

    /// Validates configuration consistency
    /// # Errors
    /// Returns a config error if any configuration rules are violated
    pub fn validate(&self) -> Result<()> {
        self.execution.validate()?;
        self.ssh.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
