use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Log file is written as `<log_dir>/<file_prefix>.log`
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(ConfigError::Message("logging.log_dir cannot be empty".to_string()).into());
        }

        #[cfg(not(test))]
        {
            use std::fs;
            // Check directory existence or create ability
            if !self.log_dir.exists() {
                fs::create_dir_all(&self.log_dir).map_err(|e| {
                    ConfigError::Message(format!(
                        "Failed to create log directory at {}: {}",
                        self.log_dir.display(),
                        e
                    ))
                })?;
            }

            // Check write permissions
            let test_file = self.log_dir.join(".permission_test");
            fs::write(&test_file, b"test").map_err(|e| {
                ConfigError::Message(format!(
                    "No write permission in log directory {}: {}",
                    self.log_dir.display(),
                    e
                ))
            })?;
            fs::remove_file(&test_file).ok();
        }

        Ok(())
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir.join(format!("{}.log", self.file_prefix))
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/tmp/t-engine/logs")
}
fn default_file_prefix() -> String {
    "t-engine".to_string()
}
