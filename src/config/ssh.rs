use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Parameters for the `ssh` client invocation used to reach cluster nodes.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SshConfig {
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Private key passed via `-i` when set
    #[serde(default)]
    pub identity_file: Option<PathBuf>,

    /// Lab nodes are reimaged between runs, host keys churn
    #[serde(default = "default_strict_host_key_checking")]
    pub strict_host_key_checking: bool,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout_secs(),
            identity_file: None,
            strict_host_key_checking: default_strict_host_key_checking(),
        }
    }
}

impl SshConfig {
    pub fn validate(&self) -> Result<()> {
        if self.user.is_empty() {
            return Err(ConfigError::Message("ssh.user cannot be empty".to_string()).into());
        }

        if self.port == 0 {
            return Err(ConfigError::Message("ssh.port must be non-zero".to_string()).into());
        }

        Ok(())
    }
}

fn default_user() -> String {
    "cephuser".to_string()
}
fn default_port() -> u16 {
    22
}
fn default_connect_timeout_secs() -> u64 {
    30
}
fn default_strict_host_key_checking() -> bool {
    false
}
