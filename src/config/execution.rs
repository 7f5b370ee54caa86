use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_CLUSTER_NAME;
use crate::constants::DEFAULT_STEP_TIMEOUT_SECS;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecutionConfig {
    /// Cluster targeted by steps that declare no `clusters` mapping
    #[serde(default = "default_cluster")]
    pub default_cluster: String,

    /// Per-step timeout applied when the step config carries no `timeout` key
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// Dispatch the clusters of a multi-cluster step concurrently.
    /// Set to false to force declaration-order sequential dispatch.
    #[serde(default = "default_parallel_dispatch")]
    pub parallel_dispatch: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_cluster: default_cluster(),
            default_timeout_secs: default_timeout_secs(),
            parallel_dispatch: default_parallel_dispatch(),
        }
    }
}

impl ExecutionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_cluster.is_empty() {
            return Err(ConfigError::Message(
                "execution.default_cluster cannot be empty".to_string(),
            )
            .into());
        }

        if self.default_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "execution.default_timeout_secs must be non-zero".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

fn default_cluster() -> String {
    DEFAULT_CLUSTER_NAME.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_STEP_TIMEOUT_SECS
}
fn default_parallel_dispatch() -> bool {
    true
}
