use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_yaml::Value;

use crate::constants::RETRIES_KEY;
use crate::constants::RETRY_INTERVAL_KEY;
use crate::constants::TIMEOUT_KEY;

/// One named unit of work within a suite, targeting one or more clusters.
///
/// The `config` payload is opaque to the engine: it is forwarded to the
/// named module structurally unchanged, except for token rewriting inside
/// recognized command strings. Only the handful of keys below
/// (`timeout`, `retries`, `retry_interval`) are interpreted by the executor.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Step {
    pub name: String,

    #[serde(default)]
    pub desc: String,

    /// External test-module capability invoked with the resolved config
    pub module: String,

    /// Opaque external tracking ID, passed through to the report unparsed
    #[serde(default)]
    pub polarion_id: Option<String>,

    /// A failure of this step halts all subsequent steps in the suite
    #[serde(default)]
    pub abort_on_fail: bool,

    /// Allow the engine to reclaim the target cluster(s) after this step
    #[serde(default = "default_destroy_cluster")]
    pub destroy_cluster: bool,

    /// Per-cluster dispatch entries. Absent (or empty) targets the engine's
    /// implicit default cluster.
    #[serde(default)]
    pub clusters: HashMap<String, ClusterStepSpec>,

    #[serde(default)]
    pub config: Option<Value>,
}

/// Per-cluster entry under a step's `clusters` mapping.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ClusterStepSpec {
    #[serde(default)]
    pub config: Option<Value>,
}

impl Step {
    /// Cluster names this step dispatches to, given the engine default.
    /// Sorted so sequential dispatch order is deterministic.
    pub fn target_clusters(
        &self,
        default_cluster: &str,
    ) -> Vec<String> {
        if self.clusters.is_empty() {
            return vec![default_cluster.to_string()];
        }
        let mut names: Vec<String> = self.clusters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Effective config for one cluster entry: the step-level payload with
    /// per-cluster keys shallow-merged on top (per-cluster wins).
    pub fn merged_config(
        &self,
        cluster_name: &str,
    ) -> Option<Value> {
        let base = self.config.clone();
        let overlay = self
            .clusters
            .get(cluster_name)
            .and_then(|spec| spec.config.clone());

        match (base, overlay) {
            (base, None) => base,
            (None, overlay) => overlay,
            (Some(Value::Mapping(mut base)), Some(Value::Mapping(overlay))) => {
                for (key, value) in overlay {
                    base.insert(key, value);
                }
                Some(Value::Mapping(base))
            }
            // A non-mapping overlay replaces the step payload outright
            (_, overlay) => overlay,
        }
    }

    /// Step timeout from `config.timeout` (seconds), engine default otherwise
    pub fn timeout(
        &self,
        default_secs: u64,
    ) -> Duration {
        let secs = self
            .config_u64(TIMEOUT_KEY)
            .filter(|secs| *secs > 0)
            .unwrap_or(default_secs);
        Duration::from_secs(secs)
    }

    /// Explicit opt-in retry count from `config.retries`. Absent by default:
    /// the engine never retries implicitly.
    pub fn retries(&self) -> usize {
        self.config_u64(RETRIES_KEY).unwrap_or(0) as usize
    }

    /// Backoff base from `config.retry_interval` (seconds)
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.config_u64(RETRY_INTERVAL_KEY).unwrap_or(30))
    }

    fn config_u64(
        &self,
        key: &str,
    ) -> Option<u64> {
        self.config.as_ref()?.get(key)?.as_u64()
    }
}

fn default_destroy_cluster() -> bool {
    true
}
