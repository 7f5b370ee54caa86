use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;
use serde_yaml::Value;
use tokio_util::sync::CancellationToken;

use crate::ClusterFacts;
use crate::ExecutionError;
use crate::Result;
use crate::TopologyDelta;

/// Terminal status of one module run against one cluster.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pass,
    Fail,
}

impl StepStatus {
    pub fn is_pass(&self) -> bool {
        matches!(self, StepStatus::Pass)
    }
}

/// Result reported by a test module.
#[derive(Debug, Clone)]
pub struct ModuleOutcome {
    pub status: StepStatus,
    pub detail: String,
    /// Set by topology-changing modules (cluster deploy, RGW realm setup).
    /// Applied to the registry by the executor once the dispatch completes.
    pub topology_delta: Option<TopologyDelta>,
}

impl ModuleOutcome {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Pass,
            detail: detail.into(),
            topology_delta: None,
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Fail,
            detail: detail.into(),
            topology_delta: None,
        }
    }

    pub fn with_topology_delta(
        mut self,
        delta: TopologyDelta,
    ) -> Self {
        self.topology_delta = Some(delta);
        self
    }
}

/// Everything a module sees for one cluster dispatch: a consistent
/// inventory snapshot, the resolved opaque config and a cancellation
/// token honored by long-running cooperative modules.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    pub cluster: Arc<ClusterFacts>,
    /// Step config after token resolution. `None` when the step carries none.
    pub config: Option<Value>,
    /// Correlation id for this dispatch, unique per attempt
    pub run_id: String,
    pub cancel: CancellationToken,
}

/// External test-module capability, looked up by name and invoked per
/// cluster entry. Module bodies (cephadm bootstrap, RGW multisite sanity,
/// pool checks, ...) live outside the engine; implementations of this trait
/// adapt them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TestModule: Send + Sync + 'static {
    async fn execute(
        &self,
        ctx: ModuleContext,
    ) -> Result<ModuleOutcome>;
}

/// Named module implementations available to a suite run.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: DashMap<String, Arc<dyn TestModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module under a capability name. Re-registration replaces.
    pub fn register(
        &self,
        name: impl Into<String>,
        module: Arc<dyn TestModule>,
    ) {
        self.modules.insert(name.into(), module);
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Result<Arc<dyn TestModule>> {
        self.modules
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ExecutionError::ModuleNotFound(name.to_string()).into())
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.modules.contains_key(name)
    }
}
