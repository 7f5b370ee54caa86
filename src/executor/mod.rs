//! Executes a single step's configuration against its target cluster(s).
//!
//! ## Dispatch pipeline
//! 1. Pre-flight: every target cluster must be registered and the module
//!    must exist. Resolution failures abort before any dispatch.
//! 2. Per-cluster config merge and token rewriting, for all targets, before
//!    the first dispatch goes out.
//! 3. Dispatch to all targets (parallel with join by default), each bounded
//!    by the step timeout and wrapped in explicit opt-in retry.
//! 4. Topology deltas reported by modules are applied to the registry as
//!    each cluster's dispatch completes.

mod dispatch;
mod exec;
mod module;
pub use dispatch::*;
pub use exec::*;
pub use module::*;


use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use nanoid::nanoid;
use serde_yaml::Value;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::warn;

use crate::utils::async_task::task_with_backoff;
use crate::ClusterRegistry;
use crate::Error;
use crate::ExecutionConfig;
use crate::ExecutionError;
use crate::ResolutionError;
use crate::Result;
use crate::Step;
use crate::TokenResolver;

/// Resolution errors, schema mismatches and shutdown interrupts are final
/// even when a step opts into retries.
fn is_retryable(error: &Error) -> bool {
    !matches!(
        error,
        Error::Resolution(_)
            | Error::Execution(ExecutionError::ConfigSchemaMismatch { .. })
            | Error::Execution(ExecutionError::Interrupted)
    )
}

/// Result of one cluster entry's dispatch within a step.
#[derive(Debug, Clone)]
pub struct ClusterDispatch {
    pub cluster: String,
    pub status: StepStatus,
    pub detail: String,
}

/// Aggregated result of one step across all its target clusters.
/// The step passes only when every targeted cluster's dispatch passed.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub status: StepStatus,
    pub dispatches: Vec<ClusterDispatch>,
}

impl StepOutcome {
    fn from_dispatches(dispatches: Vec<ClusterDispatch>) -> Self {
        let status = if dispatches.iter().all(|d| d.status.is_pass()) {
            StepStatus::Pass
        } else {
            StepStatus::Fail
        };
        Self { status, dispatches }
    }

    /// Failure details of every non-passing cluster, or the pass details
    /// when everything succeeded.
    pub fn detail(&self) -> String {
        let failures: Vec<String> = self
            .dispatches
            .iter()
            .filter(|d| !d.status.is_pass())
            .map(|d| format!("{}: {}", d.cluster, d.detail))
            .collect();
        if failures.is_empty() {
            self.dispatches
                .iter()
                .map(|d| format!("{}: {}", d.cluster, d.detail))
                .collect::<Vec<_>>()
                .join("; ")
        } else {
            failures.join("; ")
        }
    }
}

/// Runs one step against its target clusters using a shared registry and
/// module registry.
pub struct StepExecutor {
    registry: Arc<ClusterRegistry>,
    modules: Arc<ModuleRegistry>,
    execution: ExecutionConfig,
    cancel: CancellationToken,
}

impl StepExecutor {
    pub fn new(
        registry: Arc<ClusterRegistry>,
        modules: Arc<ModuleRegistry>,
        execution: ExecutionConfig,
    ) -> Self {
        Self {
            registry,
            modules,
            execution,
            cancel: CancellationToken::new(),
        }
    }

    /// Shares a shutdown token with the caller: cancelling it interrupts
    /// cooperative modules mid-dispatch.
    pub fn with_cancel(
        mut self,
        cancel: CancellationToken,
    ) -> Self {
        self.cancel = cancel;
        self
    }

    /// Executes a step. `Err` means the step never dispatched (unknown
    /// cluster, unknown module, unresolvable token); `Ok` carries the
    /// per-cluster results.
    pub async fn execute(
        &self,
        step: &Step,
    ) -> Result<StepOutcome> {
        let targets = step.target_clusters(&self.execution.default_cluster);

        // Pre-flight checks happen for every target before any dispatch
        for cluster in &targets {
            if !self.registry.contains(cluster) {
                return Err(ResolutionError::UnknownCluster(cluster.clone()).into());
            }
        }
        let module = self.modules.get(&step.module)?;

        // Resolve every cluster entry's tokens up front: a single
        // unresolvable token fails the whole step with zero dispatches
        let mut prepared: Vec<(String, Option<Value>)> = Vec::with_capacity(targets.len());
        for cluster in &targets {
            let mut config = step.merged_config(cluster);
            if let Some(config) = config.as_mut() {
                TokenResolver::new(&self.registry, cluster).resolve_config(config)?;
            }
            prepared.push((cluster.clone(), config));
        }

        let step_timeout = step.timeout(self.execution.default_timeout_secs);
        let attempts = step.retries() + 1;
        let retry_interval = step.retry_interval();

        let dispatches = if self.execution.parallel_dispatch && prepared.len() > 1 {
            let futures: Vec<_> = prepared
                .into_iter()
                .map(|(cluster, config)| {
                    self.dispatch_cluster(
                        step,
                        module.clone(),
                        cluster,
                        config,
                        step_timeout,
                        attempts,
                        retry_interval,
                    )
                })
                .collect();
            join_all(futures).await
        } else {
            let mut results = Vec::with_capacity(prepared.len());
            for (cluster, config) in prepared {
                results.push(
                    self.dispatch_cluster(
                        step,
                        module.clone(),
                        cluster,
                        config,
                        step_timeout,
                        attempts,
                        retry_interval,
                    )
                    .await,
                );
            }
            results
        };

        Ok(StepOutcome::from_dispatches(dispatches))
    }

    #[allow(clippy::too_many_arguments)]
    async fn dispatch_cluster(
        &self,
        step: &Step,
        module: Arc<dyn TestModule>,
        cluster: String,
        config: Option<Value>,
        step_timeout: Duration,
        attempts: usize,
        retry_interval: Duration,
    ) -> ClusterDispatch {
        let cancel = self.cancel.child_token();

        let run_module = || {
            let module = module.clone();
            let module_name = step.module.clone();
            let config = config.clone();
            let cancel = cancel.clone();
            let cluster = cluster.clone();
            async move {
                // Fresh snapshot per attempt: a retry observes topology
                // changes applied in the meantime
                let snapshot = self.registry.snapshot(&cluster)?;
                let ctx = ModuleContext {
                    cluster: snapshot,
                    config,
                    run_id: nanoid!(10),
                    cancel,
                };
                let outcome = module.execute(ctx).await?;
                match outcome.status {
                    StepStatus::Pass => Ok(outcome),
                    StepStatus::Fail => Err(ExecutionError::ModuleFailure {
                        module: module_name,
                        detail: outcome.detail,
                    }
                    .into()),
                }
            }
        };

        // The timeout bounds the whole attempt sequence, backoff included
        let result = timeout(
            step_timeout,
            task_with_backoff(run_module, attempts, retry_interval, is_retryable),
        )
        .await;

        match result {
            Ok(Ok(outcome)) => {
                if let Some(delta) = &outcome.topology_delta {
                    if !delta.is_empty() {
                        if let Err(e) = self.registry.update_topology(&cluster, delta) {
                            warn!("topology update for {} failed: {:?}", cluster, e);
                            return ClusterDispatch {
                                cluster,
                                status: StepStatus::Fail,
                                detail: format!("topology update failed: {e}"),
                            };
                        }
                        info!("applied topology delta to cluster {}", cluster);
                    }
                }
                ClusterDispatch {
                    cluster,
                    status: StepStatus::Pass,
                    detail: outcome.detail,
                }
            }
            Ok(Err(e)) => ClusterDispatch {
                cluster,
                status: StepStatus::Fail,
                detail: e.to_string(),
            },
            Err(_elapsed) => {
                // Stop cooperative in-flight work; whatever already ran
                // on the cluster stays applied
                cancel.cancel();
                let e = ExecutionError::Timeout {
                    module: step.module.clone(),
                    duration: step_timeout,
                };
                ClusterDispatch {
                    cluster,
                    status: StepStatus::Fail,
                    detail: format!(
                        "{e}; in-flight dispatch cancelled, prior side effects are not rolled back"
                    ),
                }
            }
        }
    }
}
