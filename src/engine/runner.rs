use std::sync::Arc;
use std::time::Duration;

use nanoid::nanoid;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::report::StepReport;
use super::report::SuiteReport;
use super::state::transition;
use super::StepState;
use crate::ClusterRegistry;
use crate::Result;
use crate::Step;
use crate::StepExecutor;
use crate::Suite;

/// Drives a suite through the per-step state machine.
///
/// Steps execute strictly in declaration order. A failure with
/// `abort-on-fail: true` skips every remaining step; without it the run
/// records the failure and continues. Cluster teardown follows each step's
/// `destroy-cluster` flag, but never reclaims a cluster a later pending
/// step still references.
pub struct SuiteRunner {
    executor: StepExecutor,
    registry: Arc<ClusterRegistry>,
    default_cluster: String,
    cancel: CancellationToken,
}

impl SuiteRunner {
    pub fn new(
        executor: StepExecutor,
        registry: Arc<ClusterRegistry>,
        default_cluster: String,
    ) -> Self {
        Self {
            executor,
            registry,
            default_cluster,
            cancel: CancellationToken::new(),
        }
    }

    /// Shares the graceful-shutdown token: cancelling it skips all steps
    /// that have not started yet.
    pub fn with_cancel(
        mut self,
        cancel: CancellationToken,
    ) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(
        &self,
        suite: &Suite,
    ) -> Result<SuiteReport> {
        let run_id = nanoid!(8);
        info!("starting suite {} (run {}), {} steps", suite.name, run_id, suite.steps.len());

        let suite_started = Instant::now();
        let mut states = vec![StepState::Pending; suite.steps.len()];
        let mut reports: Vec<StepReport> = Vec::with_capacity(suite.steps.len());
        let mut abort = false;

        for (index, step) in suite.steps.iter().enumerate() {
            if abort || self.cancel.is_cancelled() {
                transition(&mut states[index], StepState::Skipped)?;
                let detail = if abort {
                    "skipped: earlier step failed with abort-on-fail"
                } else {
                    "skipped: shutdown requested"
                };
                debug!("step {} '{}' {}", index, step.name, detail);
                reports.push(terminal_report(step, StepState::Skipped, Some(detail.into()), Duration::ZERO));
                continue;
            }

            transition(&mut states[index], StepState::Running)?;
            info!("step {} '{}' running module {}", index, step.name, step.module);
            let step_started = Instant::now();

            let (state, detail) = match self.executor.execute(step).await {
                Ok(outcome) if outcome.status.is_pass() => (StepState::Passed, None),
                Ok(outcome) => (StepState::Failed, Some(outcome.detail())),
                Err(e) => (StepState::Failed, Some(e.to_string())),
            };
            transition(&mut states[index], state)?;

            if state == StepState::Failed {
                error!(
                    "step {} '{}' failed: {}",
                    index,
                    step.name,
                    detail.as_deref().unwrap_or_default()
                );
                if step.abort_on_fail {
                    info!("abort-on-fail set, skipping remaining steps");
                    abort = true;
                }
            }

            reports.push(terminal_report(step, state, detail, step_started.elapsed()));
            self.reclaim_clusters(suite, index, step, &states, abort);
        }

        let report = SuiteReport {
            suite_name: suite.name.clone(),
            run_id,
            steps: reports,
            duration: suite_started.elapsed(),
        };
        let surviving = self.registry.cluster_names();
        if !surviving.is_empty() {
            info!("clusters kept alive at suite end: {:?}", surviving);
        }
        info!("suite {} finished: {:?}", suite.name, report.overall());
        Ok(report)
    }

    /// Deregisters the step's target clusters when `destroy-cluster` allows
    /// it and no later pending step references them.
    fn reclaim_clusters(
        &self,
        suite: &Suite,
        index: usize,
        step: &Step,
        states: &[StepState],
        abort: bool,
    ) {
        if !step.destroy_cluster {
            debug!("destroy-cluster=false, keeping clusters of step '{}'", step.name);
            return;
        }

        for cluster in step.target_clusters(&self.default_cluster) {
            // After an abort every later step is skipped, so nothing
            // downstream can reference the cluster anymore
            let referenced_later = !abort
                && suite
                    .steps
                    .iter()
                    .enumerate()
                    .skip(index + 1)
                    .filter(|(later_index, _)| !states[*later_index].is_terminal())
                    .any(|(_, later)| {
                        later.target_clusters(&self.default_cluster).contains(&cluster)
                    });

            if referenced_later {
                debug!("cluster {} still referenced by a later step, keeping it", cluster);
                continue;
            }
            if self.registry.deregister(&cluster) {
                info!("reclaimed cluster {} after step '{}'", cluster, step.name);
            }
        }
    }
}

fn terminal_report(
    step: &Step,
    state: StepState,
    detail: Option<String>,
    duration: Duration,
) -> StepReport {
    StepReport {
        name: step.name.clone(),
        module: step.module.clone(),
        polarion_id: step.polarion_id.clone(),
        state,
        detail,
        duration,
    }
}
