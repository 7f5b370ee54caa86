use std::fmt;
use std::time::Duration;

use super::StepState;

/// Overall outcome of one suite run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteStatus {
    Passed,
    Failed,
}

/// Terminal record for one step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: String,
    pub module: String,
    /// Opaque tracking id, reproduced verbatim for external correlation
    pub polarion_id: Option<String>,
    pub state: StepState,
    /// Failure/skip detail; `None` for passed steps
    pub detail: Option<String>,
    pub duration: Duration,
}

/// Final suite report: every step's terminal state in declaration order.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub suite_name: String,
    pub run_id: String,
    pub steps: Vec<StepReport>,
    pub duration: Duration,
}

impl SuiteReport {
    pub fn overall(&self) -> SuiteStatus {
        if self.steps.iter().all(|s| s.state == StepState::Passed) {
            SuiteStatus::Passed
        } else {
            SuiteStatus::Failed
        }
    }

    pub fn passed(&self) -> bool {
        self.overall() == SuiteStatus::Passed
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "Suite {} (run {}) finished in {:.1}s",
            self.suite_name,
            self.run_id,
            self.duration.as_secs_f64()
        )?;
        for step in &self.steps {
            let polarion = step
                .polarion_id
                .as_deref()
                .map(|id| format!(" [{id}]"))
                .unwrap_or_default();
            writeln!(
                f,
                "  {:>7}  {}{} ({:.1}s)",
                step.state,
                step.name,
                polarion,
                step.duration.as_secs_f64()
            )?;
            if let Some(detail) = &step.detail {
                writeln!(f, "           {detail}")?;
            }
        }
        write!(
            f,
            "Overall: {}",
            match self.overall() {
                SuiteStatus::Passed => "Passed",
                SuiteStatus::Failed => "Failed",
            }
        )
    }
}
