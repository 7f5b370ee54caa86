use std::fmt;

use serde::Serialize;

use crate::Error;
use crate::Result;

/// Per-step state machine:
/// `Pending -> Running -> Passed | Failed`, with `Pending -> Skipped`
/// reserved for steps behind an aborting failure or a shutdown request.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
}

impl StepState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepState::Passed | StepState::Failed | StepState::Skipped)
    }

    pub fn can_transition_to(
        &self,
        next: StepState,
    ) -> bool {
        matches!(
            (self, next),
            (StepState::Pending, StepState::Running)
                | (StepState::Pending, StepState::Skipped)
                | (StepState::Running, StepState::Passed)
                | (StepState::Running, StepState::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Pending => "Pending",
            StepState::Running => "Running",
            StepState::Passed => "Passed",
            StepState::Failed => "Failed",
            StepState::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for StepState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Guarded transition. An illegal edge is an engine bug, surfaced as a
/// fatal error instead of silently rewriting history.
pub(crate) fn transition(
    state: &mut StepState,
    next: StepState,
) -> Result<()> {
    if !state.can_transition_to(next) {
        return Err(Error::Fatal(format!(
            "illegal step state transition {state} -> {next}"
        )));
    }
    *state = next;
    Ok(())
}
