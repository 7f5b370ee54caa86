use super::state::transition;
use super::*;

#[test]
fn legal_transitions_should_be_accepted() {
    let mut state = StepState::Pending;
    transition(&mut state, StepState::Running).unwrap();
    transition(&mut state, StepState::Passed).unwrap();
    assert_eq!(state, StepState::Passed);

    let mut state = StepState::Pending;
    transition(&mut state, StepState::Running).unwrap();
    transition(&mut state, StepState::Failed).unwrap();
    assert_eq!(state, StepState::Failed);

    let mut state = StepState::Pending;
    transition(&mut state, StepState::Skipped).unwrap();
    assert_eq!(state, StepState::Skipped);
}

#[test]
fn illegal_transitions_should_be_rejected() {
    // Terminal states never move again
    for terminal in [StepState::Passed, StepState::Failed, StepState::Skipped] {
        for next in [
            StepState::Pending,
            StepState::Running,
            StepState::Passed,
            StepState::Failed,
            StepState::Skipped,
        ] {
            let mut state = terminal;
            assert!(transition(&mut state, next).is_err());
            assert_eq!(state, terminal);
        }
    }

    // Running steps cannot be skipped, only finished
    let mut state = StepState::Running;
    assert!(transition(&mut state, StepState::Skipped).is_err());

    // Pending steps cannot jump straight to a result
    let mut state = StepState::Pending;
    assert!(transition(&mut state, StepState::Passed).is_err());
}

#[test]
fn terminal_states_should_be_detected() {
    assert!(!StepState::Pending.is_terminal());
    assert!(!StepState::Running.is_terminal());
    assert!(StepState::Passed.is_terminal());
    assert!(StepState::Failed.is_terminal());
    assert!(StepState::Skipped.is_terminal());
}

#[test]
fn display_should_match_report_vocabulary() {
    assert_eq!(StepState::Passed.to_string(), "Passed");
    assert_eq!(StepState::Failed.to_string(), "Failed");
    assert_eq!(StepState::Skipped.to_string(), "Skipped");
}
