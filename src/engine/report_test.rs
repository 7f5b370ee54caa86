use std::time::Duration;

use super::*;

fn step_report(
    name: &str,
    state: StepState,
    detail: Option<&str>,
) -> StepReport {
    StepReport {
        name: name.to_string(),
        module: "exec".to_string(),
        polarion_id: Some("CEPH-83575223".to_string()),
        state,
        detail: detail.map(|d| d.to_string()),
        duration: Duration::from_secs(12),
    }
}

fn report(steps: Vec<StepReport>) -> SuiteReport {
    SuiteReport {
        suite_name: "rgw-multisite-sanity".to_string(),
        run_id: "a1b2c3d4".to_string(),
        steps,
        duration: Duration::from_secs(40),
    }
}

#[test]
fn overall_should_be_passed_only_when_every_step_passed() {
    let all_passed = report(vec![
        step_report("deploy", StepState::Passed, None),
        step_report("verify", StepState::Passed, None),
    ]);
    assert_eq!(all_passed.overall(), SuiteStatus::Passed);
    assert!(all_passed.passed());

    let one_failed = report(vec![
        step_report("deploy", StepState::Passed, None),
        step_report("verify", StepState::Failed, Some("sync stalled")),
    ]);
    assert_eq!(one_failed.overall(), SuiteStatus::Failed);

    let skipped_only = report(vec![
        step_report("deploy", StepState::Failed, Some("bootstrap error")),
        step_report("verify", StepState::Skipped, Some("skipped")),
    ]);
    assert_eq!(skipped_only.overall(), SuiteStatus::Failed);
}

#[test]
fn render_should_list_every_step_with_state_and_detail() {
    let rendered = report(vec![
        step_report("deploy cluster", StepState::Passed, None),
        step_report("verify sync", StepState::Failed, Some("sync stalled on ceph-sec")),
        step_report("teardown", StepState::Skipped, Some("skipped: earlier step failed with abort-on-fail")),
    ])
    .to_string();

    assert!(rendered.contains("rgw-multisite-sanity"));
    assert!(rendered.contains("Passed  deploy cluster"));
    assert!(rendered.contains("Failed  verify sync"));
    assert!(rendered.contains("sync stalled on ceph-sec"));
    assert!(rendered.contains("Skipped  teardown"));
    assert!(rendered.contains("Overall: Failed"));
    // polarion ids are reproduced verbatim
    assert!(rendered.contains("[CEPH-83575223]"));
}
