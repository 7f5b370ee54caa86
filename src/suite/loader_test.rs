use tempfile::tempdir;

use super::*;
use crate::Error;
use crate::SuiteError;

fn write_suite(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("suite.yaml");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn load_suite_should_preserve_declaration_order() {
    let (_dir, path) = write_suite(
        r#"
tests:
  - test:
      name: install pre-requisites
      module: install_prereq
      abort-on-fail: true
  - test:
      name: deploy cluster
      module: test_cephadm
      polarion-id: CEPH-83573777
  - test:
      name: verify multisite sync
      module: sanity_rgw_multisite
      clusters:
        ceph-pri:
          config:
            commands:
              - "radosgw-admin sync status"
"#,
    );

    let suite = load_suite(&path).unwrap();

    assert_eq!(suite.name, "suite");
    assert_eq!(suite.steps.len(), 3);
    assert_eq!(suite.steps[0].name, "install pre-requisites");
    assert_eq!(suite.steps[1].name, "deploy cluster");
    assert_eq!(suite.steps[2].name, "verify multisite sync");
    assert!(suite.steps[0].abort_on_fail);
}

#[test]
fn load_suite_should_reject_empty_test_list() {
    let (_dir, path) = write_suite("tests: []\n");

    let err = load_suite(&path).unwrap_err();
    assert!(matches!(err, Error::Suite(SuiteError::EmptySuite(_))));
}

#[test]
fn load_suite_should_reject_malformed_yaml() {
    let (_dir, path) = write_suite("tests: [ {test: { name: x, module: ");

    let err = load_suite(&path).unwrap_err();
    assert!(matches!(err, Error::Suite(SuiteError::Parse { .. })));
}

#[test]
fn load_suite_should_fail_for_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let err = load_suite(&path).unwrap_err();
    assert!(matches!(err, Error::Suite(SuiteError::Io { .. })));
}

#[test]
fn load_suite_should_reject_unknown_token_kind_at_load_time() {
    let (_dir, path) = write_suite(
        r#"
tests:
  - test:
      name: bad token
      module: exec
      config:
        commands:
          - "ping {node_hostname:node5}"
"#,
    );

    let err = load_suite(&path).unwrap_err();
    assert!(matches!(
        err,
        Error::Suite(SuiteError::UnknownTokenKind { step, token })
            if step == "bad token" && token == "{node_hostname:node5}"
    ));
}

#[test]
fn load_suite_should_validate_tokens_in_per_cluster_configs() {
    let (_dir, path) = write_suite(
        r#"
tests:
  - test:
      name: bad cross-cluster token
      module: exec
      clusters:
        ceph-sec:
          config:
            commands:
              - "curl {endpoint:ceph-pri#node5}"
"#,
    );

    let err = load_suite(&path).unwrap_err();
    assert!(matches!(
        err,
        Error::Suite(SuiteError::UnknownTokenKind { token, .. })
            if token == "{endpoint:ceph-pri#node5}"
    ));
}

#[test]
fn load_suite_should_accept_known_tokens_and_plain_braces() {
    let (_dir, path) = write_suite(
        r#"
tests:
  - test:
      name: good tokens
      module: exec
      config:
        commands:
          - "ceph orch restart {service_name:shared.pri}"
          - "awk '{print $1}'"
"#,
    );

    assert!(load_suite(&path).is_ok());
}
