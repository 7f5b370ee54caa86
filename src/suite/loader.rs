use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::resolver::scan;
use crate::resolver::visit_command_strings;
use crate::resolver::TokenScanError;
use crate::Result;
use crate::Step;
use crate::SuiteError;

/// Ordered list of test steps forming one run, loaded from a suite file.
#[derive(Debug, Clone)]
pub struct Suite {
    pub name: String,
    pub path: PathBuf,
    pub steps: Vec<Step>,
}

/// On-disk shape: a mapping with top-level key `tests`, each entry
/// wrapping one step under a `test` key.
#[derive(Debug, Serialize, Deserialize)]
struct SuiteFile {
    tests: Vec<TestEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TestEntry {
    test: Step,
}

/// Parses a suite definition into an ordered step list.
///
/// Declaration order is preserved: it is the execution order. Token kinds
/// inside recognized command strings are validated here so that a typo like
/// `{node_hostname:...}` fails the whole run up front instead of mid-suite.
pub fn load_suite(path: &Path) -> Result<Suite> {
    let raw = std::fs::read_to_string(path).map_err(|e| SuiteError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: SuiteFile = serde_yaml::from_str(&raw).map_err(|e| SuiteError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let steps: Vec<Step> = file.tests.into_iter().map(|entry| entry.test).collect();
    if steps.is_empty() {
        return Err(SuiteError::EmptySuite(path.to_path_buf()).into());
    }

    for step in &steps {
        validate_step_tokens(step)?;
    }

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!("loaded suite {} with {} steps", name, steps.len());
    Ok(Suite {
        name,
        path: path.to_path_buf(),
        steps,
    })
}

/// Load-time token check over every command string the step carries,
/// both in the step-level payload and in per-cluster entries.
fn validate_step_tokens(step: &Step) -> Result<()> {
    let mut bad_token: Option<String> = None;
    let mut check = |command: &str| {
        if bad_token.is_some() {
            return;
        }
        if let Err(TokenScanError::UnknownKind { raw }) = scan(command) {
            bad_token = Some(raw);
        }
    };

    if let Some(config) = &step.config {
        visit_command_strings(config, &mut check);
    }
    for spec in step.clusters.values() {
        if let Some(config) = &spec.config {
            visit_command_strings(config, &mut check);
        }
    }

    match bad_token {
        Some(token) => Err(SuiteError::UnknownTokenKind {
            step: step.name.clone(),
            token,
        }
        .into()),
        None => Ok(()),
    }
}
