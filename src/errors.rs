//! Suite Orchestration Error Hierarchy
//!
//! Defines error types for the test-suite orchestration engine,
//! categorized by pipeline stage (loading, resolution, execution) and
//! operational concerns.

use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (filesystem, signals, background tasks)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Engine configuration validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Suite file loading and validation failures
    #[error(transparent)]
    Suite(#[from] SuiteError),

    /// Cluster fact / token resolution failures
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Step dispatch and module execution failures
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// Failures raised while loading a suite definition, before any step runs.
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    /// Suite file could not be read
    #[error("Failed to read suite file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Suite file is not valid YAML for the `{tests: [{test: ...}]}` shape
    #[error("Failed to parse suite file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Suite declares no steps
    #[error("Suite {0} contains no test steps")]
    EmptySuite(PathBuf),

    /// A command string carries a `{kind:selector}` token with an
    /// unrecognized kind. Rejected at load time, never at dispatch time.
    #[error("Step '{step}' references unknown token kind in {token}")]
    UnknownTokenKind { step: String, token: String },
}

/// Failures raised while resolving cluster facts or command tokens.
///
/// Always fatal to the step that triggered them: no partial dispatch
/// is ever attempted after a resolution error.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// Cluster name absent from the registry
    #[error("Unknown cluster: {0}")]
    UnknownCluster(String),

    /// Node name absent from the cluster's inventory
    #[error("Unknown node {node} in cluster {cluster}")]
    UnknownNode { cluster: String, node: String },

    /// Service key absent from the cluster's service map
    #[error("Unknown service key {key} in cluster {cluster}")]
    UnknownService { cluster: String, key: String },

    /// A `{kind:selector}` token could not be rewritten to a literal value
    #[error("Unresolved token: {0}")]
    UnresolvedToken(String),
}

/// Failures raised while executing a single step.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// Step references a module name with no registered implementation
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// Module ran and reported failure
    #[error("Module {module} failed: {detail}")]
    ModuleFailure { module: String, detail: String },

    /// Module did not complete within the step timeout.
    /// Prior side effects are NOT rolled back.
    #[error("Module {module} timed out after {duration:?}")]
    Timeout { module: String, duration: Duration },

    /// Module rejected the shape of its opaque config payload
    #[error("Module {module} rejected config payload: {detail}")]
    ConfigSchemaMismatch { module: String, detail: String },

    /// A dispatched command exited non-zero
    #[error("Command failed with exit code {code}: {command}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// The command transport itself failed (ssh spawn, I/O)
    #[error("Failed to dispatch command to {node}")]
    Dispatch {
        node: String,
        #[source]
        source: std::io::Error,
    },

    /// Dispatch cancelled by shutdown signal
    #[error("Step interrupted by shutdown signal")]
    Interrupted,
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
