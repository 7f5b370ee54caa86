// -
// Suite file keys

/// Config keys whose string values are treated as command strings and
/// rewritten by the token resolver before dispatch
pub(crate) const COMMANDS_KEY: &str = "commands";
pub(crate) const CMD_KEY: &str = "cmd";

/// Per-step config keys interpreted by the executor
pub(crate) const TIMEOUT_KEY: &str = "timeout";
pub(crate) const RETRIES_KEY: &str = "retries";
pub(crate) const RETRY_INTERVAL_KEY: &str = "retry_interval";
pub(crate) const ROLE_KEY: &str = "role";

// -
// Built-in module names

/// The only module shipped with the engine: runs `config.commands`
/// against a role-selected node
pub const EXEC_MODULE: &str = "exec";

// -
// Defaults

/// Single-cluster suites target this cluster name when `clusters` is absent
pub const DEFAULT_CLUSTER_NAME: &str = "ceph";

/// Per-step timeout when the step config carries no `timeout` key
pub(crate) const DEFAULT_STEP_TIMEOUT_SECS: u64 = 1800;
