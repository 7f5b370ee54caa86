use std::sync::Arc;

use async_trait::async_trait;
use serde_yaml::Value;

use super::run_commands;
use super::CommandDispatcher;
use super::ModuleContext;
use super::ModuleOutcome;
use super::TestModule;
use crate::constants::COMMANDS_KEY;
use crate::constants::EXEC_MODULE;
use crate::constants::ROLE_KEY;
use crate::Error;
use crate::ExecutionError;
use crate::Result;
use crate::Role;

/// Built-in `exec` capability: runs the step's `commands` list on a
/// role-selected node of the target cluster. The only module shipped with
/// the engine; everything else is registered by the embedding harness.
pub struct ExecModule {
    dispatcher: Arc<dyn CommandDispatcher>,
}

impl ExecModule {
    pub fn new(dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl TestModule for ExecModule {
    async fn execute(
        &self,
        ctx: ModuleContext,
    ) -> Result<ModuleOutcome> {
        let config = ctx
            .config
            .as_ref()
            .ok_or_else(|| schema_mismatch("config payload required"))?;

        let commands = parse_commands(config)?;
        let role = parse_role(config)?.unwrap_or(Role::Installer);

        // Prefer the requested role, fall back to the first inventory node
        let node = match ctx
            .cluster
            .first_node_with_role(role)
            .or_else(|| ctx.cluster.nodes.first())
        {
            Some(node) => node,
            None => {
                return Ok(ModuleOutcome::fail(format!(
                    "cluster {} has no nodes to execute on",
                    ctx.cluster.name
                )))
            }
        };

        let result = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => Err(ExecutionError::Interrupted.into()),
            r = run_commands(self.dispatcher.as_ref(), node, &commands) => r,
        };

        match result {
            Ok(outputs) => Ok(ModuleOutcome::pass(format!(
                "{} command(s) completed on {}",
                outputs.len(),
                node.name
            ))),
            Err(Error::Execution(e @ ExecutionError::CommandFailed { .. })) => {
                Ok(ModuleOutcome::fail(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

fn parse_commands(config: &Value) -> Result<Vec<String>> {
    let commands = config
        .get(COMMANDS_KEY)
        .and_then(Value::as_sequence)
        .ok_or_else(|| schema_mismatch("commands list required"))?;

    commands
        .iter()
        .map(|command| {
            command
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| schema_mismatch("commands entries must be strings"))
        })
        .collect()
}

fn parse_role(config: &Value) -> Result<Option<Role>> {
    match config.get(ROLE_KEY) {
        None => Ok(None),
        Some(value) => serde_yaml::from_value::<Role>(value.clone())
            .map(Some)
            .map_err(|e| schema_mismatch(format!("invalid role: {e}"))),
    }
}

fn schema_mismatch(detail: impl Into<String>) -> Error {
    ExecutionError::ConfigSchemaMismatch {
        module: EXEC_MODULE.to_string(),
        detail: detail.into(),
    }
    .into()
}
