use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::process::Command;
use tracing::debug;

use crate::ExecutionError;
use crate::NodeFacts;
use crate::Result;
use crate::SshConfig;

/// Captured result of one remote command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Transport seam for remote command execution. The engine never talks to
/// cluster nodes directly; modules and the built-in `exec` capability go
/// through this trait.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandDispatcher: Send + Sync + 'static {
    async fn dispatch(
        &self,
        node: &NodeFacts,
        command: &str,
    ) -> Result<CommandOutput>;
}

/// Dispatches commands over the system `ssh` client.
#[derive(Debug, Clone)]
pub struct SshDispatcher {
    config: SshConfig,
}

impl SshDispatcher {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CommandDispatcher for SshDispatcher {
    async fn dispatch(
        &self,
        node: &NodeFacts,
        command: &str,
    ) -> Result<CommandOutput> {
        let mut ssh = Command::new("ssh");
        ssh.arg("-p")
            .arg(self.config.port.to_string())
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.config.connect_timeout_secs))
            .arg("-o")
            .arg(if self.config.strict_host_key_checking {
                "StrictHostKeyChecking=yes"
            } else {
                "StrictHostKeyChecking=no"
            })
            .arg("-o")
            .arg("BatchMode=yes");
        if let Some(identity_file) = &self.config.identity_file {
            ssh.arg("-i").arg(identity_file);
        }
        ssh.arg(format!("{}@{}", self.config.user, node.ip)).arg(command);

        debug!("dispatching to {} ({}): {}", node.name, node.ip, command);
        let output = ssh
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ExecutionError::Dispatch {
                node: node.name.clone(),
                source: e,
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

/// Runs a command list in listed order, fail-fast: the first command that
/// exits non-zero (or fails to dispatch) aborts the remainder.
pub async fn run_commands(
    dispatcher: &dyn CommandDispatcher,
    node: &NodeFacts,
    commands: &[String],
) -> Result<Vec<CommandOutput>> {
    let mut outputs = Vec::with_capacity(commands.len());
    for command in commands {
        let output = dispatcher.dispatch(node, command).await?;
        if !output.success() {
            return Err(ExecutionError::CommandFailed {
                command: command.clone(),
                code: output.exit_code,
                stderr: output.stderr,
            }
            .into());
        }
        outputs.push(output);
    }
    Ok(outputs)
}
