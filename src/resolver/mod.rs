//! Rewrites `{kind:selector}` placeholders in command strings into literal
//! values from the cluster registry.
//!
//! Resolution is pure with respect to the registry (read-only snapshots),
//! processes tokens left to right, and either fully resolves a string or
//! fails. A partially resolved command is never dispatched.

mod token;
pub use token::*;


use serde_yaml::Value;
use tracing::warn;

use crate::constants::CMD_KEY;
use crate::constants::COMMANDS_KEY;
use crate::ClusterRegistry;
use crate::ResolutionError;
use crate::Result;

/// Token resolution context: the registry plus the cluster a step entry is
/// currently executing against. Bare selectors (`node5`) resolve against the
/// current cluster; cross-cluster selectors (`ceph-pri#node5`) resolve
/// against the named one.
pub struct TokenResolver<'a> {
    registry: &'a ClusterRegistry,
    current_cluster: &'a str,
}

impl<'a> TokenResolver<'a> {
    pub fn new(
        registry: &'a ClusterRegistry,
        current_cluster: &'a str,
    ) -> Self {
        Self {
            registry,
            current_cluster,
        }
    }

    /// Rewrites every token in `command` into a literal value.
    ///
    /// Resolving an already-literal string returns it unchanged.
    pub fn resolve(
        &self,
        command: &str,
    ) -> Result<String> {
        let tokens = scan(command).map_err(|e| match e {
            TokenScanError::UnknownKind { raw } => ResolutionError::UnresolvedToken(raw),
        })?;
        if tokens.is_empty() {
            return Ok(command.to_string());
        }

        let mut resolved = String::with_capacity(command.len());
        let mut cursor = 0;
        for scanned in tokens {
            resolved.push_str(&command[cursor..scanned.start]);
            resolved.push_str(&self.resolve_token(&scanned.token)?);
            cursor = scanned.end;
        }
        resolved.push_str(&command[cursor..]);
        Ok(resolved)
    }

    /// Rewrites every recognized command string inside an opaque config
    /// payload, in place. Everything else in the payload is left
    /// byte-for-byte untouched.
    pub fn resolve_config(
        &self,
        config: &mut Value,
    ) -> Result<()> {
        visit_command_strings_mut(config, &mut |command| self.resolve(command))
    }

    fn resolve_token(
        &self,
        token: &Token,
    ) -> Result<String> {
        let cluster = token.cluster.as_deref().unwrap_or(self.current_cluster);

        let lookup = match token.kind {
            TokenKind::NodeIp => self
                .registry
                .lookup_node_ip(cluster, &token.selector)
                .map(|ip| ip.to_string()),
            TokenKind::DaemonId => self.registry.lookup_daemon_id(cluster, &token.selector),
            TokenKind::ServiceName => self.registry.lookup_service_name(cluster, &token.selector),
        };

        lookup.map_err(|e| {
            warn!("failed to resolve {}: {:?}", token.raw, e);
            ResolutionError::UnresolvedToken(token.raw.clone()).into()
        })
    }
}

/// Walks an opaque config payload and visits every string the engine treats
/// as a command: elements of a sequence under a `commands` key and scalar
/// `cmd` values, at any nesting depth.
pub(crate) fn visit_command_strings(
    value: &Value,
    visit: &mut dyn FnMut(&str),
) {
    match value {
        Value::Mapping(mapping) => {
            for (key, entry) in mapping {
                match key.as_str() {
                    Some(COMMANDS_KEY) => {
                        if let Value::Sequence(commands) = entry {
                            for command in commands {
                                if let Some(command) = command.as_str() {
                                    visit(command);
                                }
                            }
                        }
                    }
                    Some(CMD_KEY) => {
                        if let Some(command) = entry.as_str() {
                            visit(command);
                        }
                    }
                    _ => visit_command_strings(entry, visit),
                }
            }
        }
        Value::Sequence(entries) => {
            for entry in entries {
                visit_command_strings(entry, visit);
            }
        }
        _ => {}
    }
}

fn visit_command_strings_mut(
    value: &mut Value,
    rewrite: &mut dyn FnMut(&str) -> Result<String>,
) -> Result<()> {
    match value {
        Value::Mapping(mapping) => {
            for (key, entry) in mapping.iter_mut() {
                match key.as_str() {
                    Some(COMMANDS_KEY) => {
                        if let Value::Sequence(commands) = entry {
                            for command in commands.iter_mut() {
                                if let Some(literal) = command.as_str() {
                                    *command = Value::String(rewrite(literal)?);
                                }
                            }
                        }
                    }
                    Some(CMD_KEY) => {
                        if let Some(literal) = entry.as_str() {
                            *entry = Value::String(rewrite(literal)?);
                        }
                    }
                    _ => visit_command_strings_mut(entry, rewrite)?,
                }
            }
        }
        Value::Sequence(entries) => {
            for entry in entries.iter_mut() {
                visit_command_strings_mut(entry, rewrite)?;
            }
        }
        _ => {}
    }
    Ok(())
}
