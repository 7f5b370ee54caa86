use thiserror::Error;

/// Placeholder kinds allowed inside command strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    NodeIp,
    DaemonId,
    ServiceName,
}

impl TokenKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "node_ip" => Some(TokenKind::NodeIp),
            "daemon_id" => Some(TokenKind::DaemonId),
            "service_name" => Some(TokenKind::ServiceName),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::NodeIp => "node_ip",
            TokenKind::DaemonId => "daemon_id",
            TokenKind::ServiceName => "service_name",
        }
    }
}

/// One `{kind:selector}` occurrence inside a command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Set for cross-cluster selectors (`ceph-pri#node5`)
    pub cluster: Option<String>,
    /// Node name or service key
    pub selector: String,
    /// Full source text including braces, e.g. `{node_ip:ceph-pri#node5}`
    pub raw: String,
}

/// A token plus its byte range within the scanned command string.
#[derive(Debug, Clone)]
pub struct ScannedToken {
    pub start: usize,
    pub end: usize,
    pub token: Token,
}

#[derive(Debug, Error)]
pub enum TokenScanError {
    /// Well-formed `{kind:selector}` group with a kind outside the allowed set
    #[error("unknown token kind in {raw}")]
    UnknownKind { raw: String },
}

fn is_kind_segment(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

/// Scans a command string for `{kind:selector}` tokens, left to right.
///
/// A brace group counts as a token attempt only when it holds exactly one
/// `:` preceded by a lowercase kind segment. Everything else (shell
/// expansions, awk bodies, JSON snippets) passes through untouched, which
/// keeps resolution idempotent on literal strings.
pub fn scan(command: &str) -> Result<Vec<ScannedToken>, TokenScanError> {
    let mut tokens = Vec::new();
    let bytes = command.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        let close = match command[i + 1..].find(['{', '}']) {
            Some(offset) if bytes[i + 1 + offset] == b'}' => i + 1 + offset,
            // Nested or unterminated brace: not a token attempt
            _ => {
                i += 1;
                continue;
            }
        };

        let inner = &command[i + 1..close];
        let mut parts = inner.splitn(2, ':');
        let kind_segment = parts.next().unwrap_or_default();
        let selector = parts.next();

        match selector {
            Some(selector) if is_kind_segment(kind_segment) && !selector.contains(':') => {
                let raw = command[i..=close].to_string();
                let kind = TokenKind::parse(kind_segment)
                    .ok_or(TokenScanError::UnknownKind { raw: raw.clone() })?;

                let (cluster, name) = match selector.split_once('#') {
                    Some((cluster, name)) => (Some(cluster.to_string()), name.to_string()),
                    None => (None, selector.to_string()),
                };

                tokens.push(ScannedToken {
                    start: i,
                    end: close + 1,
                    token: Token {
                        kind,
                        cluster,
                        selector: name,
                        raw,
                    },
                });
                i = close + 1;
            }
            _ => {
                // No single `:` or malformed kind: plain braced text
                i += 1;
            }
        }
    }

    Ok(tokens)
}
