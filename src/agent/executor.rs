//! Tool Execution Boundary
//!
//! The contract between the supervisor and the agent services that actually run
//! security tools. Results are a tagged union over the shape families the
//! supervisor understands; anything else stays opaque. A raw result carrying
//! several families keeps all of them.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::models::Parameters;

/// Error types for tool execution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolError {
    /// Recoverable; recorded as a step-level error
    #[error("{0}")]
    Failed(String),

    /// Recoverable; the call did not finish in time
    #[error("Tool timed out after {0:?}")]
    Timeout(Duration),

    /// Unrecoverable; aborts the remaining plan
    #[error("{0}")]
    Fatal(String),
}

impl ToolError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Executes named tools on behalf of an agent
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run `tool` with the task parameters. Implementations may honor `timeout`
    /// themselves; the supervisor also bounds the call.
    async fn execute_tool(
        &self,
        tool: &str,
        parameters: &Parameters,
        timeout: Duration,
    ) -> Result<ToolResult, ToolError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortEntry {
    pub port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub state: String,
}

fn default_protocol() -> String {
    "tcp".to_string()
}

impl PortEntry {
    pub fn open(port: u16, service: &str) -> Self {
        Self {
            port,
            protocol: default_protocol(),
            service: service.to_string(),
            state: "open".to_string(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == "open"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostScan {
    pub host: String,
    pub status: String,
    pub ports: Vec<PortEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub msg: String,
    /// Raw severity label as reported by the tool. Non-string labels are kept
    /// in their JSON rendering.
    #[serde(default, deserialize_with = "lenient_label")]
    pub severity: Option<String>,
}

fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(label)) => Some(label),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_label(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredPath {
    pub path: String,
    pub status_code: u16,
    #[serde(default)]
    pub size: u64,
}

/// Structured output of one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ToolResult {
    /// Per-host port map (port scanners)
    Ports { hosts: Vec<HostScan> },
    /// Vulnerability list (web scanners)
    Vulnerabilities {
        url: Option<String>,
        vulnerabilities: Vec<VulnerabilityEntry>,
    },
    /// Discovered paths (directory enumeration)
    Paths {
        url: Option<String>,
        discovered_paths: Vec<DiscoveredPath>,
    },
    /// Several families reported by one call, in `hosts`, `vulnerabilities`,
    /// `discovered_paths` order
    Composite(Vec<ToolResult>),
    /// Anything the supervisor does not interpret
    Other(Value),
}

impl ToolResult {
    /// Recognize the shape families in an untyped JSON result.
    ///
    /// Each of `hosts` (a map), `vulnerabilities` and `discovered_paths` (lists)
    /// is checked independently. Entries are parsed one by one; a malformed
    /// entry is skipped without losing its siblings.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = &value else {
            return Self::Other(value);
        };
        let url = map.get("url").and_then(Value::as_str).map(str::to_string);
        let mut families = Vec::new();

        if let Some(Value::Object(hosts)) = map.get("hosts") {
            let hosts = hosts
                .iter()
                .filter_map(|(host, info)| parse_host(host, info))
                .collect();
            families.push(Self::Ports { hosts });
        }
        if let Some(Value::Array(list)) = map.get("vulnerabilities") {
            families.push(Self::Vulnerabilities {
                url: url.clone(),
                vulnerabilities: parse_entries("vulnerabilities", list),
            });
        }
        if let Some(Value::Array(list)) = map.get("discovered_paths") {
            families.push(Self::Paths {
                url,
                discovered_paths: parse_entries("discovered_paths", list),
            });
        }

        if families.len() > 1 {
            Self::Composite(families)
        } else {
            families.pop().unwrap_or(Self::Other(value))
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

fn parse_host(host: &str, info: &Value) -> Option<HostScan> {
    let Value::Object(info) = info else {
        debug!(host, "Skipping host entry that is not an object");
        return None;
    };
    let ports = match info.get("ports") {
        Some(Value::Array(list)) => parse_entries("ports", list),
        _ => Vec::new(),
    };

    Some(HostScan {
        host: host.to_string(),
        status: host_status(info),
        ports,
    })
}

fn host_status(info: &Map<String, Value>) -> String {
    info.get("status")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

fn parse_entries<T: DeserializeOwned>(family: &str, list: &[Value]) -> Vec<T> {
    list.iter()
        .enumerate()
        .filter_map(|(index, entry)| match T::deserialize(entry) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(family, index, error = %e, "Skipping malformed entry");
                None
            }
        })
        .collect()
}

/// A tool name paired with its result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub result: ToolResult,
}
