//! Simulated tool execution for demos and tests.
//!
//! Produces canned results in the shapes real agents return. Individual tools can
//! be configured to fail (recoverable) or to fail fatally.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashSet;
use std::net::IpAddr;
use std::time::Duration;

use super::executor::{
    DiscoveredPath, HostScan, PortEntry, ToolError, ToolExecutor, ToolResult, VulnerabilityEntry,
};
use crate::models::{task::DEFAULT_TARGET, Parameters};

#[derive(Debug, Default)]
pub struct SimulatedToolExecutor {
    failing: HashSet<String>,
    fatal: HashSet<String>,
    latency: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl SimulatedToolExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `tool` return a recoverable error
    pub fn fail_tool(mut self, tool: &str) -> Self {
        self.failing.insert(tool.to_string());
        self
    }

    /// Make `tool` return a fatal error
    pub fn fatal_tool(mut self, tool: &str) -> Self {
        self.fatal.insert(tool.to_string());
        self
    }

    /// Sleep this long before answering each call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Tool names in invocation order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn simulate(tool: &str, target: &str) -> ToolResult {
        let url = Some(format!("http://{}", target));

        match tool {
            "port-scan" | "nmap_scan" => ToolResult::Ports {
                hosts: vec![HostScan {
                    host: target.to_string(),
                    status: "up".to_string(),
                    ports: vec![
                        PortEntry::open(22, "ssh"),
                        PortEntry::open(80, "http"),
                        PortEntry::open(443, "https"),
                    ],
                }],
            },
            "network-discovery" | "network_discovery" => {
                let ip = target
                    .parse::<IpAddr>()
                    .map(|ip| ip.to_string())
                    .unwrap_or_else(|_| "127.0.0.1".to_string());
                ToolResult::Other(json!({
                    "status": "completed",
                    "network": format!("{}/24", ip),
                    "live_hosts": [{"ip": ip, "hostname": ip, "status": "up"}],
                    "total_hosts": 1
                }))
            }
            "directory-enum" | "gobuster_directory" => ToolResult::Paths {
                url,
                discovered_paths: vec![
                    DiscoveredPath { path: "/admin".to_string(), status_code: 200, size: 1234 },
                    DiscoveredPath { path: "/login.php".to_string(), status_code: 200, size: 567 },
                ],
            },
            "vuln-scan" | "nikto_scan" => ToolResult::Vulnerabilities {
                url,
                vulnerabilities: vec![VulnerabilityEntry {
                    id: "OSVDB-3092".to_string(),
                    msg: "Server header found".to_string(),
                    severity: Some("info".to_string()),
                }],
            },
            "sql-injection-test" | "sqlmap_test" => ToolResult::Other(json!({
                "status": "completed",
                "url": format!("http://{}/login.php", target),
                "injection_points": [],
                "vulnerable": false
            })),
            other => ToolResult::Other(json!({
                "status": "completed",
                "message": format!("Tool {} executed successfully", other)
            })),
        }
    }
}

#[async_trait]
impl ToolExecutor for SimulatedToolExecutor {
    async fn execute_tool(
        &self,
        tool: &str,
        parameters: &Parameters,
        _timeout: Duration,
    ) -> Result<ToolResult, ToolError> {
        self.calls.lock().push(tool.to_string());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.fatal.contains(tool) {
            return Err(ToolError::Fatal("simulated crash".to_string()));
        }
        if self.failing.contains(tool) {
            return Err(ToolError::Failed("simulated failure".to_string()));
        }

        let target = parameters
            .get("target")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_TARGET);
        Ok(Self::simulate(tool, target))
    }
}
