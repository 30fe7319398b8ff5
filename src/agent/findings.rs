//! Finding extraction from tool results

use crate::agent::executor::{ToolInvocation, ToolResult};
use crate::models::{Finding, Severity};

/// Turn a step's tool results into findings, preserving source order.
///
/// Open ports are always `info`; only paths answering exactly 200 are reported.
pub fn extract_findings(invocations: &[ToolInvocation]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for invocation in invocations {
        collect(&invocation.result, &mut findings);
    }
    findings
}

fn collect(result: &ToolResult, findings: &mut Vec<Finding>) {
    match result {
        ToolResult::Ports { hosts } => {
            for host in hosts {
                findings.extend(host.ports.iter().filter(|p| p.is_open()).map(|p| {
                    Finding::OpenPort {
                        host: host.host.clone(),
                        port: p.port,
                        service: p.service.clone(),
                        severity: Severity::Info,
                    }
                }));
            }
        }
        ToolResult::Vulnerabilities { vulnerabilities, .. } => {
            findings.extend(vulnerabilities.iter().map(|v| Finding::WebVulnerability {
                description: v.msg.clone(),
                reference: v.id.clone(),
                severity: v
                    .severity
                    .as_deref()
                    .map(Severity::parse_or_info)
                    .unwrap_or_default(),
            }));
        }
        ToolResult::Paths { discovered_paths, .. } => {
            findings.extend(
                discovered_paths
                    .iter()
                    .filter(|p| p.status_code == 200)
                    .map(|p| Finding::InterestingPath {
                        path: p.path.clone(),
                        status_code: p.status_code,
                        severity: Severity::Info,
                    }),
            );
        }
        ToolResult::Composite(parts) => {
            for part in parts {
                collect(part, findings);
            }
        }
        ToolResult::Other(_) => {}
    }
}
