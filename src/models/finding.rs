//! Security findings extracted from tool results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parse a severity label, falling back to `Info` for anything unrecognized
    pub fn parse_or_info(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured security observation.
///
/// Produced per step and accumulated into the run results; never stored on the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Finding {
    OpenPort {
        host: String,
        port: u16,
        service: String,
        severity: Severity,
    },
    WebVulnerability {
        description: String,
        reference: String,
        severity: Severity,
    },
    InterestingPath {
        path: String,
        status_code: u16,
        severity: Severity,
    },
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self {
            Self::OpenPort { severity, .. }
            | Self::WebVulnerability { severity, .. }
            | Self::InterestingPath { severity, .. } => *severity,
        }
    }

    /// Type label as it appears in serialized output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OpenPort { .. } => "open_port",
            Self::WebVulnerability { .. } => "web_vulnerability",
            Self::InterestingPath { .. } => "interesting_path",
        }
    }
}
