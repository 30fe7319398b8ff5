//! Agent state
//!
//! One record per specialized agent, created at supervisor startup and kept for the
//! supervisor's lifetime. The performance history is bounded and trimmed FIFO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use super::learning::{AlgorithmKind, LearningContext, PerformanceMetrics};

/// Maximum number of performance records kept per agent
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Types of specialized agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Network,
    Web,
    Vulnerability,
    Forensic,
    Social,
    Report,
}

impl AgentType {
    pub const ALL: [AgentType; 6] = [
        Self::Network,
        Self::Web,
        Self::Vulnerability,
        Self::Forensic,
        Self::Social,
        Self::Report,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Web => "web",
            Self::Vulnerability => "vulnerability",
            Self::Forensic => "forensic",
            Self::Social => "social",
            Self::Report => "report",
        }
    }

    /// Conventional agent id, e.g. `network_agent`
    pub fn agent_id(&self) -> String {
        format!("{}_agent", self.as_str())
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agent status. Informational only; not enforced as a state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    Busy,
    Learning,
    Adapting,
    Error,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
            Self::Learning => "learning",
            Self::Adapting => "adapting",
            Self::Error => "error",
        }
    }
}

/// A tool an agent knows how to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Typical runtime in seconds
    pub estimated_time: f64,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str, category: &str, estimated_time: f64) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            estimated_time,
        }
    }
}

/// A capability an agent possesses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCapability {
    pub name: String,
    pub description: String,
    pub tools: Vec<ToolSpec>,
    /// 0.0 to 1.0
    pub proficiency_level: f64,
    pub specializations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentState {
    pub agent_id: String,
    pub agent_type: AgentType,
    pub status: AgentStatus,
    pub current_task: Option<String>,
    /// 0.0 to 1.0
    pub workload: f64,
    pub capabilities: Vec<AgentCapability>,
    performance_history: VecDeque<PerformanceMetrics>,
    history_limit: usize,
    /// Tasks with a step currently running on this agent, oldest first
    #[serde(skip)]
    assignments: Vec<String>,
    pub learning_state: Option<LearningContext>,
    pub last_update: DateTime<Utc>,
}

impl AgentState {
    /// Create an idle agent with a fuzzy-logic learning context
    pub fn new(agent_id: &str, agent_type: AgentType) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            agent_type,
            status: AgentStatus::Idle,
            current_task: None,
            workload: 0.0,
            capabilities: vec![],
            performance_history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            assignments: Vec::new(),
            learning_state: Some(
                LearningContext::new(AlgorithmKind::FuzzyLogic).with_parameter("proficiency", 0.7),
            ),
            last_update: Utc::now(),
        }
    }

    /// Create the network agent with its reconnaissance capability
    pub fn network(agent_id: &str) -> Self {
        let tools = vec![
            ToolSpec::new("nmap_scan", "Network port scanning and service detection", "network_reconnaissance", 30.0),
            ToolSpec::new("masscan_ports", "High-speed port scanning", "network_reconnaissance", 15.0),
            ToolSpec::new("network_discovery", "Discover live hosts on network", "network_reconnaissance", 20.0),
        ];

        let capability = AgentCapability {
            name: "network_reconnaissance".to_string(),
            description: "Network scanning and discovery capabilities".to_string(),
            tools,
            proficiency_level: 0.8,
            specializations: vec![
                "port_scanning".to_string(),
                "service_detection".to_string(),
                "network_mapping".to_string(),
            ],
        };

        let mut state = Self::new(agent_id, AgentType::Network);
        state.capabilities.push(capability);
        state.learning_state = Some(
            LearningContext::new(AlgorithmKind::FuzzyLogic)
                .with_parameter("scan_intensity", 0.7)
                .with_parameter("accuracy_threshold", 0.8),
        );
        state
    }

    /// One agent per supported type, with conventional ids
    pub fn default_roster() -> Vec<AgentState> {
        AgentType::ALL
            .iter()
            .map(|t| match t {
                AgentType::Network => Self::network(&t.agent_id()),
                other => Self::new(&other.agent_id(), *other),
            })
            .collect()
    }

    /// Override the history bound (at least 1)
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self.trim_history();
        self
    }

    /// Append a record, dropping the oldest beyond the bound
    pub fn record_performance(&mut self, metrics: PerformanceMetrics) {
        self.performance_history.push_back(metrics);
        self.trim_history();
        self.last_update = Utc::now();
    }

    /// Oldest first
    pub fn performance_history(&self) -> &VecDeque<PerformanceMetrics> {
        &self.performance_history
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Mean success rate over the retained history
    pub fn average_success_rate(&self) -> Option<f64> {
        if self.performance_history.is_empty() {
            return None;
        }
        let total: f64 = self.performance_history.iter().map(|m| m.success_rate).sum();
        Some(total / self.performance_history.len() as f64)
    }

    /// Mark busy on a task. Concurrent assignments stack.
    pub fn assign(&mut self, task_id: &str) {
        self.assignments.push(task_id.to_string());
        self.sync_assignment();
    }

    /// End one assignment of `task_id`; the agent idles once none remain
    pub fn release(&mut self, task_id: &str) {
        if let Some(pos) = self.assignments.iter().position(|t| t == task_id) {
            self.assignments.remove(pos);
        }
        self.sync_assignment();
    }

    /// Number of steps currently running on this agent
    pub fn active_assignments(&self) -> usize {
        self.assignments.len()
    }

    fn sync_assignment(&mut self) {
        self.current_task = self.assignments.last().cloned();
        self.status = if self.assignments.is_empty() {
            AgentStatus::Idle
        } else {
            AgentStatus::Busy
        };
        self.last_update = Utc::now();
    }

    fn trim_history(&mut self) {
        while self.performance_history.len() > self.history_limit {
            self.performance_history.pop_front();
        }
    }
}
