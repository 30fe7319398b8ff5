//! Tasks and their lifecycle
//!
//! # State Machine
//! ```text
//! Pending -> InProgress -> Completed
//!                      \-> Failed
//! ```
//! `Assigned`, `Cancelled` and `RequiresAdaptation` exist in the taxonomy but are
//! not reached by the supervisor's execution path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::learning::{AlgorithmKind, LearningContext, PerformanceMetrics};
use super::plan::ExecutionPlan;
use super::Parameters;

/// Target used when a request does not name one
pub const DEFAULT_TARGET: &str = "localhost";

/// Errors raised by task mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("Invalid task transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("Task {0} already has an execution plan")]
    PlanAlreadyAttached(String),

    #[error("Plan belongs to task {plan_task}, not {task}")]
    PlanTaskMismatch { task: String, plan_task: String },
}

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    RequiresAdaptation,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::RequiresAdaptation => "requires_adaptation",
        }
    }

    /// Completed, Failed or Cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Check whether moving to `next` is allowed
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Assigned)
                | (Pending, InProgress)
                | (Pending, Cancelled)
                | (Assigned, InProgress)
                | (Assigned, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (InProgress, Cancelled)
                | (InProgress, RequiresAdaptation)
                | (RequiresAdaptation, InProgress)
                | (RequiresAdaptation, Failed)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority (ordinal values match the external taxonomy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Low = 1,
    Medium = 3,
    High = 7,
    Critical = 10,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::Low),
            3 => Ok(Self::Medium),
            7 => Ok(Self::High),
            10 => Ok(Self::Critical),
            other => Err(format!("invalid priority value: {}", other)),
        }
    }
}

/// Classified kind of work
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TaskType {
    PenetrationTest,
    NetworkScan,
    WebAssessment,
    GeneralAssessment,
    /// Any other task type (planned as an empty plan)
    Other(String),
}

impl TaskType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PenetrationTest => "penetration_test",
            Self::NetworkScan => "network_scan",
            Self::WebAssessment => "web_assessment",
            Self::GeneralAssessment => "general_assessment",
            Self::Other(s) => s,
        }
    }

    /// Human-readable title, e.g. "Penetration Test"
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<String> for TaskType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "penetration_test" => Self::PenetrationTest,
            "network_scan" => Self::NetworkScan,
            "web_assessment" => Self::WebAssessment,
            "general_assessment" => Self::GeneralAssessment,
            _ => Self::Other(s),
        }
    }
}

impl From<TaskType> for String {
    fn from(t: TaskType) -> String {
        t.as_str().to_string()
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of orchestrated work
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub task_type: TaskType,
    status: TaskStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Always contains `target`
    pub parameters: Parameters,
    execution_plan: Option<ExecutionPlan>,
    pub performance_metrics: PerformanceMetrics,
    pub learning_context: Option<LearningContext>,
}

impl Task {
    /// Create a pending task. A missing `target` parameter defaults to `localhost`.
    pub fn new(name: &str, description: &str, task_type: TaskType, priority: Priority, mut parameters: Parameters) -> Self {
        if !parameters.contains_key("target") {
            parameters.insert("target".to_string(), DEFAULT_TARGET.into());
        }

        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            task_type,
            status: TaskStatus::Pending,
            priority,
            created_at: now,
            updated_at: now,
            parameters,
            execution_plan: None,
            performance_metrics: PerformanceMetrics::default(),
            learning_context: None,
        }
    }

    /// Create a penetration testing task
    pub fn pentest(target: &str, scope: &str) -> Self {
        let mut parameters = Parameters::new();
        parameters.insert("target".to_string(), target.into());
        parameters.insert("scope".to_string(), scope.into());
        parameters.insert("methodology".to_string(), "OWASP".into());
        parameters.insert(
            "compliance_requirements".to_string(),
            serde_json::json!(["PCI-DSS", "ISO27001"]),
        );

        Self::new(
            &format!("Penetration Test - {}", target),
            &format!("Comprehensive security assessment of {}", target),
            TaskType::PenetrationTest,
            Priority::High,
            parameters,
        )
        .with_learning_context(
            LearningContext::new(AlgorithmKind::GeneticAlgorithm)
                .with_parameter("population_size", 50)
                .with_parameter("mutation_rate", 0.1),
        )
    }

    pub fn with_learning_context(mut self, context: LearningContext) -> Self {
        self.learning_context = Some(context);
        self
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn execution_plan(&self) -> Option<&ExecutionPlan> {
        self.execution_plan.as_ref()
    }

    /// Target parameter as a string
    pub fn target(&self) -> &str {
        self.parameters
            .get("target")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_TARGET)
    }

    /// Attach the plan. A task's plan is immutable once attached.
    pub fn attach_plan(&mut self, plan: ExecutionPlan) -> Result<(), TaskError> {
        if self.execution_plan.is_some() {
            return Err(TaskError::PlanAlreadyAttached(self.id.clone()));
        }
        if plan.task_id() != self.id {
            return Err(TaskError::PlanTaskMismatch {
                task: self.id.clone(),
                plan_task: plan.task_id().to_string(),
            });
        }
        self.execution_plan = Some(plan);
        self.touch();
        Ok(())
    }

    /// Move to `next`, enforcing the state machine
    pub fn transition(&mut self, next: TaskStatus) -> Result<(), TaskError> {
        if !self.status.can_transition_to(next) {
            return Err(TaskError::InvalidTransition { from: self.status, to: next });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
