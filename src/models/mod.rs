//! Domain Model
//!
//! Records shared by the planner, the adaptation algorithms and the supervisor:
//! - Tasks and their status/priority taxonomy
//! - Execution plans and plan steps
//! - Agent state with bounded performance history
//! - Performance metrics and learning contexts
//! - Security findings
//!
//! Types here carry no behavior beyond invariant-preserving construction and serialization.

pub mod agent;
pub mod finding;
pub mod learning;
pub mod plan;
pub mod task;

pub use agent::{AgentCapability, AgentState, AgentStatus, AgentType, ToolSpec};
pub use finding::{Finding, Severity};
pub use learning::{AlgorithmKind, LearningContext, ParseAlgorithmError, PerformanceMetrics};
pub use plan::{ExecutionPlan, PlanStep};
pub use task::{Priority, Task, TaskError, TaskStatus, TaskType};

/// Free-form parameter mapping (string keys, arbitrary JSON values)
pub type Parameters = serde_json::Map<String, serde_json::Value>;
