//! Security Agent Supervision
//!
//! The orchestration core coordinating the specialized security agents:
//! - Request Classification (ordered keyword rules)
//! - Execution Planning (steps, agents, tools, time estimates)
//! - Tool Execution Boundary (typed tool results, recoverable vs fatal errors)
//! - Finding Extraction (open ports, web vulnerabilities, interesting paths)
//! - Supervisor (run plans, aggregate results, learn from outcomes)
//!
//! Flow: classify → plan → run → learn

pub mod classifier;
pub mod executor;
pub mod findings;
pub mod orchestrator;
pub mod planner;
pub mod simulator;

pub use classifier::{ClassificationRule, RequestClassifier};
pub use executor::{
    DiscoveredPath, HostScan, PortEntry, ToolError, ToolExecutor, ToolInvocation, ToolResult,
    VulnerabilityEntry,
};
pub use findings::extract_findings;
pub use orchestrator::{
    DecisionType, ExecutionError, ExecutionResults, LearningSummary, OrchestratorError, StepAbort,
    StepReport, StepStatus, Supervisor, SupervisorDecision, SystemStatus, TaskResult,
};
pub use planner::ExecutionPlanner;
pub use simulator::SimulatedToolExecutor;
