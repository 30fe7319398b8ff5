//! Kali Agents
//!
//! Orchestration and learning core for a team of specialized security agents.
//!
//! # Features
//!
//! - **Classification**: keyword rules map a request to a task type and priority
//! - **Planning**: per task type, ordered steps with agent, tools and estimates
//! - **Execution**: sequential steps, per-tool timeouts, partial-failure tolerance
//! - **Findings**: open ports, web vulnerabilities and interesting paths
//! - **Adaptation**: fuzzy logic, genetic optimizer and Q-learning
//! - **Patterns**: similarity index over past executions
//!
//! # Architecture
//!
//! ```text
//! request ──► Supervisor ──► ToolExecutor (agent services)
//!                │
//!                ├── RequestClassifier
//!                ├── ExecutionPlanner
//!                ├── Finding extraction
//!                ├── Adaptation (Fuzzy / Genetic / Q-learning)
//!                ├── PatternRecognizer
//!                └── AgentState (bounded performance history)
//! ```

pub mod adaptation;
pub mod agent;
pub mod config;
pub mod models;

pub use adaptation::{
    AdaptationAlgorithm, AdaptationResult, FuzzyDecisionEngine, GeneticOptimizer, PatternMatch,
    PatternRecognizer, QLearningSelector,
};
pub use agent::{
    ExecutionPlanner, ExecutionResults, OrchestratorError, RequestClassifier,
    SimulatedToolExecutor, Supervisor, SystemStatus, TaskResult, ToolError, ToolExecutor,
    ToolResult,
};
pub use config::Config;
pub use models::{
    AgentState, AgentStatus, AgentType, AlgorithmKind, ExecutionPlan, Finding, LearningContext,
    Parameters, PerformanceMetrics, Priority, Severity, Task, TaskStatus, TaskType,
};
