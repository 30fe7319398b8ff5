//! Execution plans
//!
//! A plan belongs to exactly one task. `assigned_agents` and `estimated_duration`
//! are derived from the steps at construction and cannot drift from them.

use serde::Serialize;

/// A single step in an execution plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    /// Step number (1-indexed)
    pub ordinal: u32,
    pub name: String,
    /// Agent that runs this step
    pub agent_id: String,
    /// Tools invoked in order
    pub tool_names: Vec<String>,
    /// Estimated duration in seconds
    pub estimated_duration: u64,
}

impl PlanStep {
    pub fn new(ordinal: u32, name: &str, agent_id: &str, tools: &[&str], estimated_duration: u64) -> Self {
        Self {
            ordinal,
            name: name.to_string(),
            agent_id: agent_id.to_string(),
            tool_names: tools.iter().map(|t| t.to_string()).collect(),
            estimated_duration,
        }
    }
}

/// Ordered plan of steps for one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    task_id: String,
    steps: Vec<PlanStep>,
    assigned_agents: Vec<String>,
    estimated_duration: u64,
}

impl ExecutionPlan {
    /// Create a plan, deriving the agent list and the total duration from the steps
    pub fn new(task_id: &str, steps: Vec<PlanStep>) -> Self {
        let assigned_agents = steps.iter().map(|s| s.agent_id.clone()).collect();
        let estimated_duration = steps.iter().map(|s| s.estimated_duration).sum();

        Self {
            task_id: task_id.to_string(),
            steps,
            assigned_agents,
            estimated_duration,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// One entry per step, duplicates allowed
    pub fn assigned_agents(&self) -> &[String] {
        &self.assigned_agents
    }

    /// Sum of step estimates, in seconds
    pub fn estimated_duration(&self) -> u64 {
        self.estimated_duration
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Format plan for display
    pub fn format(&self) -> String {
        let mut s = format!("Plan for task {}\n", self.task_id);
        for step in &self.steps {
            s.push_str(&format!(
                "{}. {} [{}] tools: {} (~{}s)\n",
                step.ordinal,
                step.name,
                step.agent_id,
                step.tool_names.join(", "),
                step.estimated_duration
            ));
        }
        s.push_str(&format!("Estimated duration: {}s\n", self.estimated_duration));
        s
    }
}
