//! Execution Planner
//!
//! Maps a classified task to an ordered plan of agent steps:
//! - Penetration test: recon → web → vulnerability analysis → report
//! - Network scan: single discovery step
//! - Web assessment: recon → vulnerability scanning
//!
//! Unknown task types get an empty plan, which is valid and executes nothing.

use tracing::debug;

use crate::models::{AgentType, ExecutionPlan, PlanStep, Task, TaskType};

/// Stateless planner; the plan is a pure function of the task type
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionPlanner;

impl ExecutionPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Build the plan for `task`
    pub fn build_plan(&self, task: &Task) -> ExecutionPlan {
        let steps = Self::steps_for(&task.task_type);
        let plan = ExecutionPlan::new(&task.id, steps);

        debug!(
            task_id = %task.id,
            task_type = %task.task_type,
            steps = plan.steps().len(),
            estimated_duration = plan.estimated_duration(),
            "Built execution plan"
        );
        plan
    }

    fn steps_for(task_type: &TaskType) -> Vec<PlanStep> {
        let network = AgentType::Network.agent_id();
        let web = AgentType::Web.agent_id();

        match task_type {
            TaskType::PenetrationTest => vec![
                PlanStep::new(1, "Network Reconnaissance", &network, &["port-scan", "network-discovery"], 300),
                PlanStep::new(2, "Web Assessment", &web, &["directory-enum", "vuln-scan"], 600),
                PlanStep::new(
                    3,
                    "Vulnerability Analysis",
                    &AgentType::Vulnerability.agent_id(),
                    &["sql-injection-test"],
                    720,
                ),
                PlanStep::new(4, "Report Generation", &AgentType::Report.agent_id(), &["generate-report"], 180),
            ],
            TaskType::NetworkScan => vec![PlanStep::new(
                1,
                "Network Discovery",
                &network,
                &["network-discovery", "port-scan"],
                240,
            )],
            TaskType::WebAssessment => vec![
                PlanStep::new(1, "Web Reconnaissance", &web, &["directory-enum", "tech-detection"], 360),
                PlanStep::new(2, "Vulnerability Scanning", &web, &["vuln-scan", "sql-injection-test"], 600),
            ],
            TaskType::GeneralAssessment | TaskType::Other(_) => Vec::new(),
        }
    }
}
