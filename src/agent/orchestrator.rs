//! Supervisor Orchestration
//!
//! The top-level coordinator for the specialized security agents:
//! - Classify a request into a task (ordered keyword rules)
//! - Build and attach an execution plan
//! - Run the plan step by step through the tool-execution boundary
//! - Learn: route performance metrics into the task's adaptation algorithm,
//!   every agent's rolling history and the pattern index
//!
//! One supervisor serves many concurrent tasks. Steps of a single task run
//! strictly in order. Agent states, algorithms and the pattern index are each
//! behind their own lock; none of these locks is held across an await.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::classifier::RequestClassifier;
use super::executor::{ToolError, ToolExecutor, ToolInvocation, ToolResult};
use super::findings::extract_findings;
use super::planner::ExecutionPlanner;
use crate::adaptation::{
    create_algorithm, AdaptationAlgorithm, AdaptationResult, PatternMatch, PatternRecognizer,
};
use crate::config::Config;
use crate::models::{
    AgentState, AgentStatus, AlgorithmKind, Finding, LearningContext, Parameters,
    PerformanceMetrics, PlanStep, Task, TaskError, TaskStatus,
};

/// Errors surfaced by the supervisor to its callers
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrchestratorError {
    #[error("No execution plan available")]
    NoExecutionPlan,

    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Fatal signal from a step: the remaining plan is abandoned
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StepAbort {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("{tool}: {source}")]
    Tool {
        tool: String,
        #[source]
        source: ToolError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Error,
}

/// Outcome of one plan step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub step: u32,
    pub name: String,
    pub agent: String,
    pub status: StepStatus,
    /// Results collected before the step ended
    pub tools_executed: Vec<ToolInvocation>,
    /// Empty for errored steps
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Seconds
    pub execution_time: f64,
}

/// An entry in the aggregate error list. `step` is `None` for plan-level errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
    pub error: String,
}

/// Aggregated results of one plan run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionResults {
    pub steps_completed: Vec<StepReport>,
    pub findings: Vec<Finding>,
    pub errors: Vec<ExecutionError>,
    /// Wall-clock seconds from plan start
    pub execution_time: f64,
}

/// Returned by [`Supervisor::submit_request`]
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub task_id: String,
    pub status: TaskStatus,
    pub results: ExecutionResults,
    pub performance_metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub supervisor_id: String,
    pub agents: BTreeMap<String, AgentStatus>,
    pub active_tasks: usize,
    pub completed_tasks: usize,
    pub learning_algorithms: Vec<String>,
    pub total_decisions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    TaskClassification,
    PlanCreation,
    Adaptation,
}

/// A recorded supervisor decision
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorDecision {
    pub decision_id: String,
    pub decision_type: DecisionType,
    pub task_id: String,
    pub reasoning: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// Flattened execution summary fed to logging and the pattern index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningSummary {
    pub task_type: String,
    pub execution_time: f64,
    pub success: bool,
    pub findings_count: usize,
    pub steps_count: usize,
}

impl LearningSummary {
    fn from_run(task: &Task, results: &ExecutionResults) -> Self {
        Self {
            task_type: task.task_type.as_str().to_string(),
            execution_time: results.execution_time,
            success: results.errors.is_empty(),
            findings_count: results.findings.len(),
            steps_count: results.steps_completed.len(),
        }
    }

    /// Feature mapping for pattern matching
    pub fn features(&self) -> Parameters {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Parameters::new(),
        }
    }
}

/// Marks an agent busy on a task for the lifetime of the guard
struct Assignment<'a> {
    agent: &'a Mutex<AgentState>,
    task_id: &'a str,
}

impl<'a> Assignment<'a> {
    fn begin(agent: &'a Mutex<AgentState>, task_id: &'a str) -> Self {
        agent.lock().assign(task_id);
        Self { agent, task_id }
    }
}

impl Drop for Assignment<'_> {
    fn drop(&mut self) {
        self.agent.lock().release(self.task_id);
    }
}

/// Running decision count plus a bounded window of the most recent records
struct DecisionLog {
    total: usize,
    recent: VecDeque<SupervisorDecision>,
    limit: usize,
}

impl DecisionLog {
    fn new(limit: usize) -> Self {
        Self {
            total: 0,
            recent: VecDeque::new(),
            limit,
        }
    }

    fn push(&mut self, decision: SupervisorDecision) {
        self.total += 1;
        self.recent.push_back(decision);
        while self.recent.len() > self.limit {
            self.recent.pop_front();
        }
    }
}

/// Security supervisor
pub struct Supervisor {
    id: String,
    config: Config,
    classifier: RequestClassifier,
    planner: ExecutionPlanner,
    executor: Arc<dyn ToolExecutor>,
    agents: BTreeMap<String, Mutex<AgentState>>,
    algorithms: BTreeMap<AlgorithmKind, Mutex<Box<dyn AdaptationAlgorithm>>>,
    insights: Mutex<BTreeMap<String, AdaptationResult>>,
    decisions: Mutex<DecisionLog>,
    patterns: Mutex<PatternRecognizer>,
    active_tasks: RwLock<HashSet<String>>,
    completed_tasks: RwLock<Vec<Task>>,
}

impl Supervisor {
    /// Create a supervisor with default configuration
    pub fn new(executor: Arc<dyn ToolExecutor>) -> Self {
        Self::with_config(Config::default(), executor)
    }

    /// Create a supervisor with custom configuration and the default agent roster
    pub fn with_config(config: Config, executor: Arc<dyn ToolExecutor>) -> Self {
        let algorithms = AlgorithmKind::ALL
            .iter()
            .map(|kind| {
                let algorithm = create_algorithm(*kind, &config.genetic, &config.q_learning);
                (*kind, Mutex::new(algorithm))
            })
            .collect();

        let supervisor = Self {
            id: config.supervisor_id.clone(),
            classifier: RequestClassifier::default(),
            planner: ExecutionPlanner::new(),
            executor,
            agents: BTreeMap::new(),
            algorithms,
            insights: Mutex::new(BTreeMap::new()),
            decisions: Mutex::new(DecisionLog::new(config.decision_log_limit)),
            patterns: Mutex::new(PatternRecognizer::new()),
            active_tasks: RwLock::new(HashSet::new()),
            completed_tasks: RwLock::new(Vec::new()),
            config,
        };

        info!("Supervisor {} initialized", supervisor.id);
        supervisor.with_agents(AgentState::default_roster())
    }

    /// Replace the agent roster
    pub fn with_agents(mut self, agents: Vec<AgentState>) -> Self {
        let limit = self.config.history_limit;
        self.agents = agents
            .into_iter()
            .map(|agent| (agent.agent_id.clone(), Mutex::new(agent.with_history_limit(limit))))
            .collect();
        self
    }

    /// Replace the classification rules
    pub fn with_classifier(mut self, classifier: RequestClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Classification and planning
    // ---------------------------------------------------------------------

    /// Classify a request into a new task training the default algorithm
    pub fn classify(&self, request: &str, parameters: Parameters) -> Task {
        self.classify_with_algorithm(request, parameters, self.config.default_algorithm)
    }

    /// Classify a request into a new task training `algorithm`
    pub fn classify_with_algorithm(&self, request: &str, parameters: Parameters, algorithm: AlgorithmKind) -> Task {
        let (task_type, priority) = self.classifier.classify(request);

        let mut merged = Parameters::new();
        merged.insert("target".to_string(), crate::models::task::DEFAULT_TARGET.into());
        merged.insert("original_request".to_string(), request.into());
        merged.extend(parameters);

        let target = merged
            .get("target")
            .and_then(|v| v.as_str())
            .unwrap_or(crate::models::task::DEFAULT_TARGET)
            .to_string();

        let task = Task::new(
            &format!("{} - {}", task_type.title(), target),
            request,
            task_type,
            priority,
            merged,
        )
        .with_learning_context(
            LearningContext::new(algorithm)
                .with_parameter("optimization_target", "efficiency_accuracy_balance"),
        );

        info!(
            task_id = %task.id,
            task_type = %task.task_type,
            priority = task.priority.as_str(),
            "Classified request"
        );
        self.record_decision(
            DecisionType::TaskClassification,
            &task.id,
            format!("Request classified as {}", task.task_type),
            self.config.baseline_confidence,
        );
        task
    }

    /// Build and attach the task's plan
    pub fn plan(&self, task: &mut Task) -> Result<(), OrchestratorError> {
        let plan = self.planner.build_plan(task);
        let reasoning = format!(
            "{} steps, estimated {}s",
            plan.steps().len(),
            plan.estimated_duration()
        );
        task.attach_plan(plan)?;

        info!(task_id = %task.id, "Execution plan attached: {}", reasoning);
        self.record_decision(DecisionType::PlanCreation, &task.id, reasoning, self.config.baseline_confidence);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Run the attached plan with the configured tool timeout
    pub async fn run_plan(&self, task: &mut Task) -> Result<ExecutionResults, OrchestratorError> {
        self.run_plan_with_timeout(task, self.config.tool_timeout).await
    }

    /// Run the attached plan, bounding every tool call by `timeout`.
    ///
    /// Without a plan the task is left untouched. Recoverable step errors are
    /// collected and the next step runs; a fatal abort stops the plan.
    pub async fn run_plan_with_timeout(
        &self,
        task: &mut Task,
        timeout: Duration,
    ) -> Result<ExecutionResults, OrchestratorError> {
        let steps = match task.execution_plan() {
            Some(plan) => plan.steps().to_vec(),
            None => return Err(OrchestratorError::NoExecutionPlan),
        };
        task.transition(TaskStatus::InProgress)?;

        let started = Instant::now();
        let mut results = ExecutionResults::default();

        for step in &steps {
            info!(task_id = %task.id, step = step.ordinal, "Executing step: {}", step.name);

            match self.execute_step(step, task, timeout).await {
                Ok(report) => {
                    results.findings.extend(report.findings.iter().cloned());
                    if let Some(error) = &report.error {
                        results.errors.push(ExecutionError {
                            step: Some(step.ordinal),
                            error: error.clone(),
                        });
                    }
                    debug!(
                        task_id = %task.id,
                        step = step.ordinal,
                        "Step completed in {:.2}s",
                        report.execution_time
                    );
                    results.steps_completed.push(report);
                }
                Err(abort) => {
                    warn!(task_id = %task.id, step = step.ordinal, "Aborting plan: {}", abort);
                    results.errors.push(ExecutionError {
                        step: None,
                        error: format!("Execution failed: {}", abort),
                    });
                    break;
                }
            }
        }

        results.execution_time = started.elapsed().as_secs_f64();
        let success = results.errors.is_empty();

        task.performance_metrics = PerformanceMetrics::new(
            results.execution_time,
            if success { 1.0 } else { 0.0 },
            self.config.baseline_accuracy,
            results.errors.len() as u32,
            self.config.baseline_confidence,
        );
        task.transition(if success { TaskStatus::Completed } else { TaskStatus::Failed })?;

        info!(
            task_id = %task.id,
            status = task.status().as_str(),
            findings = results.findings.len(),
            errors = results.errors.len(),
            "Plan finished in {:.2}s",
            results.execution_time
        );
        Ok(results)
    }

    async fn execute_step(&self, step: &PlanStep, task: &Task, timeout: Duration) -> Result<StepReport, StepAbort> {
        let agent = self
            .agents
            .get(&step.agent_id)
            .ok_or_else(|| StepAbort::UnknownAgent(step.agent_id.clone()))?;
        let _assignment = Assignment::begin(agent, &task.id);

        let started = Instant::now();
        let mut tools_executed = Vec::with_capacity(step.tool_names.len());
        let mut error = None;

        for tool in &step.tool_names {
            match self.call_tool(tool, &task.parameters, timeout).await {
                Ok(result) => tools_executed.push(ToolInvocation {
                    tool: tool.clone(),
                    result,
                }),
                Err(source) if source.is_fatal() => {
                    return Err(StepAbort::Tool { tool: tool.clone(), source });
                }
                Err(source) => {
                    warn!(task_id = %task.id, step = step.ordinal, "Tool {} failed: {}", tool, source);
                    error = Some(format!("{}: {}", tool, source));
                    break;
                }
            }
        }

        let (status, findings) = match error {
            None => (StepStatus::Completed, extract_findings(&tools_executed)),
            Some(_) => (StepStatus::Error, Vec::new()),
        };

        Ok(StepReport {
            step: step.ordinal,
            name: step.name.clone(),
            agent: step.agent_id.clone(),
            status,
            tools_executed,
            findings,
            error,
            execution_time: started.elapsed().as_secs_f64(),
        })
    }

    async fn call_tool(&self, tool: &str, parameters: &Parameters, timeout: Duration) -> Result<ToolResult, ToolError> {
        match tokio::time::timeout(timeout, self.executor.execute_tool(tool, parameters, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout(timeout)),
        }
    }

    // ---------------------------------------------------------------------
    // Learning
    // ---------------------------------------------------------------------

    /// Feed a finished run into the adaptation layer.
    ///
    /// Adapts the algorithm named by the task's learning context, appends the
    /// task metrics to every agent's history, and records the run as a pattern.
    pub fn learn(&self, task: &Task, results: &ExecutionResults) -> Option<AdaptationResult> {
        let summary = LearningSummary::from_run(task, results);
        debug!(
            task_id = %task.id,
            task_type = %summary.task_type,
            execution_time = summary.execution_time,
            success = summary.success,
            findings_count = summary.findings_count,
            steps_count = summary.steps_count,
            "Learning from execution"
        );

        let performance = task.performance_metrics;
        let adaptation = task.learning_context.as_ref().and_then(|context| {
            let algorithm = self.algorithms.get(&context.algorithm_type)?;
            let result = algorithm.lock().adapt(context, &performance);
            Some((context.algorithm_type, result))
        });

        if let Some((kind, result)) = &adaptation {
            info!(task_id = %task.id, algorithm = kind.as_str(), score = result.score(), "Adaptation applied");
            self.insights
                .lock()
                .insert(format!("{}_latest", kind.as_str()), result.clone());
            self.record_decision(
                DecisionType::Adaptation,
                &task.id,
                format!("{} adapted from task outcome", kind),
                performance.confidence_score,
            );
        }

        for agent in self.agents.values() {
            agent.lock().record_performance(performance);
        }

        self.patterns
            .lock()
            .add_pattern(&summary.task_type, summary.features(), summary.success);

        adaptation.map(|(_, result)| result)
    }

    // ---------------------------------------------------------------------
    // Request intake
    // ---------------------------------------------------------------------

    /// Classify, plan, run and learn from one request
    pub async fn submit_request(&self, request: &str, parameters: Parameters) -> Result<TaskResult, OrchestratorError> {
        let task = self.classify(request, parameters);
        self.submit_task(task).await
    }

    /// Plan, run and learn from an already classified task
    pub async fn submit_task(&self, mut task: Task) -> Result<TaskResult, OrchestratorError> {
        self.active_tasks.write().await.insert(task.id.clone());

        let outcome = self.process(&mut task).await;

        self.active_tasks.write().await.remove(&task.id);
        let task_id = task.id.clone();
        let status = task.status();
        let performance_metrics = task.performance_metrics;
        self.completed_tasks.write().await.push(task);

        let results = outcome?;
        Ok(TaskResult {
            task_id,
            status,
            results,
            performance_metrics,
        })
    }

    async fn process(&self, task: &mut Task) -> Result<ExecutionResults, OrchestratorError> {
        if task.execution_plan().is_none() {
            self.plan(task)?;
        }
        let results = self.run_plan(task).await?;
        self.learn(task, &results);
        Ok(results)
    }

    // ---------------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------------

    pub async fn system_status(&self) -> SystemStatus {
        let active_tasks = self.active_tasks.read().await.len();
        let completed_tasks = self.completed_tasks.read().await.len();

        SystemStatus {
            supervisor_id: self.id.clone(),
            agents: self
                .agents
                .iter()
                .map(|(id, agent)| (id.clone(), agent.lock().status))
                .collect(),
            active_tasks,
            completed_tasks,
            learning_algorithms: self.algorithms.keys().map(|k| k.as_str().to_string()).collect(),
            total_decisions: self.decisions.lock().total,
        }
    }

    /// Snapshot of one agent
    pub fn agent_state(&self, agent_id: &str) -> Option<AgentState> {
        self.agents.get(agent_id).map(|agent| agent.lock().clone())
    }

    pub fn agent_ids(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    /// Most recent adaptation result of `kind`
    pub fn latest_adaptation(&self, kind: AlgorithmKind) -> Option<AdaptationResult> {
        self.insights
            .lock()
            .get(&format!("{}_latest", kind.as_str()))
            .cloned()
    }

    /// Let an algorithm summarize a score series
    pub fn evaluate_recent_performance(&self, kind: AlgorithmKind, scores: &[f64]) -> Option<f64> {
        self.algorithms
            .get(&kind)
            .map(|algorithm| algorithm.lock().evaluate_recent_performance(scores))
    }

    /// Known execution patterns similar to `data`
    pub fn recognize_patterns(&self, data: &Parameters, threshold: f64) -> Vec<PatternMatch> {
        self.patterns.lock().recognize_pattern(data, threshold)
    }

    /// The most recent decisions, oldest first
    pub fn decisions(&self) -> Vec<SupervisorDecision> {
        self.decisions.lock().recent.iter().cloned().collect()
    }

    pub async fn completed_tasks(&self) -> Vec<Task> {
        self.completed_tasks.read().await.clone()
    }

    /// Ids of tasks submitted and not yet archived
    pub async fn active_task_ids(&self) -> Vec<String> {
        self.active_tasks.read().await.iter().cloned().collect()
    }

    fn record_decision(&self, decision_type: DecisionType, task_id: &str, reasoning: String, confidence: f64) {
        self.decisions.lock().push(SupervisorDecision {
            decision_id: uuid::Uuid::new_v4().to_string(),
            decision_type,
            task_id: task_id.to_string(),
            reasoning,
            confidence,
            timestamp: Utc::now(),
        });
    }
}
