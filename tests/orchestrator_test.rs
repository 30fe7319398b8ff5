//! Supervisor Integration Tests
//!
//! End-to-end runs through classification, planning, execution and learning
//! against the simulated agent services.

use kali_agents::agent::{StepStatus, SupervisorDecision};
use kali_agents::models::AgentState;
use kali_agents::{
    AgentType, AlgorithmKind, Config, Finding, Parameters, PerformanceMetrics, Priority,
    SimulatedToolExecutor, Supervisor, TaskStatus, TaskType,
};
use serde_json::json;
use std::sync::Arc;
use tokio_test::assert_ok;

fn params(value: serde_json::Value) -> Parameters {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Parameters::new(),
    }
}

fn supervisor_with(executor: SimulatedToolExecutor) -> (Supervisor, Arc<SimulatedToolExecutor>) {
    let executor = Arc::new(executor);
    let supervisor = Supervisor::with_config(Config::default().with_seed(11), executor.clone());
    (supervisor, executor)
}

#[tokio::test]
async fn test_penetration_test_scenario() {
    let (supervisor, _) = supervisor_with(SimulatedToolExecutor::new());

    let mut task = supervisor.classify(
        "Perform a comprehensive penetration test on demo.testfire.net",
        params(json!({"target": "demo.testfire.net"})),
    );
    assert_eq!(task.task_type, TaskType::PenetrationTest);
    assert_eq!(task.priority, Priority::High);

    supervisor.plan(&mut task).unwrap();
    let plan = task.execution_plan().unwrap();
    assert_eq!(plan.steps().len(), 4);
    assert_eq!(plan.estimated_duration(), 1800);

    let results = assert_ok!(supervisor.run_plan(&mut task).await);
    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(task.performance_metrics.success_rate, 1.0);
    assert_eq!(task.performance_metrics.accuracy, 0.9);
    assert_eq!(task.performance_metrics.confidence_score, 0.8);
    assert_eq!(task.performance_metrics.error_count, 0);
    assert!(results.errors.is_empty());
    assert_eq!(results.steps_completed.len(), 4);

    // 3 open ports, 2 paths, 1 web vulnerability
    let count = |kind: &str| results.findings.iter().filter(|f| f.kind() == kind).count();
    assert_eq!(count("open_port"), 3);
    assert_eq!(count("interesting_path"), 2);
    assert_eq!(count("web_vulnerability"), 1);
    assert!(results.findings.iter().all(|f| match f {
        Finding::OpenPort { host, .. } => host == "demo.testfire.net",
        _ => true,
    }));
}

#[tokio::test]
async fn test_network_scan_scenario() {
    let (supervisor, _) = supervisor_with(SimulatedToolExecutor::new());

    let mut task = supervisor.classify("scan 192.168.1.0/24", Parameters::new());
    assert_eq!(task.task_type, TaskType::NetworkScan);
    assert_eq!(task.priority, Priority::Medium);

    supervisor.plan(&mut task).unwrap();
    let plan = task.execution_plan().unwrap();
    assert_eq!(plan.steps().len(), 1);
    assert_eq!(plan.assigned_agents(), ["network_agent"]);
}

#[tokio::test]
async fn test_step_error_continues_plan() {
    let (supervisor, executor) = supervisor_with(SimulatedToolExecutor::new().fail_tool("sql-injection-test"));

    let result = assert_ok!(
        supervisor
            .submit_request("pentest the lab", params(json!({"target": "10.0.0.9"})))
            .await
    );

    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(result.performance_metrics.success_rate, 0.0);
    assert_eq!(result.performance_metrics.error_count, 1);
    assert_eq!(result.results.steps_completed.len(), 4);
    assert_eq!(result.results.errors.len(), 1);
    assert_eq!(result.results.errors[0].step, Some(3));
    assert_eq!(result.results.steps_completed[2].status, StepStatus::Error);
    assert_eq!(result.results.steps_completed[3].status, StepStatus::Completed);

    // the report step still ran
    assert!(executor.calls().iter().any(|t| t == "generate-report"));

    // a failed run is still learned from
    match supervisor.latest_adaptation(AlgorithmKind::GeneticAlgorithm) {
        Some(kali_agents::AdaptationResult::GeneticAlgorithm { generation, .. }) => assert_eq!(generation, 5),
        other => panic!("unexpected {:?}", other),
    }
    for agent_id in supervisor.agent_ids() {
        let agent = supervisor.agent_state(&agent_id).unwrap();
        let history: Vec<f64> = agent.performance_history().iter().map(|m| m.success_rate).collect();
        assert_eq!(history, vec![0.0]);
    }
    let matches = supervisor.recognize_patterns(&params(json!({"task_type": "penetration_test"})), 1.0);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].success_rate, 0.0);
}

#[tokio::test]
async fn test_failing_tool_ends_its_step() {
    let (supervisor, executor) = supervisor_with(SimulatedToolExecutor::new().fail_tool("port-scan"));

    let result = assert_ok!(supervisor.submit_request("pentest", Parameters::new()).await);
    let first = &result.results.steps_completed[0];

    assert_eq!(first.status, StepStatus::Error);
    assert!(first.tools_executed.is_empty());
    assert!(first.findings.is_empty());
    assert!(first.error.as_deref().unwrap().starts_with("port-scan"));
    // network-discovery shares the failed step and is skipped
    assert!(!executor.calls().iter().any(|t| t == "network-discovery"));
    assert_eq!(result.results.steps_completed.len(), 4);
}

#[tokio::test]
async fn test_fatal_error_aborts_plan() {
    let (supervisor, executor) = supervisor_with(SimulatedToolExecutor::new().fatal_tool("directory-enum"));

    let result = assert_ok!(supervisor.submit_request("pentest", Parameters::new()).await);

    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(result.results.steps_completed.len(), 1);
    assert_eq!(result.results.errors.len(), 1);
    assert_eq!(result.results.errors[0].step, None);
    assert!(result.results.errors[0].error.starts_with("Execution failed:"));
    assert!(!executor.calls().iter().any(|t| t == "vuln-scan" || t == "generate-report"));

    // web agent is released even though its step aborted
    let web = supervisor.agent_state("web_agent").unwrap();
    assert!(web.current_task.is_none());
}

#[tokio::test]
async fn test_unknown_agent_aborts_plan() {
    let roster: Vec<AgentState> = AgentState::default_roster()
        .into_iter()
        .filter(|a| a.agent_type != AgentType::Report)
        .collect();
    let supervisor = Supervisor::new(Arc::new(SimulatedToolExecutor::new())).with_agents(roster);

    let result = assert_ok!(supervisor.submit_request("pentest", Parameters::new()).await);

    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(result.results.steps_completed.len(), 3);
    assert_eq!(result.results.errors[0].error, "Execution failed: Unknown agent: report_agent");
}

#[tokio::test]
async fn test_general_assessment_runs_empty_plan() {
    let (supervisor, executor) = supervisor_with(SimulatedToolExecutor::new());

    let result = supervisor.submit_request("audit the policies", Parameters::new()).await.unwrap();

    assert_eq!(result.status, TaskStatus::Completed);
    assert!(result.results.steps_completed.is_empty());
    assert_eq!(result.performance_metrics.success_rate, 1.0);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_history_keeps_most_recent_records() {
    let (supervisor, _) = supervisor_with(SimulatedToolExecutor::new());
    let results = Default::default();

    for i in 0..55usize {
        let mut task = supervisor.classify("audit", Parameters::new());
        task.performance_metrics = PerformanceMetrics::new(i as f64, 1.0, 0.9, 0, 0.8);
        supervisor.learn(&task, &results);

        let expected = (i + 1).min(50);
        for agent_id in supervisor.agent_ids() {
            let agent = supervisor.agent_state(&agent_id).unwrap();
            assert_eq!(agent.performance_history().len(), expected);
        }
    }

    let agent = supervisor.agent_state("forensic_agent").unwrap();
    let times: Vec<f64> = agent.performance_history().iter().map(|m| m.execution_time).collect();
    let expected: Vec<f64> = (5..55).map(|i| i as f64).collect();
    assert_eq!(times, expected);
}

#[tokio::test]
async fn test_algorithm_override_routes_learning() {
    let (supervisor, _) = supervisor_with(SimulatedToolExecutor::new());

    let task = supervisor.classify_with_algorithm("web review", Parameters::new(), AlgorithmKind::QLearning);
    supervisor.submit_task(task).await.unwrap();

    assert!(supervisor.latest_adaptation(AlgorithmKind::GeneticAlgorithm).is_none());
    match supervisor.latest_adaptation(AlgorithmKind::QLearning).unwrap() {
        kali_agents::AdaptationResult::QLearning { epsilon, average_reward, .. } => {
            // success 1.0 shrinks epsilon, reward 0.5
            assert!((epsilon - 0.09).abs() < 1e-12);
            assert_eq!(average_reward, 0.5);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests() {
    let executor = SimulatedToolExecutor::new().with_latency(std::time::Duration::from_millis(5));
    let supervisor = Arc::new(Supervisor::new(Arc::new(executor)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let supervisor = supervisor.clone();
            tokio::spawn(async move {
                let request = if i % 2 == 0 { "pentest" } else { "scan" };
                supervisor
                    .submit_request(request, params(json!({"target": format!("10.0.0.{}", i)})))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let result = assert_ok!(handle.await.unwrap());
        assert_eq!(result.status, TaskStatus::Completed);
    }

    let status = supervisor.system_status().await;
    assert_eq!(status.active_tasks, 0);
    assert_eq!(status.completed_tasks, 8);
    assert_eq!(status.total_decisions, 24);
    assert!(status.agents.values().all(|s| *s == kali_agents::AgentStatus::Idle));

    for agent_id in supervisor.agent_ids() {
        assert_eq!(supervisor.agent_state(&agent_id).unwrap().performance_history().len(), 8);
    }

    let decisions: Vec<SupervisorDecision> = supervisor.decisions();
    let completed = supervisor.completed_tasks().await;
    assert!(completed.iter().all(|t| decisions.iter().any(|d| d.task_id == t.id)));
}
