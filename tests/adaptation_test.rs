//! Adaptation Integration Tests
//!
//! Long-run invariants of the learning algorithms, the pattern index and
//! finding extraction.

use kali_agents::adaptation::{
    create_algorithm, GeneticConfig, PatternRecognizer, QLearningConfig, QLearningSelector,
};
use kali_agents::agent::{extract_findings, DiscoveredPath, HostScan, PortEntry, ToolInvocation};
use kali_agents::{
    AdaptationAlgorithm, AdaptationResult, AlgorithmKind, GeneticOptimizer, LearningContext,
    Parameters, PerformanceMetrics, ToolResult,
};
use serde_json::json;

fn metrics(success_rate: f64) -> PerformanceMetrics {
    PerformanceMetrics::new(1.0, success_rate, 0.9, 0, 0.8)
}

#[test]
fn test_genetic_population_and_gene_bounds() {
    let mut optimizer = GeneticOptimizer::new(GeneticConfig {
        population_size: 12,
        mutation_rate: 0.9,
        gene_count: 4,
        mutation_sigma: 0.8,
        seed: Some(3),
    });
    let context = LearningContext::new(AlgorithmKind::GeneticAlgorithm);

    for round in 1..=40u64 {
        let result = optimizer.adapt(&context, &metrics(1.0));
        assert_eq!(optimizer.population().len(), 12);
        assert_eq!(optimizer.generation(), round * 5);

        for individual in optimizer.population() {
            assert_eq!(individual.genes.len(), 4);
            assert!(individual.genes.iter().all(|g| (0.0..=1.0).contains(g)));
        }

        match result {
            AdaptationResult::GeneticAlgorithm { best_strategy, fitness, generation } => {
                assert_eq!(generation, round * 5);
                assert_eq!(best_strategy.len(), 4);
                assert!((0.0..=1.0).contains(&fitness));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn test_genetic_single_individual_population() {
    let mut optimizer = GeneticOptimizer::new(GeneticConfig {
        population_size: 1,
        seed: Some(1),
        ..GeneticConfig::default()
    });
    let context = LearningContext::new(AlgorithmKind::GeneticAlgorithm);

    optimizer.adapt(&context, &metrics(0.0));
    assert_eq!(optimizer.population().len(), 1);
    assert!(optimizer.best().is_some());
}

#[test]
fn test_epsilon_stays_in_bounds() {
    let mut selector = QLearningSelector::new(QLearningConfig {
        epsilon: 0.9,
        seed: Some(5),
        ..QLearningConfig::default()
    });
    assert!(selector.epsilon() <= 0.3);

    let context = LearningContext::new(AlgorithmKind::QLearning);
    let pattern = [0.0, 0.1, 0.59, 0.6, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];

    for i in 0..500 {
        // long runs of failure then success push against both bounds
        let success = if i < 100 { 0.0 } else if i < 300 { 1.0 } else { pattern[i % pattern.len()] };
        selector.adapt(&context, &metrics(success));
        assert!((0.01..=0.3).contains(&selector.epsilon()), "epsilon {}", selector.epsilon());
    }
}

#[test]
fn test_q_learning_prefers_rewarded_action() {
    let mut selector = QLearningSelector::new(QLearningConfig {
        epsilon: 0.01,
        seed: Some(9),
        ..QLearningConfig::default()
    });
    let actions = vec!["nmap_scan".to_string(), "masscan_ports".to_string()];

    for _ in 0..20 {
        selector.learn_from_experience("recon", "masscan_ports", 1.0, "done");
    }
    assert!(selector.q_value("recon", "masscan_ports") > 0.0);
    assert_eq!(selector.reward_history().len(), 20);

    let greedy = (0..50)
        .filter(|_| selector.choose_action("recon", &actions) == Some("masscan_ports"))
        .count();
    assert!(greedy >= 45);
}

#[test]
fn test_trait_objects_share_contract() {
    let context = LearningContext::new(AlgorithmKind::FuzzyLogic);
    let mut algorithms: Vec<Box<dyn AdaptationAlgorithm>> = AlgorithmKind::ALL
        .iter()
        .map(|k| create_algorithm(*k, &GeneticConfig::default(), &QLearningConfig::default()))
        .collect();

    for algorithm in algorithms.iter_mut() {
        let result = algorithm.adapt(&context, &metrics(1.0));
        assert_eq!(result.kind(), algorithm.kind());
    }

    let empty: Vec<f64> = algorithms.iter().map(|a| a.evaluate_recent_performance(&[])).collect();
    assert_eq!(empty, vec![0.5, 0.0, 0.0]);

    let scores = [0.2, 0.8];
    let evaluated: Vec<f64> = algorithms.iter().map(|a| a.evaluate_recent_performance(&scores)).collect();
    assert!((evaluated[0] - 0.5).abs() < 1e-12);
    assert_eq!(evaluated[1], 0.8);
    assert!((evaluated[2] - 0.5).abs() < 1e-12);
}

#[test]
fn test_pattern_self_similarity() {
    let samples = [
        json!({"task_type": "penetration_test", "execution_time": 12.5, "success": true}),
        json!({"findings_count": 0, "steps_count": 4}),
        json!({"host": "10.0.0.1", "ports": -3, "ratio": 0.25}),
    ];

    for sample in samples {
        let data: Parameters = sample.as_object().cloned().unwrap_or_default();
        assert_eq!(PatternRecognizer::similarity(&data, &data), 1.0);

        let mut recognizer = PatternRecognizer::new();
        recognizer.add_pattern("self", data.clone(), true);
        let matches = recognizer.recognize_pattern(&data, 1.0);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].frequency, 1);
        assert_eq!(matches[0].success_rate, 1.0);
    }
}

#[test]
fn test_three_open_ports_and_forbidden_path() {
    let ports = ToolResult::Ports {
        hosts: vec![HostScan {
            host: "192.168.1.10".to_string(),
            status: "up".to_string(),
            ports: vec![
                PortEntry::open(22, "ssh"),
                PortEntry::open(80, "http"),
                PortEntry::open(443, "https"),
            ],
        }],
    };
    let paths = ToolResult::Paths {
        url: Some("http://192.168.1.10".to_string()),
        discovered_paths: vec![DiscoveredPath {
            path: "/private".to_string(),
            status_code: 403,
            size: 10,
        }],
    };

    let findings = extract_findings(&[
        ToolInvocation { tool: "port-scan".to_string(), result: ports },
        ToolInvocation { tool: "directory-enum".to_string(), result: paths },
    ]);

    assert_eq!(findings.iter().filter(|f| f.kind() == "open_port").count(), 3);
    assert_eq!(findings.iter().filter(|f| f.kind() == "interesting_path").count(), 0);
}

#[test]
fn test_single_result_with_ports_and_paths() {
    let raw = json!({
        "hosts": {"192.168.1.10": {"status": "up", "ports": [
            {"port": 22, "service": "ssh", "state": "open"},
            {"port": 80, "service": "http", "state": "open"},
            {"port": 443, "service": "https", "state": "open"}
        ]}},
        "discovered_paths": [
            {"path": "/private", "status_code": 403},
            {"path": "/admin", "status_code": 200}
        ]
    });

    let findings = extract_findings(&[ToolInvocation {
        tool: "recon-bundle".to_string(),
        result: ToolResult::from_value(raw),
    }]);

    assert_eq!(findings.iter().filter(|f| f.kind() == "open_port").count(), 3);
    let paths: Vec<String> = findings
        .iter()
        .filter(|f| f.kind() == "interesting_path")
        .map(|f| serde_json::to_value(f).unwrap()["path"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(paths, vec!["/admin"]);
}

#[test]
fn test_findings_from_raw_tool_output() {
    let raw = json!({
        "status": "completed",
        "hosts": {
            "10.0.0.1": {"status": "up", "ports": [
                {"port": 22, "service": "ssh", "state": "open"},
                {"port": 23, "service": "telnet", "state": "closed"}
            ]},
            "10.0.0.2": {"status": "up", "ports": [
                {"port": 3306, "service": "mysql", "state": "open"}
            ]}
        }
    });

    let findings = extract_findings(&[ToolInvocation {
        tool: "nmap_scan".to_string(),
        result: ToolResult::from_value(raw),
    }]);

    let ports: Vec<String> = findings
        .iter()
        .map(|f| serde_json::to_value(f).unwrap())
        .map(|v| format!("{}:{}", v["host"].as_str().unwrap(), v["port"]))
        .collect();
    assert_eq!(ports, vec!["10.0.0.1:22", "10.0.0.2:3306"]);
}
