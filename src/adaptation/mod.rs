//! Adaptation Algorithms
//!
//! Three stateful strategies that consume post-execution performance signals:
//! - **Fuzzy Decision Engine**: rule-based assignment scoring under uncertainty
//! - **Genetic Strategy Optimizer**: evolves strategy gene vectors
//! - **Experience-Based Action Selector**: epsilon-greedy Q-learning
//!
//! Plus the pattern recognizer, a similarity index over recurring operational patterns.
//!
//! Algorithms keep private state across calls; construct them once and reuse them.

mod fuzzy;
mod genetic;
mod patterns;
mod q_learning;

pub use fuzzy::{FuzzyDecision, FuzzyDecisionEngine, MembershipFn};
pub use genetic::{GeneticConfig, GeneticOptimizer, Individual};
pub use patterns::{PatternMatch, PatternRecognizer};
pub use q_learning::{QLearningConfig, QLearningSelector};

use serde::Serialize;

use crate::models::{AlgorithmKind, LearningContext, PerformanceMetrics};

/// Outcome of one `adapt` call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum AdaptationResult {
    FuzzyLogic {
        rules_updated: bool,
        confidence: f64,
    },
    GeneticAlgorithm {
        best_strategy: Vec<f64>,
        fitness: f64,
        generation: u64,
    },
    QLearning {
        q_table_size: usize,
        epsilon: f64,
        average_reward: f64,
    },
}

impl AdaptationResult {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Self::FuzzyLogic { .. } => AlgorithmKind::FuzzyLogic,
            Self::GeneticAlgorithm { .. } => AlgorithmKind::GeneticAlgorithm,
            Self::QLearning { .. } => AlgorithmKind::QLearning,
        }
    }

    /// Headline score, suitable as input to `evaluate_recent_performance`
    pub fn score(&self) -> f64 {
        match self {
            Self::FuzzyLogic { confidence, .. } => *confidence,
            Self::GeneticAlgorithm { fitness, .. } => *fitness,
            Self::QLearning { average_reward, .. } => *average_reward,
        }
    }
}

/// Shared contract of the adaptation algorithms
pub trait AdaptationAlgorithm: Send {
    fn kind(&self) -> AlgorithmKind;

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Feed one performance signal into the algorithm
    fn adapt(&mut self, context: &LearningContext, performance: &PerformanceMetrics) -> AdaptationResult;

    /// Summarize recent scores (interpretation is algorithm-specific)
    fn evaluate_recent_performance(&self, scores: &[f64]) -> f64;
}

/// Build an algorithm instance with its configuration
pub fn create_algorithm(
    kind: AlgorithmKind,
    genetic: &GeneticConfig,
    q_learning: &QLearningConfig,
) -> Box<dyn AdaptationAlgorithm> {
    match kind {
        AlgorithmKind::FuzzyLogic => Box::new(FuzzyDecisionEngine::new()),
        AlgorithmKind::GeneticAlgorithm => Box::new(GeneticOptimizer::new(genetic.clone())),
        AlgorithmKind::QLearning => Box::new(QLearningSelector::new(q_learning.clone())),
    }
}

/// Arithmetic mean, `None` on empty input
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_every_kind() {
        for kind in AlgorithmKind::ALL {
            let algo = create_algorithm(kind, &GeneticConfig::default(), &QLearningConfig::default());
            assert_eq!(algo.kind(), kind);
            assert_eq!(algo.name(), kind.as_str());
        }
    }

    #[test]
    fn test_result_serializes_with_algorithm_tag() {
        let result = AdaptationResult::QLearning { q_table_size: 0, epsilon: 0.1, average_reward: 0.5 };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["algorithm"], "q_learning");
        assert_eq!(result.score(), 0.5);
        assert_eq!(result.kind(), AlgorithmKind::QLearning);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}
