//! Performance metrics and learning contexts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Parameters;

/// Default adaptation threshold for a learning context
pub const DEFAULT_ADAPTATION_THRESHOLD: f64 = 0.7;

/// Quantitative outcome of a task run.
///
/// Zero-valued until the run finishes. Rates and scores live in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Wall-clock seconds
    pub execution_time: f64,
    pub success_rate: f64,
    pub accuracy: f64,
    pub error_count: u32,
    pub confidence_score: f64,
}

impl PerformanceMetrics {
    /// Build metrics, clamping every field into its valid range
    pub fn new(
        execution_time: f64,
        success_rate: f64,
        accuracy: f64,
        error_count: u32,
        confidence_score: f64,
    ) -> Self {
        Self {
            execution_time: execution_time.max(0.0),
            success_rate: success_rate.clamp(0.0, 1.0),
            accuracy: accuracy.clamp(0.0, 1.0),
            error_count,
            confidence_score: confidence_score.clamp(0.0, 1.0),
        }
    }
}

/// The three adaptation algorithms a task or agent can train
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    /// Fuzzy Decision Engine
    FuzzyLogic,
    /// Genetic Strategy Optimizer
    GeneticAlgorithm,
    /// Experience-Based Action Selector
    QLearning,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 3] = [Self::FuzzyLogic, Self::GeneticAlgorithm, Self::QLearning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FuzzyLogic => "fuzzy_logic",
            Self::GeneticAlgorithm => "genetic_algorithm",
            Self::QLearning => "q_learning",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown algorithm type: {0}")]
pub struct ParseAlgorithmError(pub String);

impl FromStr for AlgorithmKind {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fuzzy_logic" | "fuzzy" => Ok(Self::FuzzyLogic),
            "genetic_algorithm" | "genetic" => Ok(Self::GeneticAlgorithm),
            "q_learning" | "qlearning" => Ok(Self::QLearning),
            other => Err(ParseAlgorithmError(other.to_string())),
        }
    }
}

/// Declares which adaptation algorithm trains on an outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningContext {
    pub algorithm_type: AlgorithmKind,
    pub parameters: Parameters,
    pub adaptation_threshold: f64,
    pub last_update: DateTime<Utc>,
}

impl LearningContext {
    pub fn new(algorithm_type: AlgorithmKind) -> Self {
        Self {
            algorithm_type,
            parameters: Parameters::new(),
            adaptation_threshold: DEFAULT_ADAPTATION_THRESHOLD,
            last_update: Utc::now(),
        }
    }

    /// Add a parameter
    pub fn with_parameter(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    /// Set the adaptation threshold (clamped to 0.0-1.0)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.adaptation_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_default_is_zero() {
        let m = PerformanceMetrics::default();
        assert_eq!(m.execution_time, 0.0);
        assert_eq!(m.success_rate, 0.0);
        assert_eq!(m.error_count, 0);
    }

    #[test]
    fn test_metrics_clamped() {
        let m = PerformanceMetrics::new(-3.0, 1.4, -0.2, 2, 7.0);
        assert_eq!(m.execution_time, 0.0);
        assert_eq!(m.success_rate, 1.0);
        assert_eq!(m.accuracy, 0.0);
        assert_eq!(m.confidence_score, 1.0);
    }

    #[test]
    fn test_algorithm_kind_parse() {
        assert_eq!("genetic_algorithm".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::GeneticAlgorithm);
        assert_eq!("Q_LEARNING".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::QLearning);
        assert!("neural_network".parse::<AlgorithmKind>().is_err());
    }

    #[test]
    fn test_algorithm_kind_serde_name() {
        let json = serde_json::to_string(&AlgorithmKind::FuzzyLogic).unwrap();
        assert_eq!(json, "\"fuzzy_logic\"");
    }

    #[test]
    fn test_learning_context_defaults() {
        let ctx = LearningContext::new(AlgorithmKind::FuzzyLogic).with_parameter("proficiency", 0.7);
        assert_eq!(ctx.adaptation_threshold, DEFAULT_ADAPTATION_THRESHOLD);
        assert_eq!(ctx.parameters["proficiency"], 0.7);
    }

    #[test]
    fn test_threshold_clamped() {
        let ctx = LearningContext::new(AlgorithmKind::QLearning).with_threshold(0.55);
        assert_eq!(ctx.adaptation_threshold, 0.55);
        assert_eq!(LearningContext::new(AlgorithmKind::QLearning).with_threshold(1.5).adaptation_threshold, 1.0);
        assert_eq!(LearningContext::new(AlgorithmKind::QLearning).with_threshold(-0.1).adaptation_threshold, 0.0);
    }
}
