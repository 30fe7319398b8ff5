//! Configuration management

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::adaptation::{GeneticConfig, QLearningConfig};
use crate::models::{agent::DEFAULT_HISTORY_LIMIT, AlgorithmKind};

/// Supervisor configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Supervisor identity (`supervisor_<8 hex>` when unset)
    pub supervisor_id: String,

    /// Per tool-call timeout
    pub tool_timeout: Duration,

    /// Bound on each agent's performance history
    pub history_limit: usize,

    /// Recent supervisor decisions kept for inspection; the total is always counted
    pub decision_log_limit: usize,

    /// Accuracy reported for every run (placeholder policy)
    pub baseline_accuracy: f64,

    /// Confidence reported for every run (placeholder policy)
    pub baseline_confidence: f64,

    /// Algorithm trained by newly classified tasks
    pub default_algorithm: AlgorithmKind,

    /// Genetic optimizer settings
    pub genetic: GeneticConfig,

    /// Q-learning selector settings
    pub q_learning: QLearningConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supervisor_id: generate_supervisor_id(),
            tool_timeout: Duration::from_secs(30),
            history_limit: DEFAULT_HISTORY_LIMIT,
            decision_log_limit: 100,
            baseline_accuracy: 0.9,
            baseline_confidence: 0.8,
            default_algorithm: AlgorithmKind::GeneticAlgorithm,
            genetic: GeneticConfig::default(),
            q_learning: QLearningConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let supervisor_id = std::env::var("KALI_SUPERVISOR_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.supervisor_id);

        let tool_timeout = Duration::from_secs(env_or("KALI_TOOL_TIMEOUT_SECS", 30));

        let default_algorithm = match std::env::var("KALI_DEFAULT_ALGORITHM") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("Invalid KALI_DEFAULT_ALGORITHM: {}", v))?,
            Err(_) => defaults.default_algorithm,
        };

        let genetic = GeneticConfig {
            population_size: env_or("KALI_GA_POPULATION_SIZE", defaults.genetic.population_size),
            mutation_rate: env_or("KALI_GA_MUTATION_RATE", defaults.genetic.mutation_rate),
            gene_count: env_or("KALI_GA_GENE_COUNT", defaults.genetic.gene_count),
            ..defaults.genetic
        };

        let q_learning = QLearningConfig {
            learning_rate: env_or("KALI_QL_LEARNING_RATE", defaults.q_learning.learning_rate),
            discount_factor: env_or("KALI_QL_DISCOUNT_FACTOR", defaults.q_learning.discount_factor),
            epsilon: env_or("KALI_QL_EPSILON", defaults.q_learning.epsilon),
            ..defaults.q_learning
        };

        Ok(Self {
            supervisor_id,
            tool_timeout,
            history_limit: env_or("KALI_HISTORY_LIMIT", defaults.history_limit).max(1),
            decision_log_limit: env_or("KALI_DECISION_LOG_LIMIT", defaults.decision_log_limit),
            baseline_accuracy: env_or("KALI_BASELINE_ACCURACY", defaults.baseline_accuracy),
            baseline_confidence: env_or("KALI_BASELINE_CONFIDENCE", defaults.baseline_confidence),
            default_algorithm,
            genetic,
            q_learning,
        })
    }

    /// Fix the RNG seed of both randomized algorithms
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.genetic.seed = Some(seed);
        self.q_learning.seed = Some(seed);
        self
    }
}

/// `supervisor_` followed by the first 8 hex chars of a v4 uuid
pub fn generate_supervisor_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("supervisor_{}", &hex[..8])
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
