//! Experience-Based Action Selector
//!
//! Sparse Q-table with epsilon-greedy action choice and temporal-difference updates.
//! Epsilon always stays within `[MIN_EPSILON, MAX_EPSILON]`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

use super::{mean, AdaptationAlgorithm, AdaptationResult};
use crate::models::{AlgorithmKind, LearningContext, PerformanceMetrics};

pub const MIN_EPSILON: f64 = 0.01;
pub const MAX_EPSILON: f64 = 0.3;

/// Success rate below which exploration increases
const EXPLORATION_THRESHOLD: f64 = 0.6;

/// Number of recent rewards averaged in adaptation results
const REWARD_WINDOW: usize = 10;

#[derive(Debug, Clone)]
pub struct QLearningConfig {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub epsilon: f64,
    pub seed: Option<u64>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            epsilon: 0.1,
            seed: None,
        }
    }
}

pub struct QLearningSelector {
    learning_rate: f64,
    discount_factor: f64,
    epsilon: f64,
    /// state -> (action, value), actions kept in insertion order
    q_table: HashMap<String, Vec<(String, f64)>>,
    reward_history: Vec<f64>,
    rng: SmallRng,
}

impl QLearningSelector {
    pub fn new(config: QLearningConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Self {
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            epsilon: config.epsilon.clamp(MIN_EPSILON, MAX_EPSILON),
            q_table: HashMap::new(),
            reward_history: Vec::new(),
            rng,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(QLearningConfig {
            seed: Some(seed),
            ..QLearningConfig::default()
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of states with at least one entry
    pub fn table_size(&self) -> usize {
        self.q_table.len()
    }

    pub fn reward_history(&self) -> &[f64] {
        &self.reward_history
    }

    /// Stored value for a state-action pair (0.0 when unseen)
    pub fn q_value(&self, state: &str, action: &str) -> f64 {
        self.q_table
            .get(state)
            .and_then(|actions| actions.iter().find(|(a, _)| a == action))
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    fn max_value(&self, state: &str) -> f64 {
        self.q_table
            .get(state)
            .and_then(|actions| actions.iter().map(|(_, v)| *v).reduce(f64::max))
            .unwrap_or(0.0)
    }

    /// Epsilon-greedy choice among `actions`; ties go to the earliest action.
    /// Returns `None` when `actions` is empty.
    pub fn choose_action<'a>(&mut self, state: &str, actions: &'a [String]) -> Option<&'a str> {
        if actions.is_empty() {
            return None;
        }

        if self.rng.gen::<f64>() < self.epsilon {
            let idx = self.rng.gen_range(0..actions.len());
            return Some(actions[idx].as_str());
        }

        let mut best = &actions[0];
        let mut best_value = self.q_value(state, best);
        for action in &actions[1..] {
            let value = self.q_value(state, action);
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        Some(best.as_str())
    }

    /// Temporal-difference update:
    /// `Q(s,a) += lr * (reward + gamma * max_a' Q(s',a') - Q(s,a))`
    pub fn learn_from_experience(&mut self, state: &str, action: &str, reward: f64, next_state: &str) {
        let current = self.q_value(state, action);
        let max_next = self.max_value(next_state);
        let updated = current + self.learning_rate * (reward + self.discount_factor * max_next - current);

        let actions = self.q_table.entry(state.to_string()).or_default();
        match actions.iter_mut().find(|(a, _)| a == action) {
            Some(entry) => entry.1 = updated,
            None => actions.push((action.to_string(), updated)),
        }

        self.reward_history.push(reward);
    }

    fn recent_average_reward(&self) -> f64 {
        let start = self.reward_history.len().saturating_sub(REWARD_WINDOW);
        mean(&self.reward_history[start..]).unwrap_or(0.0)
    }
}

impl AdaptationAlgorithm for QLearningSelector {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::QLearning
    }

    fn adapt(&mut self, _context: &LearningContext, performance: &PerformanceMetrics) -> AdaptationResult {
        self.reward_history.push(performance.success_rate - 0.5);

        let adjusted = if performance.success_rate < EXPLORATION_THRESHOLD {
            self.epsilon * 1.1
        } else {
            self.epsilon * 0.9
        };
        self.epsilon = adjusted.clamp(MIN_EPSILON, MAX_EPSILON);

        AdaptationResult::QLearning {
            q_table_size: self.table_size(),
            epsilon: self.epsilon,
            average_reward: self.recent_average_reward(),
        }
    }

    fn evaluate_recent_performance(&self, scores: &[f64]) -> f64 {
        mean(scores).unwrap_or(0.0)
    }
}
