//! Fuzzy Decision Engine
//!
//! Scores agent/task assignments from task complexity and agent workload.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{mean, AdaptationAlgorithm, AdaptationResult};
use crate::models::{AlgorithmKind, LearningContext, PerformanceMetrics};

/// Triangular membership function parameters `(a, b, c)`
pub type MembershipFn = (f64, f64, f64);

/// Confidence reported alongside every decision
const DECISION_CONFIDENCE: f64 = 0.8;

/// Result of a fuzzy assignment decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuzzyDecision {
    pub assignment_score: f64,
    pub confidence: f64,
}

pub struct FuzzyDecisionEngine {
    /// variable -> term -> membership function
    linguistic_variables: BTreeMap<&'static str, BTreeMap<&'static str, MembershipFn>>,
}

impl FuzzyDecisionEngine {
    pub fn new() -> Self {
        let mut linguistic_variables = BTreeMap::new();
        linguistic_variables.insert(
            "task_complexity",
            BTreeMap::from([("low", (0.0, 0.0, 0.4)), ("medium", (0.2, 0.5, 0.8)), ("high", (0.6, 1.0, 1.0))]),
        );
        linguistic_variables.insert(
            "agent_workload",
            BTreeMap::from([("low", (0.0, 0.0, 0.3)), ("medium", (0.2, 0.5, 0.8)), ("high", (0.7, 1.0, 1.0))]),
        );
        linguistic_variables.insert(
            "assignment_score",
            BTreeMap::from([("poor", (0.0, 0.0, 0.3)), ("fair", (0.2, 0.5, 0.8)), ("excellent", (0.7, 1.0, 1.0))]),
        );

        Self { linguistic_variables }
    }

    /// Triangular membership degree of `x` for `(a, b, c)`
    pub fn triangular_membership(x: f64, (a, b, c): MembershipFn) -> f64 {
        if x <= a || x >= c {
            0.0
        } else if x <= b {
            (x - a) / (b - a)
        } else {
            (c - x) / (c - b)
        }
    }

    /// Membership degree of `x` in `term` of `variable`, if both are known
    pub fn membership(&self, variable: &str, term: &str, x: f64) -> Option<f64> {
        self.linguistic_variables
            .get(variable)
            .and_then(|terms| terms.get(term))
            .map(|params| Self::triangular_membership(x, *params))
    }

    /// Assignment score for a task complexity and agent workload (both 0..1)
    pub fn decide(&self, task_complexity: f64, agent_workload: f64) -> FuzzyDecision {
        let assignment_score = if task_complexity < 0.4 && agent_workload < 0.3 {
            0.9
        } else if task_complexity > 0.6 || agent_workload > 0.7 {
            0.2
        } else {
            0.5
        };

        FuzzyDecision {
            assignment_score,
            confidence: DECISION_CONFIDENCE,
        }
    }
}

impl Default for FuzzyDecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptationAlgorithm for FuzzyDecisionEngine {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::FuzzyLogic
    }

    fn adapt(&mut self, _context: &LearningContext, performance: &PerformanceMetrics) -> AdaptationResult {
        // Rule base is fixed; adaptation only reports the signal confidence
        AdaptationResult::FuzzyLogic {
            rules_updated: true,
            confidence: performance.confidence_score,
        }
    }

    fn evaluate_recent_performance(&self, scores: &[f64]) -> f64 {
        mean(scores).unwrap_or(0.5)
    }
}
