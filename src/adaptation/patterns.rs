//! Pattern Recognizer
//!
//! Similarity index over recurring operational patterns. Each pattern keeps its
//! latest feature mapping, an occurrence count and a running success rate.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::Parameters;

#[derive(Debug, Clone)]
struct KnownPattern {
    data: Parameters,
    frequency: u64,
    success_rate: f64,
}

/// A pattern matching a query at or above the threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub pattern_id: String,
    pub similarity: f64,
    pub frequency: u64,
    pub success_rate: f64,
}

#[derive(Debug, Default)]
pub struct PatternRecognizer {
    patterns: HashMap<String, KnownPattern>,
}

impl PatternRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Store or update a pattern.
    ///
    /// The running success rate is `(old * (n - 1) + outcome) / n` with `n` the new count.
    pub fn add_pattern(&mut self, pattern_id: &str, data: Parameters, success: bool) {
        let outcome = if success { 1.0 } else { 0.0 };

        match self.patterns.get_mut(pattern_id) {
            Some(pattern) => {
                pattern.data = data;
                pattern.frequency += 1;
                let n = pattern.frequency as f64;
                pattern.success_rate = (pattern.success_rate * (n - 1.0) + outcome) / n;
            }
            None => {
                self.patterns.insert(
                    pattern_id.to_string(),
                    KnownPattern {
                        data,
                        frequency: 1,
                        success_rate: outcome,
                    },
                );
            }
        }
    }

    /// Occurrence count and success rate of a stored pattern
    pub fn stats(&self, pattern_id: &str) -> Option<(u64, f64)> {
        self.patterns
            .get(pattern_id)
            .map(|p| (p.frequency, p.success_rate))
    }

    /// Patterns with similarity `>= threshold`, best `similarity * success_rate` first
    pub fn recognize_pattern(&self, data: &Parameters, threshold: f64) -> Vec<PatternMatch> {
        let mut matches: Vec<PatternMatch> = self
            .patterns
            .iter()
            .filter_map(|(id, pattern)| {
                let similarity = Self::similarity(data, &pattern.data);
                (similarity >= threshold).then(|| PatternMatch {
                    pattern_id: id.clone(),
                    similarity,
                    frequency: pattern.frequency,
                    success_rate: pattern.success_rate,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            (b.similarity * b.success_rate)
                .total_cmp(&(a.similarity * a.success_rate))
                .then_with(|| a.pattern_id.cmp(&b.pattern_id))
        });
        matches
    }

    /// Mean per-key similarity over the keys present in both mappings.
    ///
    /// Strings match exactly (1.0 or 0.0); numbers (booleans as 0/1) score
    /// `max(0, 1 - |a-b| / max(|a|, |b|, 1))`. Keys whose values are not comparable
    /// are skipped. Returns 0.0 when nothing is comparable.
    pub fn similarity(a: &Parameters, b: &Parameters) -> f64 {
        let scores: Vec<f64> = a
            .iter()
            .filter_map(|(key, left)| b.get(key).and_then(|right| value_similarity(left, right)))
            .collect();

        super::mean(&scores).unwrap_or(0.0)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn value_similarity(left: &Value, right: &Value) -> Option<f64> {
    if let (Value::String(l), Value::String(r)) = (left, right) {
        return Some(if l == r { 1.0 } else { 0.0 });
    }

    let (l, r) = (as_number(left)?, as_number(right)?);
    let scale = l.abs().max(r.abs()).max(1.0);
    Some((1.0 - (l - r).abs() / scale).max(0.0))
}
