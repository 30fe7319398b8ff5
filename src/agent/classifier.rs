//! Request classification
//!
//! An ordered rule list of `(keywords, task type, priority)`. The first rule with a
//! keyword contained in the lower-cased request wins; nothing matching falls back
//! to a medium-priority general assessment.

use crate::models::{Priority, TaskType};

#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub keywords: Vec<String>,
    pub task_type: TaskType,
    pub priority: Priority,
}

impl ClassificationRule {
    pub fn new(keywords: &[&str], task_type: TaskType, priority: Priority) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            task_type,
            priority,
        }
    }

    fn matches(&self, request: &str) -> bool {
        self.keywords.iter().any(|k| request.contains(k.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct RequestClassifier {
    rules: Vec<ClassificationRule>,
    fallback: (TaskType, Priority),
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassificationRule::new(&["pentest", "penetration test"], TaskType::PenetrationTest, Priority::High),
                ClassificationRule::new(&["scan", "recon"], TaskType::NetworkScan, Priority::Medium),
                ClassificationRule::new(&["web"], TaskType::WebAssessment, Priority::Medium),
            ],
            fallback: (TaskType::GeneralAssessment, Priority::Medium),
        }
    }
}

impl RequestClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a classifier from custom rules, evaluated in order
    pub fn with_rules(rules: Vec<ClassificationRule>, fallback: (TaskType, Priority)) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn classify(&self, request: &str) -> (TaskType, Priority) {
        let request = request.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&request))
            .map(|rule| (rule.task_type.clone(), rule.priority))
            .unwrap_or_else(|| self.fallback.clone())
    }
}
