//! Extraction report assembly
//!
//! Runs the resolver over a document, then looks up the configured goal
//! fields and pulls their goal codes. A goal field that is absent becomes a
//! [`GoalReport::Missing`] entry rather than an error.

use serde::Serialize;

use crate::document::Document;
use crate::goals::{GoalCode, goal_codes};
use crate::resolver::{FieldMap, MergeDetection, RequiredKeys, TableResolver};

#[derive(Debug, Clone, Default)]
pub struct ExtractionOptions {
    /// `None` keeps every field.
    pub required_keys: Option<RequiredKeys>,
    pub goal_keys: Vec<String>,
    pub merge_detection: MergeDetection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GoalReport {
    Found { key: String, codes: Vec<GoalCode> },
    Missing { key: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub source: String,
    pub fields: FieldMap,
    pub goals: Vec<GoalReport>,
}

impl ExtractionReport {
    pub fn build(document: &Document, options: &ExtractionOptions) -> Self {
        let resolver = TableResolver::new(options.merge_detection);
        let fields = resolver.extract_docs_tables(document, options.required_keys.as_ref());
        let goals = collect_goal_reports(&fields, &options.goal_keys);

        let source = if document.metadata.file_path.is_empty() {
            document.title.clone()
        } else {
            document.metadata.file_path.clone()
        };

        Self {
            source,
            fields,
            goals,
        }
    }

    pub fn missing_goal_keys(&self) -> impl Iterator<Item = &str> {
        self.goals.iter().filter_map(|goal| match goal {
            GoalReport::Missing { key } => Some(key.as_str()),
            GoalReport::Found { .. } => None,
        })
    }
}

/// Look up each goal key verbatim in `fields`
pub fn collect_goal_reports(fields: &FieldMap, goal_keys: &[String]) -> Vec<GoalReport> {
    goal_keys
        .iter()
        .map(|key| match fields.get(key) {
            Some(value) => GoalReport::Found {
                key: key.clone(),
                codes: goal_codes(value),
            },
            None => {
                tracing::debug!(key = %key, "goal field not found in extracted tables");
                GoalReport::Missing { key: key.clone() }
            }
        })
        .collect()
}
