//! Worker/task compatibility records produced by the Capability Matcher.

use serde::{Deserialize, Serialize};

/// The four sub-scores, composite, confidence, and explanation the Capability
/// Matcher produces for one (worker, task) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    pub skill_match: f64,
    pub experience_relevance: f64,
    pub performance_prediction: f64,
    pub availability: f64,
    pub composite: f64,
    pub confidence: f64,
    pub reasoning: String,
    pub improvement_recommendations: Vec<String>,
}
