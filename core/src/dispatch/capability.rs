//! Capability Matcher.
//!
//! Produces a `Compatibility` record for a (worker, task) pair per §4.6.
//! Grounded on `task_distribution_engine.py CapabilityMatchingEngine`.

use crate::models::compatibility::Compatibility;
use crate::models::task::Task;
use crate::models::worker::WorkerProfile;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Static, symmetric tag-affinity clusters: tags in the same cluster are
/// "related" to each other for the purposes of `skillMatch`'s related-match
/// bucket. Mirrors the example cluster named in §4.6.
fn affinity_clusters() -> Vec<Vec<&'static str>> {
    vec![
        vec!["content", "writing", "marketing"],
        vec!["programming", "testing", "technical"],
        vec!["sales", "negotiation", "client-relations"],
        vec!["research", "analysis", "data"],
        vec!["support", "customer-service", "communication"],
    ]
}

fn related_tags(tag: &str) -> HashSet<&'static str> {
    affinity_clusters()
        .into_iter()
        .filter(|cluster| cluster.contains(&tag))
        .flatten()
        .filter(|t| *t != tag)
        .collect()
}

fn skill_match(required: &[String], worker_tags: &[String]) -> f64 {
    if required.is_empty() {
        return 0.7;
    }
    let worker_set: HashSet<&str> = worker_tags.iter().map(|s| s.as_str()).collect();
    let mut exact = 0usize;
    let mut related = 0usize;
    let mut gaps = 0usize;
    for tag in required {
        if worker_set.contains(tag.as_str()) {
            exact += 1;
        } else if related_tags(tag).iter().any(|rt| worker_set.contains(rt)) {
            related += 1;
        } else {
            gaps += 1;
        }
    }
    let n = required.len() as f64;
    let exact_coverage = exact as f64 / n;
    let related_coverage = related as f64 / n;
    let gap_ratio = gaps as f64 / n;
    exact_coverage * 1.0 + related_coverage * 0.7 + (1.0 - gap_ratio) * 0.4
}

fn experience_relevance(task: &Task, worker: &WorkerProfile, now: DateTime<Utc>) -> f64 {
    let history = &worker.experience_log;
    if history.is_empty() {
        return 0.5;
    }
    let mean_success = |pred: &dyn Fn(&crate::models::worker::ExperienceEntry) -> bool| {
        let matching: Vec<_> = history.iter().filter(|e| pred(e)).collect();
        if matching.is_empty() {
            0.5
        } else {
            matching.iter().map(|e| e.success_score).sum::<f64>() / matching.len() as f64
        }
    };

    let domain = mean_success(&|e| e.domain == task.task_type);
    let task_type = mean_success(&|e| e.task_type == task.task_type);
    let complexity = mean_success(&|e| e.complexity == task.complexity);
    let recent = mean_success(&|e| (now - e.recorded_at).num_days() < 30);

    domain * 0.4 + task_type * 0.3 + complexity * 0.2 + recent * 0.1
}

fn performance_prediction(task: &Task, worker: &WorkerProfile) -> f64 {
    let required = &task.requirements.required_capabilities;
    let mean_proficiency = if required.is_empty() {
        0.5
    } else {
        required
            .iter()
            .map(|tag| worker.proficiencies.get(tag).copied().unwrap_or(0.5))
            .sum::<f64>()
            / required.len() as f64
    };
    let proficiency_factor = 0.5 + 0.5 * mean_proficiency;
    let workload_factor = 1.0 - 0.3 * worker.utilization();
    let familiarity = if required.is_empty() {
        0.5
    } else {
        required.iter().filter(|t| worker.capability_tags.contains(t)).count() as f64 / required.len() as f64
    };
    let learning_factor = familiarity + (1.0 - familiarity) * worker.learning_efficiency;
    (worker.metrics.success_rate * proficiency_factor * workload_factor * learning_factor).clamp(0.1, 1.0)
}

fn availability(task: &Task, worker: &WorkerProfile, now: DateTime<Utc>) -> f64 {
    let capacity_remaining = worker.remaining_capacity() as f64;
    let max_capacity = worker.max_concurrent_capacity.max(1) as f64;
    let time_availability = 1.0;
    let low_capacity = worker.remaining_capacity() <= 1;
    let urgency_factor = match task.hours_to_deadline(now) {
        Some(h) if h < 4.0 && low_capacity => 0.8,
        _ => 1.0,
    };
    (capacity_remaining / max_capacity) * time_availability * urgency_factor
}

/// Score one (worker, task) pair.
pub fn score_compatibility(task: &Task, worker: &WorkerProfile, now: DateTime<Utc>) -> Compatibility {
    let skill = skill_match(&task.requirements.required_capabilities, &worker.capability_tags);
    let experience = experience_relevance(task, worker, now);
    let performance = performance_prediction(task, worker);
    let avail = availability(task, worker, now);

    let composite = 0.40 * skill + 0.25 * experience + 0.20 * performance + 0.15 * avail;

    let worker_set: HashSet<&str> = worker.capability_tags.iter().map(|s| s.as_str()).collect();
    let exact_matches = task
        .requirements
        .required_capabilities
        .iter()
        .filter(|t| worker_set.contains(t.as_str()))
        .count();
    let gaps = task
        .requirements
        .required_capabilities
        .iter()
        .filter(|t| !worker_set.contains(t.as_str()) && related_tags(t).iter().all(|rt| !worker_set.contains(rt)))
        .count();
    let relevant_history_count = worker
        .experience_log
        .iter()
        .filter(|e| e.task_type == task.task_type)
        .count();

    let confidence = (composite + 0.10 * exact_matches as f64 + (0.05 * relevant_history_count as f64).min(0.20)
        - 0.15 * gaps as f64)
        .clamp(0.2, 1.0);

    let mut recommendations = Vec::new();
    if gaps > 0 {
        recommendations.push(format!("close {} capability gap(s) via training or reassignment", gaps));
    }
    if experience < 0.4 {
        recommendations.push("assign lower-complexity tasks in this domain to build history".to_string());
    }

    Compatibility {
        skill_match: skill,
        experience_relevance: experience,
        performance_prediction: performance,
        availability: avail,
        composite,
        confidence,
        reasoning: format!(
            "skill={:.2} experience={:.2} performance={:.2} availability={:.2}",
            skill, experience, performance, avail
        ),
        improvement_recommendations: recommendations,
    }
}
