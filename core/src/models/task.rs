//! Submitted work items.

use crate::models::priority::PriorityScore;
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared complexity, used by the priority and compatibility scoring formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskComplexity {
    Low,
    Medium,
    High,
    Critical,
}

/// Lifecycle state. A completed task is terminal; at most one active assignment exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    Assigned,
    InProgress,
    Review,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled)
    }
}

/// Client tier, used by the business-impact sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientTier {
    Enterprise,
    Premium,
    Standard,
    Basic,
}

impl ClientTier {
    pub fn multiplier(self) -> f64 {
        match self {
            ClientTier::Enterprise => 1.5,
            ClientTier::Premium => 1.2,
            ClientTier::Standard => 1.0,
            ClientTier::Basic => 0.8,
        }
    }
}

/// Strategic importance, used by the business-impact sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategicImportance {
    Critical,
    High,
    Medium,
    Low,
}

impl StrategicImportance {
    pub fn multiplier(self) -> f64 {
        match self {
            StrategicImportance::Critical => 2.0,
            StrategicImportance::High => 1.5,
            StrategicImportance::Medium => 1.0,
            StrategicImportance::Low => 0.5,
        }
    }
}

/// Stakeholder level, used by the business-impact sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StakeholderLevel {
    Ceo,
    Executive,
    Manager,
    Team,
}

impl StakeholderLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            StakeholderLevel::Ceo => 2.0,
            StakeholderLevel::Executive => 1.5,
            StakeholderLevel::Manager => 1.0,
            StakeholderLevel::Team => 0.8,
        }
    }
}

/// Revenue-type tag, used by the revenue-impact sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevenueType {
    Direct,
    Pipeline,
    Retention,
    Savings,
}

impl RevenueType {
    pub fn multiplier(self) -> f64 {
        match self {
            RevenueType::Direct => 2.0,
            RevenueType::Pipeline => 1.5,
            RevenueType::Retention => 1.3,
            RevenueType::Savings => 1.0,
        }
    }
}

/// The requirements bag named in the data model: everything the scoring
/// formulas and capability matcher read off a task besides its core fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TaskRequirements {
    pub required_capabilities: Vec<String>,
    pub client_tier: Option<ClientTier>,
    pub strategic_importance: Option<StrategicImportance>,
    pub stakeholder_level: Option<StakeholderLevel>,
    pub resource_needs: Vec<String>,
    pub dependency_ids: Vec<String>,
    pub blocks_ids: Vec<String>,
    pub revenue_type: Option<RevenueType>,
}

/// A stakeholder-submitted unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub task_type: String,
    pub complexity: TaskComplexity,
    pub base_priority: u8,
    pub requirements: TaskRequirements,
    pub deliverable_schema: Value,
    pub created_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub estimated_effort_hours: f64,
    pub revenue_potential: Option<Money>,
    pub project_id: Option<String>,
    pub client_id: Option<String>,
    pub status: TaskStatus,
    /// Most recent composite priority, if the task has been scored at least once.
    pub priority: Option<PriorityScore>,
    /// Number of distinct workers the task has failed on; terminal `Failed` at
    /// `Config::max_task_failures` (spec §4.7: "fails three times across different workers").
    pub failure_count: u8,
}

impl Task {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        task_type: impl Into<String>,
        complexity: TaskComplexity,
        base_priority: u8,
        requirements: TaskRequirements,
        deliverable_schema: Value,
        now: DateTime<Utc>,
        deadline: Option<DateTime<Utc>>,
        estimated_effort_hours: f64,
    ) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            task_type: task_type.into(),
            complexity,
            base_priority: base_priority.min(100),
            requirements,
            deliverable_schema,
            created_at: now,
            deadline,
            estimated_effort_hours,
            revenue_potential: None,
            project_id: None,
            client_id: None,
            status: TaskStatus::Pending,
            priority: None,
            failure_count: 0,
        }
    }

    /// Hours remaining until the deadline from `now`; `None` when there is no deadline.
    pub fn hours_to_deadline(&self, now: DateTime<Utc>) -> Option<f64> {
        self.deadline
            .map(|d| (d - now).num_seconds() as f64 / 3600.0)
    }

    /// Days this task has been waiting since submission.
    pub fn days_waiting(&self, now: DateTime<Utc>) -> f64 {
        (now - self.created_at).num_seconds() as f64 / 86_400.0
    }
}
