use crate::domain;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug, PartialEq))]
pub struct StatusStat {
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = 4)]
    pub count: i64,
}

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug, PartialEq))]
pub struct PriorityStat {
    #[schema(example = "high")]
    pub priority: String,
    #[schema(example = 2)]
    pub count: i64,
}

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug, PartialEq))]
pub struct CategoryStat {
    /// Null for tasks without a category
    #[schema(example = 3)]
    pub category_id: Option<i32>,
    #[schema(example = 1)]
    pub count: i64,
}

/// Task counts for the caller, grouped three ways
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(serde::Deserialize, Debug, PartialEq))]
pub struct TaskStatsResponse {
    #[schema(example = 7)]
    pub total_tasks: i64,
    pub status_stats: Vec<StatusStat>,
    pub priority_stats: Vec<PriorityStat>,
    pub category_stats: Vec<CategoryStat>,
}

impl From<domain::analytics::TaskStats> for TaskStatsResponse {
    fn from(value: domain::analytics::TaskStats) -> Self {
        TaskStatsResponse {
            total_tasks: value.total_tasks,
            status_stats: value
                .status_stats
                .into_iter()
                .map(|bucket| StatusStat {
                    status: bucket.status.as_str().to_owned(),
                    count: bucket.count,
                })
                .collect(),
            priority_stats: value
                .priority_stats
                .into_iter()
                .map(|bucket| PriorityStat {
                    priority: bucket.priority.as_str().to_owned(),
                    count: bucket.count,
                })
                .collect(),
            category_stats: value
                .category_stats
                .into_iter()
                .map(|bucket| CategoryStat {
                    category_id: bucket.category_id,
                    count: bucket.count,
                })
                .collect(),
        }
    }
}

/// Creation and completion timestamps over the trailing 30 days, oldest first
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(serde::Deserialize, Debug, PartialEq))]
pub struct TaskTrendsResponse {
    pub creation_trends: Vec<DateTime<Utc>>,
    pub completion_trends: Vec<DateTime<Utc>>,
}

impl From<domain::analytics::TaskTrends> for TaskTrendsResponse {
    fn from(value: domain::analytics::TaskTrends) -> Self {
        TaskTrendsResponse {
            creation_trends: value.creation_trends,
            completion_trends: value.completion_trends,
        }
    }
}
