use crate::domain::analytics::driven_ports::TaskStatsReader;
use crate::domain::analytics::driving_ports::AnalyticsError;
use crate::domain::clock::Clock;
use crate::domain::task::{Priority, Status};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Width of the trailing window covered by [TaskTrends]
pub const TREND_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct StatusCount {
    pub status: Status,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: i64,
}

/// Count of tasks filed under a category. Uncategorized tasks share the `None` bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub category_id: Option<i32>,
    pub count: i64,
}

/// Group-by counts over one owner's tasks. Only buckets with at least one task are present.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStats {
    pub total_tasks: i64,
    pub status_stats: Vec<StatusCount>,
    pub priority_stats: Vec<PriorityCount>,
    pub category_stats: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskTrends {
    /// Creation times of tasks created in the window, ascending
    pub creation_trends: Vec<DateTime<Utc>>,
    /// Last-update times of completed tasks updated in the window, ascending
    pub completion_trends: Vec<DateTime<Utc>>,
}

pub mod driven_ports {
    use super::*;

    /// Aggregate queries over an owner's tasks. Grouped counts omit empty buckets.
    pub trait TaskStatsReader {
        async fn count_tasks(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i64, anyhow::Error>;
        async fn count_by_status(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<StatusCount>, anyhow::Error>;
        async fn count_by_priority(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<PriorityCount>, anyhow::Error>;
        async fn count_by_category(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<CategoryCount>, anyhow::Error>;
        /// Creation times at or after `since`
        async fn created_since(
            &self,
            owner_id: Uuid,
            since: DateTime<Utc>,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<DateTime<Utc>>, anyhow::Error>;
        /// Update times at or after `since` of tasks currently completed
        async fn completed_since(
            &self,
            owner_id: Uuid,
            since: DateTime<Utc>,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<DateTime<Utc>>, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum AnalyticsError {
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait AnalyticsPort {
        async fn task_stats(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            stats_read: &impl driven_ports::TaskStatsReader,
        ) -> Result<TaskStats, AnalyticsError>;
        async fn task_trends(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            stats_read: &impl driven_ports::TaskStatsReader,
        ) -> Result<TaskTrends, AnalyticsError>;
    }
}

/// Computes per-owner statistics. The trend window is anchored on the clock at call time.
pub struct AnalyticsService<C: Clock> {
    pub clock: C,
}

impl<C: Clock> driving_ports::AnalyticsPort for AnalyticsService<C> {
    async fn task_stats(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        stats_read: &impl TaskStatsReader,
    ) -> Result<TaskStats, AnalyticsError> {
        let total_tasks = stats_read
            .count_tasks(owner_id, &mut *ext_cxn)
            .await
            .context("counting tasks")?;
        let mut status_stats = stats_read
            .count_by_status(owner_id, &mut *ext_cxn)
            .await
            .context("counting tasks by status")?;
        let mut priority_stats = stats_read
            .count_by_priority(owner_id, &mut *ext_cxn)
            .await
            .context("counting tasks by priority")?;
        let mut category_stats = stats_read
            .count_by_category(owner_id, &mut *ext_cxn)
            .await
            .context("counting tasks by category")?;

        status_stats.retain(|bucket| bucket.count > 0);
        status_stats.sort_by_key(|bucket| bucket.status);
        priority_stats.retain(|bucket| bucket.count > 0);
        priority_stats.sort_by_key(|bucket| bucket.priority);
        category_stats.retain(|bucket| bucket.count > 0);
        // Uncategorized sorts after every real category
        category_stats.sort_by_key(|bucket| (bucket.category_id.is_none(), bucket.category_id));

        Ok(TaskStats {
            total_tasks,
            status_stats,
            priority_stats,
            category_stats,
        })
    }

    async fn task_trends(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        stats_read: &impl TaskStatsReader,
    ) -> Result<TaskTrends, AnalyticsError> {
        let window_start = self.clock.now() - Duration::days(TREND_WINDOW_DAYS);

        let mut creation_trends = stats_read
            .created_since(owner_id, window_start, &mut *ext_cxn)
            .await
            .context("fetching task creation trend")?;
        let mut completion_trends = stats_read
            .completed_since(owner_id, window_start, &mut *ext_cxn)
            .await
            .context("fetching task completion trend")?;
        creation_trends.sort();
        completion_trends.sort();

        Ok(TaskTrends {
            creation_trends,
            completion_trends,
        })
    }
}
