use super::db_task_driven_ports::{TaskRow, into_tasks};
use crate::domain::analytics::driven_ports::TaskStatsReader;
use crate::domain::analytics::{CategoryCount, PriorityCount, StatusCount};
use crate::domain::digest::driven_ports::DigestReader;
use crate::domain::task::{Status, Task};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{query_as, query_scalar};
use std::str::FromStr;
use uuid::Uuid;

/// Group-by and window queries backing the analytics endpoints
pub struct DbTaskStatsReader {}

impl TaskStatsReader for DbTaskStatsReader {
    async fn count_tasks(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i64, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let count = query_scalar::<_, i64>("SELECT count(*) FROM tasks WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(cxn.borrow_connection())
            .await
            .context("counting an owner's tasks")?;

        Ok(count)
    }

    async fn count_by_status(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<StatusCount>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let rows = query_as::<_, (String, i64)>(
            "SELECT status, count(*) FROM tasks WHERE owner_id = $1 GROUP BY status",
        )
        .bind(owner_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("counting tasks by status")?;

        rows.into_iter()
            .map(|(status, count)| -> Result<StatusCount, Error> {
                Ok(StatusCount {
                    status: Status::from_str(&status)?,
                    count,
                })
            })
            .collect()
    }

    async fn count_by_priority(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<PriorityCount>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let rows = query_as::<_, (String, i64)>(
            "SELECT priority, count(*) FROM tasks WHERE owner_id = $1 GROUP BY priority",
        )
        .bind(owner_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("counting tasks by priority")?;

        rows.into_iter()
            .map(|(priority, count)| -> Result<PriorityCount, Error> {
                Ok(PriorityCount {
                    priority: FromStr::from_str(&priority)?,
                    count,
                })
            })
            .collect()
    }

    async fn count_by_category(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<CategoryCount>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let counts = query_as::<_, (Option<i32>, i64)>(
            "SELECT category_id, count(*) FROM tasks WHERE owner_id = $1 GROUP BY category_id",
        )
        .bind(owner_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("counting tasks by category")?
        .into_iter()
        .map(|(category_id, count)| CategoryCount { category_id, count })
        .collect();

        Ok(counts)
    }

    async fn created_since(
        &self,
        owner_id: Uuid,
        since: DateTime<Utc>,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<DateTime<Utc>>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let created = query_scalar::<_, DateTime<Utc>>(
            "SELECT created_at FROM tasks WHERE owner_id = $1 AND created_at >= $2 \
             ORDER BY created_at",
        )
        .bind(owner_id)
        .bind(since)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("fetching recent task creation times")?;

        Ok(created)
    }

    async fn completed_since(
        &self,
        owner_id: Uuid,
        since: DateTime<Utc>,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<DateTime<Utc>>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let completed = query_scalar::<_, DateTime<Utc>>(
            "SELECT updated_at FROM tasks \
             WHERE owner_id = $1 AND status = $2 AND updated_at >= $3 ORDER BY updated_at",
        )
        .bind(owner_id)
        .bind(Status::Completed.as_str())
        .bind(since)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("fetching recent task completion times")?;

        Ok(completed)
    }
}

/// Due-date queries used to assemble daily digests
pub struct DbDigestReader {}

impl DigestReader for DbDigestReader {
    async fn overdue_tasks(
        &self,
        owner_id: Uuid,
        at: DateTime<Utc>,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let rows = query_as::<_, TaskRow>(
            "SELECT * FROM tasks WHERE owner_id = $1 AND due_date < $2 AND status <> $3 \
             ORDER BY due_date, id",
        )
        .bind(owner_id)
        .bind(at)
        .bind(Status::Completed.as_str())
        .fetch_all(cxn.borrow_connection())
        .await
        .context("fetching overdue tasks")?;

        into_tasks(rows)
    }

    async fn tasks_due_between(
        &self,
        owner_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let rows = query_as::<_, TaskRow>(
            "SELECT * FROM tasks \
             WHERE owner_id = $1 AND due_date >= $2 AND due_date < $3 AND status <> $4 \
             ORDER BY due_date, id",
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .bind(Status::Completed.as_str())
        .fetch_all(cxn.borrow_connection())
        .await
        .context("fetching tasks due in a window")?;

        into_tasks(rows)
    }
}
