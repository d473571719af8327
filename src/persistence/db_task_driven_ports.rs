use crate::domain::UnknownVariant;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::{Status, Task, TaskContent};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, query, query_as};
use std::str::FromStr;
use uuid::Uuid;

/// A row of the `tasks` table. Priority and status are stored as text.
#[derive(FromRow)]
pub(super) struct TaskRow {
    id: i32,
    owner_id: Uuid,
    title: String,
    description: Option<String>,
    due_date: DateTime<Utc>,
    priority: String,
    status: String,
    category_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = UnknownVariant;

    fn try_from(value: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: value.id,
            owner_id: value.owner_id,
            title: value.title,
            description: value.description,
            due_date: value.due_date,
            priority: FromStr::from_str(&value.priority)?,
            status: FromStr::from_str(&value.status)?,
            category_id: value.category_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

pub(super) fn into_tasks(rows: Vec<TaskRow>) -> Result<Vec<Task>, Error> {
    rows.into_iter()
        .map(Task::try_from)
        .collect::<Result<Vec<Task>, _>>()
        .context("decoding stored tasks")
}

fn into_task(row: Option<TaskRow>) -> Result<Option<Task>, Error> {
    row.map(Task::try_from)
        .transpose()
        .context("decoding a stored task")
}

pub struct DbTaskReader {}

impl TaskReader for DbTaskReader {
    async fn tasks_for_owner(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let rows = query_as::<_, TaskRow>(
            "SELECT * FROM tasks WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("fetching tasks for an owner")?;

        into_tasks(rows)
    }

    async fn owner_task_by_id(
        &self,
        owner_id: Uuid,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let row = query_as::<_, TaskRow>("SELECT * FROM tasks WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(task_id)
            .fetch_optional(cxn.borrow_connection())
            .await
            .context("fetching a task by ID")?;

        into_task(row)
    }

    async fn tasks_in_category(
        &self,
        owner_id: Uuid,
        category_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let rows = query_as::<_, TaskRow>(
            "SELECT * FROM tasks WHERE owner_id = $1 AND category_id = $2 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .bind(category_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("fetching the tasks in a category")?;

        into_tasks(rows)
    }
}

pub struct DbTaskWriter {}

impl TaskWriter for DbTaskWriter {
    async fn create_task(
        &self,
        owner_id: Uuid,
        content: &TaskContent,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Task, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let row = query_as::<_, TaskRow>(
            "INSERT INTO tasks(owner_id, title, description, due_date, priority, status, category_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(owner_id)
        .bind(&content.title)
        .bind(&content.description)
        .bind(content.due_date)
        .bind(content.priority.as_str())
        .bind(content.status.as_str())
        .bind(content.category_id)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("inserting a new task")?;

        Ok(Task::try_from(row)?)
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        task_id: i32,
        content: &TaskContent,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let row = query_as::<_, TaskRow>(
            "UPDATE tasks SET title = $3, description = $4, due_date = $5, priority = $6, \
             status = $7, category_id = $8, updated_at = now() \
             WHERE owner_id = $1 AND id = $2 RETURNING *",
        )
        .bind(owner_id)
        .bind(task_id)
        .bind(&content.title)
        .bind(&content.description)
        .bind(content.due_date)
        .bind(content.priority.as_str())
        .bind(content.status.as_str())
        .bind(content.category_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("replacing a task's content")?;

        into_task(row)
    }

    async fn update_task_status(
        &self,
        owner_id: Uuid,
        task_id: i32,
        status: Status,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Task>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let row = query_as::<_, TaskRow>(
            "UPDATE tasks SET status = $3, updated_at = now() \
             WHERE owner_id = $1 AND id = $2 RETURNING *",
        )
        .bind(owner_id)
        .bind(task_id)
        .bind(status.as_str())
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("changing a task's status")?;

        into_task(row)
    }

    async fn delete_task(
        &self,
        owner_id: Uuid,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query("DELETE FROM tasks WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(task_id)
            .execute(cxn.borrow_connection())
            .await
            .context("deleting a task")?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_category(
        &self,
        owner_id: Uuid,
        category_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query(
            "UPDATE tasks SET category_id = NULL, updated_at = now() \
             WHERE owner_id = $1 AND category_id = $2",
        )
        .bind(owner_id)
        .bind(category_id)
        .execute(cxn.borrow_connection())
        .await
        .context("unlinking tasks from a category")?;

        Ok(result.rows_affected())
    }
}
