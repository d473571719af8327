use crate::domain::UnknownVariant;
use crate::domain::category::driven_ports::CategoryReader;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::driving_ports::TaskError;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == value)
            .ok_or_else(|| UnknownVariant {
                kind: "priority",
                value: value.to_owned(),
            })
    }
}

/// Lifecycle state of a task. "Overdue" is deliberately not a status: it is derived from
/// the due date, see [Task::is_overdue].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: value.to_owned(),
            })
    }
}

/// A stored task, always owned by exactly one user
#[derive(PartialEq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Task {
    pub id: i32,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub status: Status,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A task is overdue once its due date has passed without it being completed
    pub fn is_overdue(&self, at: DateTime<Utc>) -> bool {
        self.status != Status::Completed && self.due_date < at
    }
}

/// The caller-controlled fields of a task, used for both creation and full replacement
#[derive(PartialEq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TaskContent {
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub status: Status,
    pub category_id: Option<i32>,
}

pub mod driven_ports {
    use super::*;

    /// Every read is filtered by the owner's ID
    pub trait TaskReader {
        /// All of an owner's tasks, newest first
        async fn tasks_for_owner(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;
        async fn owner_task_by_id(
            &self,
            owner_id: Uuid,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;
        /// The owner's tasks that reference a category, newest first
        async fn tasks_in_category(
            &self,
            owner_id: Uuid,
            category_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;
    }

    /// Every write is filtered by the owner's ID. Writes addressing a task the owner does
    /// not have report that through their return value rather than an error.
    pub trait TaskWriter {
        async fn create_task(
            &self,
            owner_id: Uuid,
            content: &TaskContent,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Task, anyhow::Error>;
        async fn update_task(
            &self,
            owner_id: Uuid,
            task_id: i32,
            content: &TaskContent,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;
        async fn update_task_status(
            &self,
            owner_id: Uuid,
            task_id: i32,
            status: Status,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Task>, anyhow::Error>;
        /// Returns false if nothing was deleted
        async fn delete_task(
            &self,
            owner_id: Uuid,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
        /// Nulls out the category reference on every one of the owner's tasks in the category.
        /// Returns how many tasks were touched.
        async fn clear_category(
            &self,
            owner_id: Uuid,
            category_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TaskError {
        #[error("Task not found")]
        NotFound,
        #[error("category_id {0} does not refer to one of your categories")]
        UnknownCategory(i32),
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait TaskPort {
        async fn create_task(
            &self,
            owner_id: Uuid,
            content: &TaskContent,
            ext_cxn: &mut impl ExternalConnectivity,
            category_read: &impl CategoryReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn tasks_for_owner(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, TaskError>;
        async fn task_by_id(
            &self,
            owner_id: Uuid,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Task, TaskError>;
        async fn update_task(
            &self,
            owner_id: Uuid,
            task_id: i32,
            content: &TaskContent,
            ext_cxn: &mut impl ExternalConnectivity,
            category_read: &impl CategoryReader,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn update_task_status(
            &self,
            owner_id: Uuid,
            task_id: i32,
            status: Status,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<Task, TaskError>;
        async fn delete_task(
            &self,
            owner_id: Uuid,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), TaskError>;
    }
}

/// Rejects content whose category belongs to someone else (or doesn't exist), so a task can
/// never point across owners
async fn verify_category_is_owned(
    owner_id: Uuid,
    content: &TaskContent,
    ext_cxn: &mut impl ExternalConnectivity,
    category_read: &impl CategoryReader,
) -> Result<(), TaskError> {
    let Some(category_id) = content.category_id else {
        return Ok(());
    };

    let category = category_read
        .owner_category_by_id(owner_id, category_id, &mut *ext_cxn)
        .await
        .context("looking up the category a task refers to")?;
    match category {
        Some(_) => Ok(()),
        None => Err(TaskError::UnknownCategory(category_id)),
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn create_task(
        &self,
        owner_id: Uuid,
        content: &TaskContent,
        ext_cxn: &mut impl ExternalConnectivity,
        category_read: &impl CategoryReader,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        verify_category_is_owned(owner_id, content, &mut *ext_cxn, category_read).await?;
        let created = task_write
            .create_task(owner_id, content, &mut *ext_cxn)
            .await
            .context("creating a task")?;

        Ok(created)
    }

    async fn tasks_for_owner(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Vec<Task>, TaskError> {
        let tasks = task_read
            .tasks_for_owner(owner_id, &mut *ext_cxn)
            .await
            .context("listing tasks")?;

        Ok(tasks)
    }

    async fn task_by_id(
        &self,
        owner_id: Uuid,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Task, TaskError> {
        task_read
            .owner_task_by_id(owner_id, task_id, &mut *ext_cxn)
            .await
            .context("fetching a task")?
            .ok_or(TaskError::NotFound)
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        task_id: i32,
        content: &TaskContent,
        ext_cxn: &mut impl ExternalConnectivity,
        category_read: &impl CategoryReader,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        verify_category_is_owned(owner_id, content, &mut *ext_cxn, category_read).await?;
        task_write
            .update_task(owner_id, task_id, content, &mut *ext_cxn)
            .await
            .context("updating a task")?
            .ok_or(TaskError::NotFound)
    }

    async fn update_task_status(
        &self,
        owner_id: Uuid,
        task_id: i32,
        status: Status,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<Task, TaskError> {
        task_write
            .update_task_status(owner_id, task_id, status, &mut *ext_cxn)
            .await
            .context("updating a task's status")?
            .ok_or(TaskError::NotFound)
    }

    async fn delete_task(
        &self,
        owner_id: Uuid,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<(), TaskError> {
        let deleted = task_write
            .delete_task(owner_id, task_id, &mut *ext_cxn)
            .await
            .context("deleting a task")?;

        if deleted {
            Ok(())
        } else {
            Err(TaskError::NotFound)
        }
    }
}
