use crate::domain::category::driven_ports::{CategoryReader, CategoryWriter};
use crate::domain::category::driving_ports::CategoryError;
use crate::domain::task::Task;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

#[derive(PartialEq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Category {
    pub id: i32,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// `#RRGGBB`
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(PartialEq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct CategoryContent {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

pub mod driven_ports {
    use super::*;

    pub trait CategoryReader {
        /// All of an owner's categories, newest first
        async fn categories_for_owner(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Category>, anyhow::Error>;
        async fn owner_category_by_id(
            &self,
            owner_id: Uuid,
            category_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Category>, anyhow::Error>;
    }

    pub trait CategoryWriter {
        async fn create_category(
            &self,
            owner_id: Uuid,
            content: &CategoryContent,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Category, anyhow::Error>;
        async fn update_category(
            &self,
            owner_id: Uuid,
            category_id: i32,
            content: &CategoryContent,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Category>, anyhow::Error>;
        /// Returns false if nothing was deleted
        async fn delete_category(
            &self,
            owner_id: Uuid,
            category_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CategoryError {
        #[error("Category not found")]
        NotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait CategoryPort {
        async fn create_category(
            &self,
            owner_id: Uuid,
            content: &CategoryContent,
            ext_cxn: &mut impl ExternalConnectivity,
            category_write: &impl driven_ports::CategoryWriter,
        ) -> Result<Category, CategoryError>;
        async fn categories_for_owner(
            &self,
            owner_id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            category_read: &impl driven_ports::CategoryReader,
        ) -> Result<Vec<Category>, CategoryError>;
        async fn category_by_id(
            &self,
            owner_id: Uuid,
            category_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            category_read: &impl driven_ports::CategoryReader,
        ) -> Result<Category, CategoryError>;
        async fn update_category(
            &self,
            owner_id: Uuid,
            category_id: i32,
            content: &CategoryContent,
            ext_cxn: &mut impl ExternalConnectivity,
            category_write: &impl driven_ports::CategoryWriter,
        ) -> Result<Category, CategoryError>;
        /// Unlinks the category's tasks, then deletes the category, as one unit of work
        async fn delete_category(
            &self,
            owner_id: Uuid,
            category_id: i32,
            ext_cxn: &mut impl Transactable,
            category_read: &impl driven_ports::CategoryReader,
            category_write: &impl driven_ports::CategoryWriter,
            task_write: &impl TaskWriter,
        ) -> Result<(), CategoryError>;
        async fn tasks_for_category(
            &self,
            owner_id: Uuid,
            category_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            category_read: &impl driven_ports::CategoryReader,
            task_read: &impl TaskReader,
        ) -> Result<Vec<Task>, CategoryError>;
    }
}

pub struct CategoryService {}

impl driving_ports::CategoryPort for CategoryService {
    async fn create_category(
        &self,
        owner_id: Uuid,
        content: &CategoryContent,
        ext_cxn: &mut impl ExternalConnectivity,
        category_write: &impl CategoryWriter,
    ) -> Result<Category, CategoryError> {
        let created = category_write
            .create_category(owner_id, content, &mut *ext_cxn)
            .await
            .context("creating a category")?;

        Ok(created)
    }

    async fn categories_for_owner(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        category_read: &impl CategoryReader,
    ) -> Result<Vec<Category>, CategoryError> {
        let categories = category_read
            .categories_for_owner(owner_id, &mut *ext_cxn)
            .await
            .context("listing categories")?;

        Ok(categories)
    }

    async fn category_by_id(
        &self,
        owner_id: Uuid,
        category_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        category_read: &impl CategoryReader,
    ) -> Result<Category, CategoryError> {
        category_read
            .owner_category_by_id(owner_id, category_id, &mut *ext_cxn)
            .await
            .context("fetching a category")?
            .ok_or(CategoryError::NotFound)
    }

    async fn update_category(
        &self,
        owner_id: Uuid,
        category_id: i32,
        content: &CategoryContent,
        ext_cxn: &mut impl ExternalConnectivity,
        category_write: &impl CategoryWriter,
    ) -> Result<Category, CategoryError> {
        category_write
            .update_category(owner_id, category_id, content, &mut *ext_cxn)
            .await
            .context("updating a category")?
            .ok_or(CategoryError::NotFound)
    }

    async fn delete_category(
        &self,
        owner_id: Uuid,
        category_id: i32,
        ext_cxn: &mut impl Transactable,
        category_read: &impl CategoryReader,
        category_write: &impl CategoryWriter,
        task_write: &impl TaskWriter,
    ) -> Result<(), CategoryError> {
        let mut txn = ext_cxn
            .start_transaction()
            .await
            .context("starting the category delete transaction")?;

        let existing = category_read
            .owner_category_by_id(owner_id, category_id, &mut txn)
            .await
            .context("checking the category exists before deleting it")?;
        if existing.is_none() {
            return Err(CategoryError::NotFound);
        }

        let unlinked = task_write
            .clear_category(owner_id, category_id, &mut txn)
            .await
            .context("unlinking tasks from a category being deleted")?;

        let deleted = category_write
            .delete_category(owner_id, category_id, &mut txn)
            .await
            .context("deleting a category")?;
        if !deleted {
            return Err(CategoryError::NotFound);
        }

        txn.commit()
            .await
            .context("committing the category delete transaction")?;
        info!(category_id, unlinked, "deleted category");

        Ok(())
    }

    async fn tasks_for_category(
        &self,
        owner_id: Uuid,
        category_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        category_read: &impl CategoryReader,
        task_read: &impl TaskReader,
    ) -> Result<Vec<Task>, CategoryError> {
        let category = category_read
            .owner_category_by_id(owner_id, category_id, &mut *ext_cxn)
            .await
            .context("checking the category exists before listing its tasks")?;
        if category.is_none() {
            return Err(CategoryError::NotFound);
        }

        let tasks = task_read
            .tasks_in_category(owner_id, category_id, &mut *ext_cxn)
            .await
            .context("listing a category's tasks")?;

        Ok(tasks)
    }
}
