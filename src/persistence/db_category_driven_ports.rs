use crate::domain::category::driven_ports::{CategoryReader, CategoryWriter};
use crate::domain::category::{Category, CategoryContent};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, query, query_as};
use uuid::Uuid;

#[derive(FromRow)]
struct CategoryRow {
    id: i32,
    owner_id: Uuid,
    name: String,
    description: Option<String>,
    color: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(value: CategoryRow) -> Self {
        Category {
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            description: value.description,
            color: value.color,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

pub struct DbCategoryReader {}

impl CategoryReader for DbCategoryReader {
    async fn categories_for_owner(
        &self,
        owner_id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Category>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let categories = query_as::<_, CategoryRow>(
            "SELECT * FROM categories WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("fetching categories for an owner")?
        .into_iter()
        .map(Category::from)
        .collect();

        Ok(categories)
    }

    async fn owner_category_by_id(
        &self,
        owner_id: Uuid,
        category_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Category>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let category =
            query_as::<_, CategoryRow>("SELECT * FROM categories WHERE owner_id = $1 AND id = $2")
                .bind(owner_id)
                .bind(category_id)
                .fetch_optional(cxn.borrow_connection())
                .await
                .context("fetching a category by ID")?
                .map(Category::from);

        Ok(category)
    }
}

pub struct DbCategoryWriter {}

impl CategoryWriter for DbCategoryWriter {
    async fn create_category(
        &self,
        owner_id: Uuid,
        content: &CategoryContent,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Category, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let row = query_as::<_, CategoryRow>(
            "INSERT INTO categories(owner_id, name, description, color) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(owner_id)
        .bind(&content.name)
        .bind(&content.description)
        .bind(&content.color)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("inserting a new category")?;

        Ok(row.into())
    }

    async fn update_category(
        &self,
        owner_id: Uuid,
        category_id: i32,
        content: &CategoryContent,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Category>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let category = query_as::<_, CategoryRow>(
            "UPDATE categories SET name = $3, description = $4, color = $5, updated_at = now() \
             WHERE owner_id = $1 AND id = $2 RETURNING *",
        )
        .bind(owner_id)
        .bind(category_id)
        .bind(&content.name)
        .bind(&content.description)
        .bind(&content.color)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("replacing a category's content")?
        .map(Category::from);

        Ok(category)
    }

    async fn delete_category(
        &self,
        owner_id: Uuid,
        category_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query("DELETE FROM categories WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(category_id)
            .execute(cxn.borrow_connection())
            .await
            .context("deleting a category")?;

        Ok(result.rows_affected() > 0)
    }
}
