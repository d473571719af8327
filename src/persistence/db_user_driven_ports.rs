use crate::domain::user::User;
use crate::domain::user::driven_ports::{UserReader, UserWriter};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{FromRow, query, query_as};
use uuid::Uuid;

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        User {
            id: value.id,
            email: value.email,
        }
    }
}

pub struct DbUserReader {}

impl UserReader for DbUserReader {
    async fn all_users(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<User>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let users = query_as::<_, UserRow>("SELECT id, email FROM users ORDER BY created_at, id")
            .fetch_all(cxn.borrow_connection())
            .await
            .context("fetching every known user")?
            .into_iter()
            .map(User::from)
            .collect();

        Ok(users)
    }
}

pub struct DbUserWriter {}

impl UserWriter for DbUserWriter {
    async fn mirror_user(
        &self,
        user: &User,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query("INSERT INTO users(id, email) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(user.id)
            .bind(&user.email)
            .execute(cxn.borrow_connection())
            .await
            .context("mirroring a user record")?;

        Ok(result.rows_affected() > 0)
    }
}
