use sqlx::Row;

use super::helpers::map_row_to_user;
use super::Database;
use crate::models::{CreateUser, User, UserId};
use crate::store::StoreResult;

impl Database {
    pub async fn create_user(&self, user: CreateUser) -> StoreResult<UserId> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, email, is_admin)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(UserId::new().0)
        .bind(&user.email)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserId(row.try_get("id")?))
    }

    pub async fn get_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, is_admin FROM users WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(map_row_to_user(&row)?)),
            None => Ok(None),
        }
    }
}
