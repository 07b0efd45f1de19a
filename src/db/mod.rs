use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::models::{
    Court, CourtId, CreateCourt, CreateUser, Page, PaginationOpts, UpdateCourt, User, UserId,
};
use crate::store::{CourtQuery, CourtStore, StoreResult};

pub mod courts;
pub mod helpers;
pub mod users;

/// PostgreSQL engine behind the [`CourtStore`] port.
#[derive(Clone)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::new_with_pool_config(database_url, 10, 1).await
    }

    pub async fn new_with_pool_config(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .min_connections(min_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the embedded migrations under `migrations/`
    pub async fn migrate(&self) -> Result<()> {
        let migrations = sqlx::migrate!("./migrations");
        tracing::info!("Found {} migrations", migrations.migrations.len());
        migrations.run(&self.pool).await?;
        tracing::info!("SQLx migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl CourtStore for Database {
    async fn get_court(&self, id: CourtId) -> StoreResult<Option<Court>> {
        self.get_court_by_id(id).await
    }

    async fn insert_court(&self, court: CreateCourt, now: i64) -> StoreResult<CourtId> {
        self.create_court(court, now).await
    }

    async fn patch_court(
        &self,
        id: CourtId,
        patch: &UpdateCourt,
        updated_at: i64,
    ) -> StoreResult<bool> {
        self.update_court(id, patch, updated_at).await
    }

    async fn delete_court(&self, id: CourtId) -> StoreResult<bool> {
        self.delete_court_by_id(id).await
    }

    async fn paginate_courts(
        &self,
        query: &CourtQuery,
        opts: &PaginationOpts,
    ) -> StoreResult<Page<Court>> {
        self.query_courts(query, opts).await
    }

    async fn insert_user(&self, user: CreateUser) -> StoreResult<UserId> {
        self.create_user(user).await
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.get_user_by_id(id).await
    }
}
