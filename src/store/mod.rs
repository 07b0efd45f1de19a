//! The document-store port the court operations run against.
//!
//! [`CourtStore`] is implemented by the PostgreSQL engine in [`crate::db`] and
//! by the in-process [`MemoryStore`]. Each call is one atomic unit against
//! the engine; there is no cross-call transaction.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Cost, Court, CourtId, CourtStatus, CourtType, CreateCourt, CreateUser, CursorError, Page,
    PaginationOpts, UpdateCourt, User, UserId,
};
use crate::schema::{self, SchemaError};

pub mod memory;
pub mod text;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document rejected by schema: {0}")]
    Validation(String),

    #[error("invalid pagination cursor: {0}")]
    InvalidCursor(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<SchemaError> for StoreError {
    fn from(err: SchemaError) -> Self {
        StoreError::Validation(err.to_string())
    }
}

impl From<CursorError> for StoreError {
    fn from(err: CursorError) -> Self {
        StoreError::InvalidCursor(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Full-text lookup over court names, narrowed by equality filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub status: Option<CourtStatus>,
    pub court_type: Option<CourtType>,
    pub cost: Option<Cost>,
}

/// The closed set of read strategies `list` can hand to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourtQuery {
    Search(SearchQuery),
    ByStatus(CourtStatus),
    ByCourtType(CourtType),
    ByLocation {
        state: Option<String>,
        city: Option<String>,
    },
    FullScan,
}

impl CourtQuery {
    /// Name of the declared index (or search index) this strategy reads.
    pub fn index_name(&self) -> Option<&'static str> {
        match self {
            CourtQuery::Search(_) => Some(schema::SEARCH_COURTS_INDEX),
            CourtQuery::ByStatus(_) => Some(schema::BY_STATUS_INDEX),
            CourtQuery::ByCourtType(_) => Some(schema::BY_COURT_TYPE_INDEX),
            CourtQuery::ByLocation { .. } => Some(schema::BY_LOCATION_INDEX),
            CourtQuery::FullScan => None,
        }
    }

    /// Equality part of the strategy; text relevance is not considered.
    pub fn matches(&self, court: &Court) -> bool {
        match self {
            CourtQuery::Search(search) => {
                search.status.map_or(true, |s| court.status == s)
                    && search.court_type.map_or(true, |t| court.court_type == t)
                    && search.cost.map_or(true, |c| court.cost == c)
            }
            CourtQuery::ByStatus(status) => court.status == *status,
            CourtQuery::ByCourtType(court_type) => court.court_type == *court_type,
            CourtQuery::ByLocation { state, city } => {
                state.as_deref().map_or(true, |s| court.address_state == s)
                    && city.as_deref().map_or(true, |c| court.address_city == c)
            }
            CourtQuery::FullScan => true,
        }
    }
}

#[async_trait]
pub trait CourtStore: Send + Sync {
    async fn get_court(&self, id: CourtId) -> StoreResult<Option<Court>>;

    /// Inserts a new court stamped with `now` and returns the id the store assigned.
    async fn insert_court(&self, court: CreateCourt, now: i64) -> StoreResult<CourtId>;

    /// Applies a partial patch. Returns `false` when no record exists for `id`.
    async fn patch_court(
        &self,
        id: CourtId,
        patch: &UpdateCourt,
        updated_at: i64,
    ) -> StoreResult<bool>;

    /// Permanently deletes a court. Returns `false` when no record exists for `id`.
    async fn delete_court(&self, id: CourtId) -> StoreResult<bool>;

    async fn paginate_courts(
        &self,
        query: &CourtQuery,
        opts: &PaginationOpts,
    ) -> StoreResult<Page<Court>>;

    async fn insert_user(&self, user: CreateUser) -> StoreResult<UserId>;

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;
}
