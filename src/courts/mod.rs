use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::CourtError;
use crate::models::{Court, CourtId, CreateCourt, ListCourtsArgs, Page, UpdateCourt};
use crate::store::CourtStore;

pub mod query;

pub type CourtResult<T> = Result<T, CourtError>;

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// The court operations, run against whichever store engine is configured.
#[derive(Clone)]
pub struct CourtService {
    store: Arc<dyn CourtStore>,
    max_page_size: u32,
}

impl CourtService {
    pub fn new(store: Arc<dyn CourtStore>, max_page_size: u32) -> Self {
        Self {
            store,
            max_page_size,
        }
    }

    pub async fn create(&self, court: CreateCourt) -> CourtResult<CourtId> {
        let name = court.name.clone();
        let id = self.store.insert_court(court, now_millis()).await?;
        info!("Created court {} ({})", id, name);
        Ok(id)
    }

    pub async fn get(&self, id: CourtId) -> CourtResult<Court> {
        self.store
            .get_court(id)
            .await?
            .ok_or_else(|| CourtError::not_found(id))
    }

    pub async fn list(&self, args: &ListCourtsArgs) -> CourtResult<Page<Court>> {
        let num_items = args.pagination_opts.num_items;
        if num_items == 0 || num_items > self.max_page_size {
            return Err(CourtError::validation(format!(
                "numItems must be between 1 and {}, got {}",
                self.max_page_size, num_items
            )));
        }

        let court_query = query::route(args);
        debug!(
            "Listing courts via {} ({} items)",
            court_query.index_name().unwrap_or("full scan"),
            num_items
        );

        let page = self
            .store
            .paginate_courts(&court_query, &args.pagination_opts)
            .await?;

        Ok(match query::cost_post_filter(args, &court_query) {
            Some(cost) => query::filter_page_by_cost(page, cost),
            None => page,
        })
    }

    pub async fn update(&self, id: CourtId, patch: UpdateCourt) -> CourtResult<CourtId> {
        let Some(existing) = self.store.get_court(id).await? else {
            warn!("Update requested for unknown court {}", id);
            return Err(CourtError::not_found(id));
        };

        let updated_at = now_millis().max(existing.updated_at + 1);
        if !self.store.patch_court(id, &patch, updated_at).await? {
            warn!("Court {} disappeared before it could be updated", id);
            return Err(CourtError::not_found(id));
        }

        info!("Updated court {}", id);
        Ok(id)
    }

    pub async fn remove(&self, id: CourtId) -> CourtResult<CourtId> {
        if self.store.get_court(id).await?.is_none() {
            warn!("Delete requested for unknown court {}", id);
            return Err(CourtError::not_found(id));
        }

        if !self.store.delete_court(id).await? {
            warn!("Court {} disappeared before it could be deleted", id);
            return Err(CourtError::not_found(id));
        }

        info!("Deleted court {}", id);
        Ok(id)
    }
}
