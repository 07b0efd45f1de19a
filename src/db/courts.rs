use sqlx::{Postgres, QueryBuilder};

use super::helpers::{apply_page_limit, map_row_to_court, COURT_FIELDS, TS_CONFIG};
use crate::db::Database;
use crate::models::{Court, CourtId, CreateCourt, CursorPosition, Page, PaginationOpts, UpdateCourt};
use crate::store::{text, CourtQuery, SearchQuery, StoreError, StoreResult};

impl Database {
    /// Inserts a new court and returns the id assigned to it
    pub async fn create_court(&self, court: CreateCourt, now: i64) -> StoreResult<CourtId> {
        let court = Court::from_new(CourtId::new(), court, now);

        sqlx::query(
            r#"
            INSERT INTO courts (id, name, address_street, address_city, address_state, address_zip,
                                num_courts, court_type, cost, cost_notes, admin_notes, status,
                                submitted_by, last_verified_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(court.id.0)
        .bind(&court.name)
        .bind(&court.address_street)
        .bind(&court.address_city)
        .bind(&court.address_state)
        .bind(&court.address_zip)
        .bind(i64::from(court.num_courts))
        .bind(court.court_type.as_str())
        .bind(court.cost.as_str())
        .bind(&court.cost_notes)
        .bind(&court.admin_notes)
        .bind(court.status.as_str())
        .bind(court.submitted_by.map(|u| u.0))
        .bind(court.last_verified_at)
        .bind(court.created_at)
        .bind(court.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(court.id)
    }

    pub async fn get_court_by_id(&self, id: CourtId) -> StoreResult<Option<Court>> {
        let query_str = format!("SELECT {} FROM courts WHERE id = $1", COURT_FIELDS);

        let row = sqlx::query(&query_str)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(map_row_to_court(&row)?.1)),
            None => Ok(None),
        }
    }

    /// Overwrites only the supplied columns; returns false when the court does not exist
    pub async fn update_court(
        &self,
        id: CourtId,
        patch: &UpdateCourt,
        updated_at: i64,
    ) -> StoreResult<bool> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE courts SET updated_at = ");
        query.push_bind(updated_at);

        if let Some(ref name) = patch.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(ref street) = patch.address_street {
            query.push(", address_street = ").push_bind(street);
        }
        if let Some(ref city) = patch.address_city {
            query.push(", address_city = ").push_bind(city);
        }
        if let Some(ref state) = patch.address_state {
            query.push(", address_state = ").push_bind(state);
        }
        if let Some(ref zip) = patch.address_zip {
            query.push(", address_zip = ").push_bind(zip);
        }
        if let Some(num_courts) = patch.num_courts {
            query.push(", num_courts = ").push_bind(i64::from(num_courts));
        }
        if let Some(court_type) = patch.court_type {
            query.push(", court_type = ").push_bind(court_type.as_str());
        }
        if let Some(cost) = patch.cost {
            query.push(", cost = ").push_bind(cost.as_str());
        }
        if let Some(ref notes) = patch.cost_notes {
            query.push(", cost_notes = ").push_bind(notes);
        }
        if let Some(ref notes) = patch.admin_notes {
            query.push(", admin_notes = ").push_bind(notes);
        }
        if let Some(status) = patch.status {
            query.push(", status = ").push_bind(status.as_str());
        }

        query.push(" WHERE id = ").push_bind(id.0);

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_court_by_id(&self, id: CourtId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM courts WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reads one page for the given strategy
    pub async fn query_courts(
        &self,
        query: &CourtQuery,
        opts: &PaginationOpts,
    ) -> StoreResult<Page<Court>> {
        let position = CursorPosition::from_opts(opts)?;

        match query {
            CourtQuery::Search(search) => {
                self.search_courts(search, position, opts.num_items).await
            }
            _ => self.scan_courts(query, position, opts.num_items).await,
        }
    }

    async fn scan_courts(
        &self,
        query: &CourtQuery,
        position: CursorPosition,
        num_items: u32,
    ) -> StoreResult<Page<Court>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        builder.push(COURT_FIELDS);
        builder.push(" FROM courts WHERE 1=1");

        match query {
            CourtQuery::ByStatus(status) => {
                builder.push(" AND status = ").push_bind(status.as_str());
            }
            CourtQuery::ByCourtType(court_type) => {
                builder.push(" AND court_type = ").push_bind(court_type.as_str());
            }
            CourtQuery::ByLocation { state, city } => {
                if let Some(state) = state {
                    builder.push(" AND address_state = ").push_bind(state.clone());
                }
                if let Some(city) = city {
                    builder.push(" AND address_city = ").push_bind(city.clone());
                }
            }
            CourtQuery::FullScan | CourtQuery::Search(_) => {}
        }

        match position {
            CursorPosition::Start => {}
            CursorPosition::After { seq } => {
                builder.push(" AND seq > ").push_bind(seq);
            }
            CursorPosition::Offset { .. } => {
                return Err(StoreError::InvalidCursor(
                    "search cursor cannot resume an indexed read".to_string(),
                ))
            }
        }

        builder.push(" ORDER BY seq ASC");
        apply_page_limit(&mut builder, num_items);

        let rows = builder.build().fetch_all(&self.pool).await?;
        let mut courts = rows
            .iter()
            .map(map_row_to_court)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let is_done = courts.len() <= num_items as usize;
        courts.truncate(num_items as usize);

        let continue_cursor = match courts.last() {
            Some((seq, _)) => CursorPosition::After { seq: *seq },
            None => position,
        };

        Ok(Page {
            page: courts.into_iter().map(|(_, court)| court).collect(),
            continue_cursor: continue_cursor.encode(),
            is_done,
        })
    }

    async fn search_courts(
        &self,
        search: &SearchQuery,
        position: CursorPosition,
        num_items: u32,
    ) -> StoreResult<Page<Court>> {
        let skip = match position {
            CursorPosition::Start => 0,
            CursorPosition::Offset { skip } => skip,
            CursorPosition::After { .. } => {
                return Err(StoreError::InvalidCursor(
                    "indexed cursor cannot resume a search".to_string(),
                ))
            }
        };

        let terms = text::query_terms(&search.text);
        let Some(tsquery) = text::to_tsquery(&terms) else {
            return Ok(Page {
                page: Vec::new(),
                continue_cursor: CursorPosition::Offset { skip }.encode(),
                is_done: true,
            });
        };

        // Rank is the number of distinct query terms matching the name.
        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        builder.push(COURT_FIELDS);
        builder.push(", (");
        for (i, operand) in text::tsquery_operands(&terms).into_iter().enumerate() {
            if i > 0 {
                builder.push(" + ");
            }
            builder.push(format!(
                "(to_tsvector('{0}', name) @@ to_tsquery('{0}', ",
                TS_CONFIG
            ));
            builder.push_bind(operand);
            builder.push("))::int");
        }
        builder.push(format!(
            ") AS search_rank FROM courts WHERE to_tsvector('{0}', name) @@ to_tsquery('{0}', ",
            TS_CONFIG
        ));
        builder.push_bind(tsquery);
        builder.push(")");

        if let Some(status) = search.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(court_type) = search.court_type {
            builder.push(" AND court_type = ").push_bind(court_type.as_str());
        }
        if let Some(cost) = search.cost {
            builder.push(" AND cost = ").push_bind(cost.as_str());
        }

        builder.push(" ORDER BY search_rank DESC, seq ASC");
        apply_page_limit(&mut builder, num_items);
        builder
            .push(" OFFSET ")
            .push_bind(i64::try_from(skip).unwrap_or(i64::MAX));

        let rows = builder.build().fetch_all(&self.pool).await?;
        let mut courts = rows
            .iter()
            .map(|row| map_row_to_court(row).map(|(_, court)| court))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let is_done = courts.len() <= num_items as usize;
        courts.truncate(num_items as usize);
        let consumed = skip.saturating_add(courts.len() as u64);

        Ok(Page {
            page: courts,
            continue_cursor: CursorPosition::Offset { skip: consumed }.encode(),
            is_done,
        })
    }
}
