use anyhow::{anyhow, Context, Result};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};

use crate::models::{Court, CourtId, User, UserId};
use crate::store::StoreError;

/// Standard court fields for SELECT queries
pub const COURT_FIELDS: &str = r#"
    seq, id, name, address_street, address_city, address_state, address_zip,
    num_courts, court_type, cost, cost_notes, admin_notes, status, submitted_by,
    last_verified_at, created_at, updated_at
"#;

/// Text-search configuration used by the name index and every search query
pub const TS_CONFIG: &str = "simple";

/// Maps a database row to a Court, returning it with its creation sequence
pub fn map_row_to_court(row: &PgRow) -> Result<(i64, Court)> {
    let num_courts: i64 = row.try_get("num_courts")?;
    let court_type: String = row.try_get("court_type")?;
    let cost: String = row.try_get("cost")?;
    let status: String = row.try_get("status")?;

    let court = Court {
        id: CourtId(row.try_get("id")?),
        name: row.try_get("name")?,
        address_street: row.try_get("address_street")?,
        address_city: row.try_get("address_city")?,
        address_state: row.try_get("address_state")?,
        address_zip: row.try_get("address_zip")?,
        num_courts: u32::try_from(num_courts)
            .with_context(|| format!("num_courts out of range: {}", num_courts))?,
        court_type: court_type.parse().map_err(|e: String| anyhow!(e))?,
        cost: cost.parse().map_err(|e: String| anyhow!(e))?,
        cost_notes: row.try_get("cost_notes")?,
        admin_notes: row.try_get("admin_notes")?,
        status: status.parse().map_err(|e: String| anyhow!(e))?,
        submitted_by: row
            .try_get::<Option<uuid::Uuid>, _>("submitted_by")?
            .map(UserId),
        last_verified_at: row.try_get("last_verified_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };

    Ok((row.try_get("seq")?, court))
}

pub fn map_row_to_user(row: &PgRow) -> Result<User> {
    Ok(User {
        id: UserId(row.try_get("id")?),
        email: row.try_get("email")?,
        is_admin: row.try_get("is_admin")?,
    })
}

/// Fetches one row more than requested so the caller can tell whether more exist
pub fn apply_page_limit(query: &mut QueryBuilder<Postgres>, num_items: u32) {
    query.push(" LIMIT ");
    query.push_bind(i64::from(num_items) + 1);
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_check_violation() {
                return StoreError::Validation(db_err.message().to_string());
            }
        }
        StoreError::Backend(err.into())
    }
}
