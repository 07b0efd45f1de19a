use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::pagination::PaginationOpts;
use super::user::UserId;

/// Identifier assigned by the store when a court is inserted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct CourtId(pub Uuid);

impl CourtId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CourtId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CourtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CourtId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum CourtType {
    #[serde(rename = "indoor")]
    Indoor,
    #[serde(rename = "outdoor")]
    Outdoor,
    #[serde(rename = "mixed")]
    Mixed,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CourtType {
    pub const ALL: [CourtType; 4] = [
        CourtType::Indoor,
        CourtType::Outdoor,
        CourtType::Mixed,
        CourtType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourtType::Indoor => "indoor",
            CourtType::Outdoor => "outdoor",
            CourtType::Mixed => "mixed",
            CourtType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum Cost {
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "paid")]
    Paid,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Cost {
    pub const ALL: [Cost; 3] = [Cost::Free, Cost::Paid, Cost::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cost::Free => "free",
            Cost::Paid => "paid",
            Cost::Unknown => "unknown",
        }
    }
}

/// Moderation state of a court listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum CourtStatus {
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "rejected")]
    Rejected,
}

impl CourtStatus {
    pub const ALL: [CourtStatus; 3] = [
        CourtStatus::Approved,
        CourtStatus::Pending,
        CourtStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourtStatus::Approved => "approved",
            CourtStatus::Pending => "pending",
            CourtStatus::Rejected => "rejected",
        }
    }
}

macro_rules! impl_literal_conversions {
    ($ty:ident, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .into_iter()
                    .find(|candidate| candidate.as_str() == value)
                    .ok_or_else(|| format!("Invalid {}: {}", $label, value))
            }
        }

        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

impl_literal_conversions!(CourtType, "court type");
impl_literal_conversions!(Cost, "cost");
impl_literal_conversions!(CourtStatus, "court status");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    pub id: CourtId,
    pub name: String,
    pub address_street: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub num_courts: u32,
    pub court_type: CourtType,
    pub cost: Cost,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cost_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub admin_notes: Option<String>,
    pub status: CourtStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub submitted_by: Option<UserId>,
    /// Epoch milliseconds
    pub last_verified_at: i64,
    /// Epoch milliseconds, set once on insert
    pub created_at: i64,
    /// Epoch milliseconds, advances on every mutation
    pub updated_at: i64,
}

impl Court {
    /// Builds the record `create` inserts, stamping all three timestamps with `now`.
    pub fn from_new(id: CourtId, new: CreateCourt, now: i64) -> Self {
        Self {
            id,
            name: new.name,
            address_street: new.address_street,
            address_city: new.address_city,
            address_state: new.address_state,
            address_zip: new.address_zip,
            num_courts: new.num_courts,
            court_type: new.court_type,
            cost: new.cost,
            cost_notes: new.cost_notes,
            admin_notes: new.admin_notes,
            status: new.status,
            submitted_by: new.submitted_by,
            last_verified_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the fields present in `patch` and stamps `updated_at`.
    pub fn apply_patch(&mut self, patch: &UpdateCourt, updated_at: i64) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref street) = patch.address_street {
            self.address_street = street.clone();
        }
        if let Some(ref city) = patch.address_city {
            self.address_city = city.clone();
        }
        if let Some(ref state) = patch.address_state {
            self.address_state = state.clone();
        }
        if let Some(ref zip) = patch.address_zip {
            self.address_zip = zip.clone();
        }
        if let Some(num_courts) = patch.num_courts {
            self.num_courts = num_courts;
        }
        if let Some(court_type) = patch.court_type {
            self.court_type = court_type;
        }
        if let Some(cost) = patch.cost {
            self.cost = cost;
        }
        if let Some(ref notes) = patch.cost_notes {
            self.cost_notes = Some(notes.clone());
        }
        if let Some(ref notes) = patch.admin_notes {
            self.admin_notes = Some(notes.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = updated_at;
    }
}

/// Arguments accepted by `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourt {
    pub name: String,
    pub address_street: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub num_courts: u32,
    pub court_type: CourtType,
    pub cost: Cost,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cost_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub admin_notes: Option<String>,
    pub status: CourtStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub submitted_by: Option<UserId>,
}

/// Partial patch accepted by `update`; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourt {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address_street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address_zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub num_courts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub court_type: Option<CourtType>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cost: Option<Cost>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cost_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub admin_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<CourtStatus>,
}

/// Arguments accepted by `list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCourtsArgs {
    pub pagination_opts: PaginationOpts,
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub status: Option<CourtStatus>,
    #[serde(default)]
    pub court_type: Option<CourtType>,
    #[serde(default)]
    pub cost: Option<Cost>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Flat query-string form of [`ListCourtsArgs`] used by `GET /api/courts`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListCourtsQuery {
    /// Page size (defaults to the configured page size)
    pub num_items: Option<u32>,
    /// Opaque cursor returned as `continueCursor` by the previous page
    pub cursor: Option<String>,
    /// Full-text query over the court name
    pub search_query: Option<String>,
    pub status: Option<CourtStatus>,
    pub court_type: Option<CourtType>,
    pub cost: Option<Cost>,
    /// Exact match on the address state
    pub state: Option<String>,
    /// Exact match on the address city
    pub city: Option<String>,
}

impl ListCourtsQuery {
    pub fn into_args(self, default_page_size: u32) -> ListCourtsArgs {
        ListCourtsArgs {
            pagination_opts: PaginationOpts {
                num_items: self.num_items.unwrap_or(default_page_size),
                cursor: self.cursor,
            },
            search_query: self.search_query,
            status: self.status,
            court_type: self.court_type,
            cost: self.cost,
            state: self.state,
            city: self.city,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CourtIdResponse {
    pub id: CourtId,
}
