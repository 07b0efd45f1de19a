use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Page request in the shape the store's paginator expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOpts {
    pub num_items: u32,
    #[serde(default)]
    pub cursor: Option<String>,
}

impl PaginationOpts {
    pub fn first(num_items: u32) -> Self {
        Self {
            num_items,
            cursor: None,
        }
    }

    pub fn after(num_items: u32, cursor: impl Into<String>) -> Self {
        Self {
            num_items,
            cursor: Some(cursor.into()),
        }
    }
}

/// One page of results plus the store's continuation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: Vec<T>,
    pub continue_cursor: String,
    pub is_done: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor is not valid base64: {0}")]
    Encoding(String),
    #[error("cursor payload is malformed: {0}")]
    Payload(String),
}

/// Decoded position inside a result sequence.
///
/// Indexed reads and scans resume after the creation sequence of the last
/// record handed out; relevance-ranked search resumes by offset because its
/// ordering has no stable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "k", rename_all = "snake_case")]
pub enum CursorPosition {
    Start,
    After { seq: i64 },
    Offset { skip: u64 },
}

impl CursorPosition {
    pub fn encode(&self) -> String {
        // Serializing a plain tagged enum cannot fail.
        let payload = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(payload)
    }

    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| CursorError::Encoding(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| CursorError::Payload(e.to_string()))
    }

    /// Decodes the cursor carried by `opts`, treating a missing cursor as the start.
    pub fn from_opts(opts: &PaginationOpts) -> Result<Self, CursorError> {
        match opts.cursor.as_deref() {
            None => Ok(CursorPosition::Start),
            Some(token) => Self::decode(token),
        }
    }
}
