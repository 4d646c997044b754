use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// A short URL → destination record from the `url_mappings` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    pub id: i64,
    pub original_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Raw row as stored; timestamps are epoch milliseconds.
#[derive(Debug, sqlx::FromRow)]
pub struct MappingRow {
    pub id: i64,
    pub original_url: String,
    pub short_url: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl TryFrom<MappingRow> for UrlMapping {
    type Error = StoreError;

    fn try_from(row: MappingRow) -> Result<Self, Self::Error> {
        let created_at = millis_to_utc("created_at", row.created_at)?;
        let expires_at = millis_to_utc("expires_at", row.expires_at)?;
        Ok(Self {
            id: row.id,
            original_url: row.original_url,
            short_url: row.short_url,
            created_at,
            expires_at,
        })
    }
}

fn millis_to_utc(column: &str, millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        StoreError::Backend(sqlx::Error::Decode(
            format!("{column} = {millis} is not a valid timestamp").into(),
        ))
    })
}

/// A mapping that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewMapping {
    pub original_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// ── Wire types ─────────────────────────────────────────────────────────────

/// Body of `POST /shorten`. A missing field is reported by the service, not
/// by the JSON extractor, so it ends up as the same generic failure.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(rename = "originalUrl", default)]
    pub original_url: Option<Value>,
}

impl ShortenRequest {
    /// The destination as text. Numbers and booleans are taken in their JSON
    /// spelling; `null` counts as missing.
    pub fn original_url(&self) -> String {
        match &self.original_url {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    #[serde(rename = "shortUrl")]
    pub short_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
