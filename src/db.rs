use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    error::StoreError,
    models::{MappingRow, NewMapping, UrlMapping},
};

// ── Pool setup ─────────────────────────────────────────────────────────────

/// Open the SQLite pool (creating the file if it doesn't exist yet) and run
/// the embedded migrations.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(
            database_url
                .parse::<SqliteConnectOptions>()?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
        )
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");
    Ok(pool)
}

/// Private in-memory database with the schema applied. Every connection to
/// `sqlite::memory:` is its own database, so the pool is pinned to a single
/// connection that never gets recycled.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with("sqlite::memory:".parse::<SqliteConnectOptions>()?)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

// ── Store ──────────────────────────────────────────────────────────────────

/// Persistence for URL mappings. `now` is passed in so that a record whose
/// `expires_at` has passed is invisible even before the sweeper deletes it.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Insert a new mapping. Fails with [`StoreError::Duplicate`] when the
    /// short URL is already present.
    async fn insert(&self, mapping: &NewMapping) -> Result<UrlMapping, StoreError>;

    /// Exact-match lookup of a live mapping.
    async fn find_live(
        &self,
        short_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UrlMapping>, StoreError>;

    /// Overwrite the destination of a live mapping and return the updated row.
    async fn update_destination(
        &self,
        short_url: &str,
        original_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UrlMapping>, StoreError>;

    /// Set `expires_at` on a live mapping. Returns the number of rows matched.
    async fn set_expiry(
        &self,
        short_url: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Delete every mapping whose `expires_at` is at or before `now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingStore for SqliteStore {
    async fn insert(&self, mapping: &NewMapping) -> Result<UrlMapping, StoreError> {
        let row: MappingRow = sqlx::query_as(
            "INSERT INTO url_mappings (original_url, short_url, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, original_url, short_url, created_at, expires_at",
        )
        .bind(&mapping.original_url)
        .bind(&mapping.short_url)
        .bind(mapping.created_at.timestamp_millis())
        .bind(mapping.expires_at.timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_live(
        &self,
        short_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UrlMapping>, StoreError> {
        let row: Option<MappingRow> = sqlx::query_as(
            "SELECT id, original_url, short_url, created_at, expires_at
             FROM url_mappings WHERE short_url = ?1 AND expires_at > ?2",
        )
        .bind(short_url)
        .bind(now.timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UrlMapping::try_from).transpose()
    }

    async fn update_destination(
        &self,
        short_url: &str,
        original_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UrlMapping>, StoreError> {
        let row: Option<MappingRow> = sqlx::query_as(
            "UPDATE url_mappings SET original_url = ?1
             WHERE short_url = ?2 AND expires_at > ?3
             RETURNING id, original_url, short_url, created_at, expires_at",
        )
        .bind(original_url)
        .bind(short_url)
        .bind(now.timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UrlMapping::try_from).transpose()
    }

    async fn set_expiry(
        &self,
        short_url: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let affected = sqlx::query(
            "UPDATE url_mappings SET expires_at = ?1 WHERE short_url = ?2 AND expires_at > ?3",
        )
        .bind(expires_at.timestamp_millis())
        .bind(short_url)
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let affected = sqlx::query("DELETE FROM url_mappings WHERE expires_at <= ?1")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected)
    }
}
