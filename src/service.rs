use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    db::MappingStore,
    error::{Operation, ServiceError},
    models::NewMapping,
    shortcode::ShortCodeGenerator,
};

/// Create / resolve / update operations over the mapping store.
#[derive(Clone)]
pub struct MappingService {
    store: Arc<dyn MappingStore>,
    generator: Arc<ShortCodeGenerator>,
    default_ttl_days: i64,
    shorten_attempts: u32,
}

impl MappingService {
    pub fn new(
        store: Arc<dyn MappingStore>,
        generator: ShortCodeGenerator,
        default_ttl_days: i64,
    ) -> Self {
        Self {
            store,
            generator: Arc::new(generator),
            default_ttl_days,
            shorten_attempts: 1,
        }
    }

    /// Retry a colliding code with a fresh one, up to `attempts` inserts in total.
    pub fn with_shorten_attempts(mut self, attempts: u32) -> Self {
        self.shorten_attempts = attempts.max(1);
        self
    }

    pub fn generator(&self) -> &ShortCodeGenerator {
        &self.generator
    }

    /// Store a new mapping for `original_url` and return its short URL.
    ///
    /// Every call creates a fresh record; the same destination shortened twice
    /// gets two different short URLs.
    pub async fn shorten(&self, original_url: &str) -> Result<String, ServiceError> {
        if original_url.is_empty() {
            return Err(ServiceError::invalid_input(Operation::Shorten));
        }

        let mut attempt = 1;
        loop {
            let now = Utc::now();
            let expires_at = days_from(now, self.default_ttl_days)
                .ok_or_else(|| ServiceError::invalid_input(Operation::Shorten))?;
            let mapping = NewMapping {
                original_url: original_url.to_owned(),
                short_url: self.generator.generate(),
                created_at: now,
                expires_at,
            };

            match self.store.insert(&mapping).await {
                Ok(saved) => {
                    tracing::info!(short_url = %saved.short_url, "Created mapping");
                    return Ok(saved.short_url);
                }
                Err(e) => {
                    let err = ServiceError::from_store(Operation::Shorten, e);
                    if err.is_collision() && attempt < self.shorten_attempts {
                        tracing::warn!(
                            "Short URL '{}' already taken (attempt {}/{}), retrying",
                            mapping.short_url,
                            attempt,
                            self.shorten_attempts
                        );
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Point an existing short URL at a new destination.
    /// Returns `false` when no live mapping has that short URL.
    pub async fn update_destination(
        &self,
        short_url: &str,
        new_destination: &str,
    ) -> Result<bool, ServiceError> {
        let updated = self
            .store
            .update_destination(short_url, new_destination, Utc::now())
            .await
            .map_err(|e| ServiceError::from_store(Operation::UpdateDestination, e))?;

        Ok(updated.is_some())
    }

    pub async fn resolve(&self, short_url: &str) -> Result<Option<String>, ServiceError> {
        let mapping = self
            .store
            .find_live(short_url, Utc::now())
            .await
            .map_err(|e| ServiceError::from_store(Operation::Resolve, e))?;

        if mapping.is_none() {
            tracing::debug!("No live mapping for '{}'", short_url);
        }
        Ok(mapping.map(|m| m.original_url))
    }

    /// Set the mapping to expire `days_to_add` days from now.
    ///
    /// The new expiry counts from the current time, not from the previous
    /// `expires_at`. A negative count expires the mapping immediately.
    /// Returns `false` when no live mapping has that short URL.
    pub async fn extend_expiry(
        &self,
        short_url: &str,
        days_to_add: i64,
    ) -> Result<bool, ServiceError> {
        let now = Utc::now();
        let expires_at = days_from(now, days_to_add).ok_or_else(|| {
            tracing::error!("Expiry of {} days for '{}' is out of range", days_to_add, short_url);
            ServiceError::invalid_input(Operation::ExtendExpiry)
        })?;
        let matched = self
            .store
            .set_expiry(short_url, expires_at, now)
            .await
            .map_err(|e| ServiceError::from_store(Operation::ExtendExpiry, e))?;

        Ok(matched > 0)
    }
}

impl std::fmt::Debug for MappingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingService")
            .field("generator", &self.generator)
            .field("default_ttl_days", &self.default_ttl_days)
            .field("shorten_attempts", &self.shorten_attempts)
            .finish_non_exhaustive()
    }
}

/// `now + days`, or `None` when that falls outside the representable range.
fn days_from(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|d| now.checked_add_signed(d))
}
