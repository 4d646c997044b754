use std::fmt;

use thiserror::Error;

/// Failure reported by a [`crate::db::MappingStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The UNIQUE constraint on `short_url` rejected the insert.
    #[error("short url already exists")]
    Duplicate(#[source] sqlx::Error),

    #[error("storage backend failure")]
    Backend(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(err),
            _ => StoreError::Backend(err),
        }
    }
}

/// Which service operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Shorten,
    UpdateDestination,
    Resolve,
    ExtendExpiry,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Operation::Shorten => "shortening the URL",
            Operation::UpdateDestination => "updating the URL",
            Operation::Resolve => "getting the destination URL",
            Operation::ExtendExpiry => "updating the expiry of the URL",
        };
        f.write_str(what)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request carried no usable destination URL.
    InvalidInput,
    /// A generated short URL was already taken.
    Collision,
    /// Any other storage failure.
    Persistence,
}

/// Error returned by [`crate::service::MappingService`]. The HTTP layer only
/// ever shows a fixed message; the kind and source are kept for logging.
#[derive(Debug, Error)]
#[error("error on {op} ({kind:?})")]
pub struct ServiceError {
    pub op: Operation,
    pub kind: ErrorKind,
    #[source]
    pub source: Option<StoreError>,
}

impl ServiceError {
    pub fn invalid_input(op: Operation) -> Self {
        Self {
            op,
            kind: ErrorKind::InvalidInput,
            source: None,
        }
    }

    pub fn from_store(op: Operation, err: StoreError) -> Self {
        let kind = match err {
            StoreError::Duplicate(_) => ErrorKind::Collision,
            StoreError::Backend(_) => ErrorKind::Persistence,
        };
        Self {
            op,
            kind,
            source: Some(err),
        }
    }

    pub fn is_collision(&self) -> bool {
        self.kind == ErrorKind::Collision
    }
}
