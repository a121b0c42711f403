//! Persistence facade shared by every store implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::inventory::types::{NewPhone, Page, Phone, PhoneChanges, PhoneQuery};

/// Failures reported by a [`PhoneStore`].
///
/// `NotFound` and `UniqueViolation` are the structured signals the fault
/// translator classifies; `Validation` carries ORM-style argument messages.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No record was found for an operation on `phone`")]
    NotFound,

    #[error("Unique constraint failed on the fields: (`{0}`)")]
    UniqueViolation(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Backend(String),

    #[cfg(feature = "mysql")]
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

/// Paginated list, create, update and soft-delete over the `phone` table.
#[async_trait]
pub trait PhoneStore: Send + Sync {
    /// Live rows ordered by id, one page at a time.
    async fn list(&self, query: &PhoneQuery) -> Result<Page<Phone>, StoreError>;

    /// Insert a live row.
    async fn create(&self, phone: NewPhone) -> Result<Phone, StoreError>;

    /// Change a live row. Missing or soft-deleted rows are `NotFound`.
    async fn update(&self, id: i64, changes: PhoneChanges) -> Result<Phone, StoreError>;

    /// Mark a live row deleted. Missing or already deleted rows are `NotFound`.
    async fn remove(&self, id: i64) -> Result<Phone, StoreError>;

    /// Release connections at shutdown.
    async fn close(&self) {}
}
