//! Inventory access subsystem.
//!
//! # Data Flow
//! ```text
//! handlers.rs (HTTP extraction)
//!     → input.rs (argument validation, ORM-style messages)
//!     → PhoneStore (memory.rs | mysql.rs)
//!     → Phone / Page<Phone> returned to the envelope normalizer
//! ```
//!
//! # Design Decisions
//! - Soft delete only: `is_deleted` rows are invisible to list/update/remove
//! - Stores report structured `NotFound` / `UniqueViolation`; callers never
//!   inspect driver error codes

pub mod handlers;
pub mod input;
pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod store;
pub mod types;

use std::sync::Arc;

pub use memory::MemoryStore;
pub use store::{PhoneStore, StoreError};
pub use types::{NewPhone, Page, PageRequest, Pagination, Phone, PhoneChanges, PhoneFilter, PhoneQuery};

use crate::config::{InventoryConfig, StoreBackend};

/// Open the store selected by `config`.
pub async fn open_store(config: &InventoryConfig) -> Result<Arc<dyn PhoneStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Mysql => open_mysql(config).await,
    }
}

#[cfg(feature = "mysql")]
async fn open_mysql(config: &InventoryConfig) -> Result<Arc<dyn PhoneStore>, StoreError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| StoreError::Backend("inventory.database_url is not set".to_string()))?;
    let store = mysql::MySqlStore::connect(url, config.max_connections).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mysql"))]
async fn open_mysql(_config: &InventoryConfig) -> Result<Arc<dyn PhoneStore>, StoreError> {
    Err(StoreError::Backend(
        "the mysql backend requires building with the `mysql` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = open_store(&InventoryConfig::default()).await.unwrap();
        let page = store.list(&PhoneQuery::default()).await.unwrap();
        assert_eq!(page.pagination.total, 0);
    }

    #[cfg(not(feature = "mysql"))]
    #[tokio::test]
    async fn test_mysql_without_feature() {
        let config = InventoryConfig {
            backend: StoreBackend::Mysql,
            database_url: Some("mysql://localhost/shop".into()),
            ..InventoryConfig::default()
        };
        assert!(matches!(open_store(&config).await, Err(StoreError::Backend(_))));
    }
}
