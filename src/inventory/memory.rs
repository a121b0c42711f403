//! In-process store used by default and in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::inventory::store::{PhoneStore, StoreError};
use crate::inventory::types::{NewPhone, Page, Pagination, Phone, PhoneChanges, PhoneQuery};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i64, Phone>,
    next_id: i64,
}

/// `phone` table kept in a `BTreeMap`, so iteration is ordered by id.
///
/// `name` is unique across all rows, deleted or not, like a unique index.
#[derive(Debug)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|row| row.name == name && Some(row.id) != except)
    }

    fn live_mut(&mut self, id: i64) -> Result<&mut Phone, StoreError> {
        self.rows
            .get_mut(&id)
            .filter(|row| !row.is_deleted)
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl PhoneStore for MemoryStore {
    async fn list(&self, query: &PhoneQuery) -> Result<Page<Phone>, StoreError> {
        let table = self.table.read().await;
        let matching = table.rows.values().filter(|row| query.filter.matches(row));

        let total = matching.clone().count() as u64;
        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let data = matching
            .skip(offset)
            .take(query.page.page_size as usize)
            .cloned()
            .collect();

        Ok(Page {
            data,
            pagination: Pagination::new(query.page, total),
        })
    }

    async fn create(&self, phone: NewPhone) -> Result<Phone, StoreError> {
        let mut table = self.table.write().await;
        if table.name_taken(&phone.name, None) {
            return Err(StoreError::UniqueViolation("name".to_string()));
        }

        let id = table.next_id;
        table.next_id += 1;
        let row = Phone {
            id,
            name: phone.name,
            price: phone.price,
            stock: phone.stock,
            is_discount: phone.is_discount,
            is_deleted: false,
        };
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, changes: PhoneChanges) -> Result<Phone, StoreError> {
        let mut table = self.table.write().await;
        table.live_mut(id)?;
        if let Some(name) = &changes.name {
            if table.name_taken(name, Some(id)) {
                return Err(StoreError::UniqueViolation("name".to_string()));
            }
        }

        let row = table.live_mut(id)?;
        changes.apply(row);
        Ok(row.clone())
    }

    async fn remove(&self, id: i64) -> Result<Phone, StoreError> {
        let mut table = self.table.write().await;
        let row = table.live_mut(id)?;
        row.is_deleted = true;
        Ok(row.clone())
    }
}
