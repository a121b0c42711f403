//! MySQL / MariaDB store backed by an `sqlx` pool.
//!
//! Expects the table:
//!
//! ```sql
//! CREATE TABLE phone (
//!     id          BIGINT PRIMARY KEY AUTO_INCREMENT,
//!     name        VARCHAR(255) NOT NULL UNIQUE,
//!     price       DOUBLE NOT NULL,
//!     stock       INT NOT NULL,
//!     is_discount BOOLEAN NOT NULL DEFAULT FALSE,
//!     is_deleted  BOOLEAN NOT NULL DEFAULT FALSE
//! );
//! ```

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlPool, MySqlPoolOptions};
use sqlx::{FromRow, QueryBuilder};

use crate::inventory::store::{PhoneStore, StoreError};
use crate::inventory::types::{
    NewPhone, Page, Pagination, Phone, PhoneChanges, PhoneFilter, PhoneQuery,
};

const COLUMNS: &str = "id, name, price, stock, is_discount, is_deleted";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::UniqueViolation(db.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

#[derive(Debug, FromRow)]
struct PhoneRow {
    id: i64,
    name: String,
    price: f64,
    stock: i32,
    is_discount: bool,
    is_deleted: bool,
}

impl From<PhoneRow> for Phone {
    fn from(row: PhoneRow) -> Self {
        Phone {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            is_discount: row.is_discount,
            is_deleted: row.is_deleted,
        }
    }
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        tracing::info!(max_connections, "MySQL pool connected");
        Ok(Self { pool })
    }

    async fn fetch_live(&self, id: i64) -> Result<Phone, StoreError> {
        let row: PhoneRow = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM phone WHERE id = ? AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, MySql>, filter: &PhoneFilter) {
    qb.push(" WHERE is_deleted = FALSE");
    if let Some(prefix) = &filter.name_prefix {
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        qb.push(" AND name LIKE ").push_bind(format!("{escaped}%"));
    }
    if let Some(max_price) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max_price);
    }
    if let Some(min_stock) = filter.min_stock {
        qb.push(" AND stock >= ").push_bind(min_stock);
    }
}

#[async_trait]
impl PhoneStore for MySqlStore {
    async fn list(&self, query: &PhoneQuery) -> Result<Page<Phone>, StoreError> {
        let mut rows_qb = QueryBuilder::<MySql>::new(format!("SELECT {COLUMNS} FROM phone"));
        push_filter(&mut rows_qb, &query.filter);
        rows_qb
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(i64::from(query.page.page_size))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX));

        let mut count_qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM phone");
        push_filter(&mut count_qb, &query.filter);

        let (rows, total) = tokio::try_join!(
            rows_qb.build_query_as::<PhoneRow>().fetch_all(&self.pool),
            count_qb.build_query_scalar::<i64>().fetch_one(&self.pool),
        )?;

        Ok(Page {
            data: rows.into_iter().map(Phone::from).collect(),
            pagination: Pagination::new(query.page, u64::try_from(total).unwrap_or(0)),
        })
    }

    async fn create(&self, phone: NewPhone) -> Result<Phone, StoreError> {
        let result = sqlx::query(
            "INSERT INTO phone (name, price, stock, is_discount, is_deleted) VALUES (?, ?, ?, ?, FALSE)",
        )
        .bind(&phone.name)
        .bind(phone.price)
        .bind(phone.stock)
        .bind(phone.is_discount)
        .execute(&self.pool)
        .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|_| StoreError::Backend("inserted id exceeds BIGINT range".to_string()))?;
        self.fetch_live(id).await
    }

    async fn update(&self, id: i64, changes: PhoneChanges) -> Result<Phone, StoreError> {
        self.fetch_live(id).await?;
        if changes.is_empty() {
            return self.fetch_live(id).await;
        }

        let mut qb = QueryBuilder::<MySql>::new("UPDATE phone SET ");
        let mut set = qb.separated(", ");
        if let Some(name) = changes.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(price) = changes.price {
            set.push("price = ").push_bind_unseparated(price);
        }
        if let Some(stock) = changes.stock {
            set.push("stock = ").push_bind_unseparated(stock);
        }
        if let Some(is_discount) = changes.is_discount {
            set.push("is_discount = ").push_bind_unseparated(is_discount);
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND is_deleted = FALSE");
        qb.build().execute(&self.pool).await?;

        self.fetch_live(id).await
    }

    async fn remove(&self, id: i64) -> Result<Phone, StoreError> {
        let mut phone = self.fetch_live(id).await?;
        let result = sqlx::query("UPDATE phone SET is_deleted = TRUE WHERE id = ? AND is_deleted = FALSE")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        phone.is_deleted = true;
        Ok(phone)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("MySQL pool closed");
    }
}
