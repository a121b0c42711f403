//! Inventory record and query types.

use serde::{Deserialize, Serialize};

/// A row of the `phone` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    /// 64-bit identifier, serialized as an exact JSON integer.
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub is_discount: bool,
    pub is_deleted: bool,
}

/// Fields accepted when creating a phone.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPhone {
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub is_discount: bool,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub is_discount: Option<bool>,
}

impl PhoneChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.is_discount.is_none()
    }

    pub fn apply(&self, phone: &mut Phone) {
        if let Some(name) = &self.name {
            phone.name = name.clone();
        }
        if let Some(price) = self.price {
            phone.price = price;
        }
        if let Some(stock) = self.stock {
            phone.stock = stock;
        }
        if let Some(is_discount) = self.is_discount {
            phone.is_discount = is_discount;
        }
    }
}

/// Optional narrowing applied on top of the soft-delete exclusion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneFilter {
    pub name_prefix: Option<String>,
    pub max_price: Option<f64>,
    pub min_stock: Option<i32>,
}

impl PhoneFilter {
    /// True when `phone` is live and satisfies every set condition.
    pub fn matches(&self, phone: &Phone) -> bool {
        !phone.is_deleted
            && self
                .name_prefix
                .as_deref()
                .map_or(true, |prefix| phone.name.starts_with(prefix))
            && self.max_price.map_or(true, |max| phone.price <= max)
            && self.min_stock.map_or(true, |min| phone.stock >= min)
    }
}

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// A list request: page plus filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneQuery {
    pub page: PageRequest,
    pub filter: PhoneFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let page_size = u64::from(request.page_size.max(1));
        Self {
            page: request.page,
            page_size: request.page_size,
            total,
            total_pages: total.div_ceil(page_size),
        }
    }
}

/// One page of results with its pagination summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(id: i64, name: &str, price: f64, stock: i32) -> Phone {
        Phone {
            id,
            name: name.into(),
            price,
            stock,
            is_discount: false,
            is_deleted: false,
        }
    }

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(PageRequest::new(2, 5), 12);
        assert_eq!(p.total_pages, 3);
        assert_eq!(Pagination::new(PageRequest::new(1, 10), 0).total_pages, 0);
        assert_eq!(Pagination::new(PageRequest::new(1, 10), 10).total_pages, 1);
        assert_eq!(Pagination::new(PageRequest::new(1, 10), 11).total_pages, 2);
        assert_eq!(PageRequest::new(3, 5).offset(), 10);
        assert_eq!(PageRequest::new(1, 5).offset(), 0);
    }

    #[test]
    fn test_filter() {
        let filter = PhoneFilter {
            name_prefix: Some("Galaxy".into()),
            max_price: Some(8000.0),
            min_stock: Some(1),
        };
        assert!(filter.matches(&phone(1, "Galaxy S24", 7999.0, 3)));
        assert!(!filter.matches(&phone(2, "Pixel 9", 5999.0, 3)));
        assert!(!filter.matches(&phone(3, "Galaxy Fold", 12999.0, 3)));
        assert!(!filter.matches(&phone(4, "Galaxy A55", 2999.0, 0)));

        let mut deleted = phone(5, "Galaxy S23", 4999.0, 2);
        deleted.is_deleted = true;
        assert!(!PhoneFilter::default().matches(&deleted));
    }

    #[test]
    fn test_camel_case_wire_names() {
        let json = serde_json::to_value(phone(9_007_199_254_740_993, "X", 1.5, 2)).unwrap();
        assert_eq!(json["isDiscount"], false);
        assert_eq!(json["isDeleted"], false);
        assert_eq!(json["id"].as_i64(), Some(9_007_199_254_740_993));

        let pagination = serde_json::to_value(Pagination::new(PageRequest::new(2, 5), 12)).unwrap();
        assert_eq!(
            pagination,
            serde_json::json!({"page": 2, "pageSize": 5, "total": 12, "totalPages": 3})
        );
    }

    #[test]
    fn test_changes_apply() {
        let mut p = phone(1, "Old", 10.0, 1);
        let changes = PhoneChanges {
            price: Some(12.5),
            is_discount: Some(true),
            ..PhoneChanges::default()
        };
        assert!(!changes.is_empty());
        changes.apply(&mut p);
        assert_eq!(p.name, "Old");
        assert_eq!(p.price, 12.5);
        assert!(p.is_discount);
        assert!(PhoneChanges::default().is_empty());
    }
}
