//! Argument validation for inventory writes and list queries.
//!
//! Bodies are checked field by field before they reach a store, producing the
//! same argument messages an ORM client would (`Unknown argument`,
//! `Invalid value provided`, `is missing`). The fault translator recognizes
//! those messages and turns them into caller-facing text.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::InventoryConfig;
use crate::inventory::store::StoreError;
use crate::inventory::types::{NewPhone, PageRequest, PhoneChanges, PhoneFilter, PhoneQuery};

const FIELDS: [&str; 4] = ["name", "price", "stock", "isDiscount"];

/// ORM type name of a JSON value.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "Int",
        Value::Number(_) => "Float",
        Value::String(_) => "String",
        Value::Array(_) => "List",
        Value::Object(_) => "Object",
    }
}

fn invalid_value(field: &str, expected: &str, provided: &str) -> StoreError {
    StoreError::Validation(format!(
        "Argument `{field}`: Invalid value provided. Expected {expected}, provided {provided}."
    ))
}

fn as_object<'a>(body: &'a Value, input: &str) -> Result<&'a Map<String, Value>, StoreError> {
    body.as_object()
        .ok_or_else(|| invalid_value("data", input, type_name(body)))
}

fn reject_unknown(object: &Map<String, Value>) -> Result<(), StoreError> {
    match object.keys().find(|key| !FIELDS.contains(&key.as_str())) {
        Some(key) => Err(StoreError::Validation(format!(
            "Unknown argument `{key}`. Available options are: {}.",
            FIELDS.join(", ")
        ))),
        None => Ok(()),
    }
}

fn string_field(field: &str, value: &Value) -> Result<String, StoreError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid_value(field, "String", type_name(value)))
}

fn float_field(field: &str, value: &Value) -> Result<f64, StoreError> {
    value
        .as_f64()
        .ok_or_else(|| invalid_value(field, "Float", type_name(value)))
}

fn int_field(field: &str, value: &Value) -> Result<i32, StoreError> {
    let wide = value
        .as_i64()
        .ok_or_else(|| invalid_value(field, "Int", type_name(value)))?;
    i32::try_from(wide).map_err(|_| {
        StoreError::Validation(format!(
            "Unable to fit value {wide} into a 32-bit signed integer for field `{field}`"
        ))
    })
}

fn bool_field(field: &str, value: &Value) -> Result<bool, StoreError> {
    value
        .as_bool()
        .ok_or_else(|| invalid_value(field, "Boolean", type_name(value)))
}

fn required<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a Value, StoreError> {
    object
        .get(field)
        .ok_or_else(|| StoreError::Validation(format!("Argument `{field}` is missing.")))
}

/// Validate a create body.
pub fn new_phone(body: &Value) -> Result<NewPhone, StoreError> {
    let object = as_object(body, "phoneCreateInput")?;
    reject_unknown(object)?;

    Ok(NewPhone {
        name: string_field("name", required(object, "name")?)?,
        price: float_field("price", required(object, "price")?)?,
        stock: int_field("stock", required(object, "stock")?)?,
        is_discount: match object.get("isDiscount") {
            Some(value) => bool_field("isDiscount", value)?,
            None => false,
        },
    })
}

/// Validate an update body. Every field is optional.
pub fn phone_changes(body: &Value) -> Result<PhoneChanges, StoreError> {
    let object = as_object(body, "phoneUpdateInput")?;
    reject_unknown(object)?;

    Ok(PhoneChanges {
        name: object.get("name").map(|v| string_field("name", v)).transpose()?,
        price: object.get("price").map(|v| float_field("price", v)).transpose()?,
        stock: object.get("stock").map(|v| int_field("stock", v)).transpose()?,
        is_discount: object
            .get("isDiscount")
            .map(|v| bool_field("isDiscount", v))
            .transpose()?,
    })
}

/// A query parameter counts as absent when empty.
fn param<'a>(params: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn parse_param<T: std::str::FromStr>(
    params: &BTreeMap<String, String>,
    key: &str,
    expected: &str,
) -> Result<Option<T>, StoreError> {
    param(params, key)
        .map(|raw| raw.parse::<T>().map_err(|_| invalid_value(key, expected, "String")))
        .transpose()
}

/// Build a list query from raw query-string parameters.
pub fn phone_query(
    params: &BTreeMap<String, String>,
    config: &InventoryConfig,
) -> Result<PhoneQuery, StoreError> {
    let page = parse_param::<i64>(params, "page", "Int")?.unwrap_or(1);
    let page_size =
        parse_param::<i64>(params, "pageSize", "Int")?.unwrap_or(i64::from(config.default_page_size));

    if page < 1 {
        return Err(StoreError::InvalidInput("page must be at least 1".to_string()));
    }
    if page_size < 1 || page_size > i64::from(config.max_page_size) {
        return Err(StoreError::InvalidInput(format!(
            "pageSize must be between 1 and {}",
            config.max_page_size
        )));
    }
    let page = u32::try_from(page)
        .map_err(|_| StoreError::InvalidInput("page is out of range".to_string()))?;
    let page_size = u32::try_from(page_size)
        .map_err(|_| StoreError::InvalidInput("pageSize is out of range".to_string()))?;

    Ok(PhoneQuery {
        page: PageRequest::new(page, page_size),
        filter: PhoneFilter {
            name_prefix: param(params, "namePrefix").map(str::to_string),
            max_price: parse_param::<f64>(params, "maxPrice", "Float")?,
            min_stock: parse_param::<i32>(params, "minStock", "Int")?,
        },
    })
}
