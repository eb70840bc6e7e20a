//! Structural validation of candidate catalogs.
//!
//! Every write passes through [`validate`] before it reaches storage, and
//! documents decoded from the remote store pass through it before they are
//! served. The check is strict: wrong types are rejected rather than coerced,
//! and one bad element rejects the whole candidate.
//!
//! Required shape:
//!
//! ```text
//! { "categories": [
//!     { "id": string, "label": string, "keywords": [
//!         { "id": string, "label": string, "template": string }
//!     ] }
//! ] }
//! ```
//!
//! Unknown fields are ignored and dropped from the typed result.

use serde_json::{Map, Value};

use denial_core::{Catalog, Category, Error, Keyword, Result};

/// Message returned to HTTP callers for any schema rejection.
pub const INVALID_CATALOG_MESSAGE: &str = "Invalid data: expected { categories: [...] }";

/// Validates a decoded JSON value and returns the typed catalog.
///
/// # Errors
///
/// Returns [`Error::InvalidSchema`] naming the first offending path.
pub fn validate(value: &Value) -> Result<Catalog> {
    let root = as_object(value, "catalog")?;
    let categories = root
        .get("categories")
        .ok_or_else(|| Error::invalid_schema("categories is required"))?;
    let categories = as_array(categories, "categories")?;

    let categories = categories
        .iter()
        .enumerate()
        .map(|(index, category)| validate_category(category, &format!("categories[{index}]")))
        .collect::<Result<Vec<_>>>()?;

    Ok(Catalog { categories })
}

/// Returns true if the value has the exact catalog shape.
#[must_use]
pub fn is_valid(value: &Value) -> bool {
    validate(value).is_ok()
}

fn validate_category(value: &Value, path: &str) -> Result<Category> {
    let object = as_object(value, path)?;
    let id = string_field(object, path, "id")?;
    let label = string_field(object, path, "label")?;

    let keywords_path = format!("{path}.keywords");
    let keywords = object
        .get("keywords")
        .ok_or_else(|| Error::invalid_schema(format!("{keywords_path} is required")))?;
    let keywords = as_array(keywords, &keywords_path)?
        .iter()
        .enumerate()
        .map(|(index, keyword)| validate_keyword(keyword, &format!("{keywords_path}[{index}]")))
        .collect::<Result<Vec<_>>>()?;

    Ok(Category {
        id,
        label,
        keywords,
    })
}

fn validate_keyword(value: &Value, path: &str) -> Result<Keyword> {
    let object = as_object(value, path)?;
    Ok(Keyword {
        id: string_field(object, path, "id")?,
        label: string_field(object, path, "label")?,
        template: string_field(object, path, "template")?,
    })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::invalid_schema(format!("{path} must be an object")))
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::invalid_schema(format!("{path} must be an array")))
}

fn string_field(object: &Map<String, Value>, path: &str, field: &str) -> Result<String> {
    match object.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(Error::invalid_schema(format!(
            "{path}.{field} must be a string"
        ))),
    }
}
