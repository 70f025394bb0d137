//! Backend response types.
//!
//! The backend serves every listing as a JSON envelope. These types turn an
//! envelope into the table engine's [`FetchResponse`] without knowing the
//! domain entity behind each row.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ApiError, Result};
use crate::table::{FetchResponse, ShallowMerge, TableRow};

/// Fallback identity field when the configured one is missing.
const FALLBACK_ID_FIELD: &str = "id";

/// A table row backed by a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRow {
    /// Identity read from the id field when the row was received.
    id: String,
    /// The row's fields.
    fields: Map<String, Value>,
}

impl JsonRow {
    /// Build a row from a JSON object, reading its identity from `id_field`.
    ///
    /// Falls back to `id` if `id_field` is absent. Numeric ids are accepted.
    pub fn from_value(value: Value, id_field: &str) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(ApiError::InvalidResponse(
                "row is not a JSON object".to_string(),
            ));
        };

        let id = [id_field, FALLBACK_ID_FIELD]
            .iter()
            .find_map(|field| fields.get(*field).and_then(id_text))
            .ok_or_else(|| {
                ApiError::InvalidResponse(format!("row has no '{}' field", id_field))
            })?;

        Ok(Self { id, fields })
    }

    /// The row's fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a field, following dots into nested objects (`vendor.name`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        parts.try_fold(self.fields.get(first)?, |value, part| value.get(part))
    }

    /// Display text of a field; empty if absent or null.
    pub fn text(&self, path: &str) -> String {
        self.get(path).map(display_value).unwrap_or_default()
    }
}

impl TableRow for JsonRow {
    fn row_id(&self) -> &str {
        &self.id
    }
}

impl ShallowMerge for JsonRow {
    type Patch = Map<String, Value>;

    /// Replace top-level fields named by `patch`. The identity never changes.
    fn shallow_merge(&mut self, patch: Self::Patch) {
        for (key, value) in patch {
            self.fields.insert(key, value);
        }
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Render a JSON value as cell text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Names of the envelope fields of a listing response.
///
/// Each name may be a dotted path into nested objects, for backends that wrap
/// their payload (`data.items`, `pagination.totalPages`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseShape {
    /// Boolean success flag; a missing flag counts as success.
    pub success: String,
    /// Array of rows.
    pub rows: String,
    /// Page the backend served.
    pub current_page: String,
    /// Number of pages.
    pub total_pages: String,
    /// Grand total of matching rows.
    pub total_items: String,
    /// Error message.
    pub message: String,
    /// Identity field of each row.
    pub id_field: String,
}

impl Default for ResponseShape {
    fn default() -> Self {
        Self {
            success: "success".to_string(),
            rows: "users".to_string(),
            current_page: "currentPage".to_string(),
            total_pages: "totalPages".to_string(),
            total_items: "totalItems".to_string(),
            message: "message".to_string(),
            id_field: "_id".to_string(),
        }
    }
}

impl ResponseShape {
    /// Translate a backend envelope into a page of rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not an object, the rows field is not an
    /// array, or a row lacks an identity.
    pub fn translate(&self, body: &Value) -> Result<FetchResponse<JsonRow>> {
        if !body.is_object() {
            return Err(ApiError::InvalidResponse(
                "response body is not a JSON object".to_string(),
            ));
        }

        let success = lookup(body, &self.success)
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let message = lookup(body, &self.message)
            .and_then(Value::as_str)
            .map(str::to_string);

        if !success {
            return Ok(FetchResponse::failure(message));
        }

        let rows = match lookup(body, &self.rows) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .cloned()
                .map(|item| JsonRow::from_value(item, &self.id_field))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(ApiError::InvalidResponse(format!(
                    "'{}' is not an array",
                    self.rows
                )))
            }
        };

        let mut response = FetchResponse::ok(rows);
        response.current_page = lookup_u64(body, &self.current_page).map(saturate_u32);
        response.total_pages = lookup_u64(body, &self.total_pages).map(saturate_u32);
        response.total_items = lookup_u64(body, &self.total_items);
        response.message = message;
        Ok(response)
    }
}

fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(body, |value, part| value.get(part))
}

/// Read a count that may arrive as a number or a numeric string.
fn lookup_u64(body: &Value, path: &str) -> Option<u64> {
    match lookup(body, path)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
