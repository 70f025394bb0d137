//! Listing table configuration.
//!
//! Each `[[tables]]` entry describes one listing screen: where its rows come
//! from, which columns and filter tabs it shows, and which row actions it
//! offers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ConfigError, Result, Settings};
use crate::api::{parse_method, JsonRow, ResponseShape};
use crate::table::{ActionVariant, FilterValue, TotalItemsMode};

/// One listing table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableConfig {
    /// Unique name, used on the command line.
    pub name: String,
    /// Heading shown above the table.
    #[serde(default)]
    pub title: Option<String>,
    /// Listing endpoint, relative to the server base URL.
    pub endpoint: String,
    #[serde(default)]
    pub search_placeholder: Option<String>,
    #[serde(default)]
    pub empty_message: Option<String>,
    #[serde(default)]
    pub loading_message: Option<String>,
    /// Overrides `settings.items_per_page`.
    #[serde(default)]
    pub items_per_page: Option<u32>,
    #[serde(default = "default_true")]
    pub enable_search: bool,
    #[serde(default = "default_true")]
    pub enable_pagination: bool,
    #[serde(default = "default_true")]
    pub enable_actions: bool,
    /// Overrides `settings.total_items`.
    #[serde(default)]
    pub total_items: Option<String>,
    /// Query parameter carrying the active filter.
    #[serde(default)]
    pub filter_param: Option<String>,
    /// Envelope field names of the listing response.
    #[serde(default)]
    pub response: ResponseShape,
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

fn default_true() -> bool {
    true
}

/// How a column's cell text is styled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Plain text.
    #[default]
    Text,
    /// A status badge colored by its value.
    Status,
    /// Secondary, dimmed text.
    Muted,
}

/// One table column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnConfig {
    pub key: String,
    pub label: String,
    /// Row field shown in the cell; defaults to `key`. May be a dotted path.
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub width: Option<u16>,
    #[serde(default)]
    pub hide_on_narrow: bool,
    #[serde(default)]
    pub kind: ColumnKind,
}

impl ColumnConfig {
    /// The row field this column reads.
    pub fn field(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.key)
    }
}

/// One filter tab.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterConfig {
    pub key: String,
    pub label: String,
    pub value: FilterValue,
}

/// A field test on a row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct FieldCondition {
    pub field: String,
    /// The field must have one of these values.
    pub equals: Vec<String>,
    /// The field must have none of these values.
    pub not_equals: Vec<String>,
}

impl FieldCondition {
    /// Whether `row` passes the test.
    pub fn matches(&self, row: &JsonRow) -> bool {
        let value = row.text(&self.field);
        (self.equals.is_empty() || self.equals.iter().any(|v| *v == value))
            && !self.not_equals.iter().any(|v| *v == value)
    }
}

/// An alternate label and icon used for rows matching a condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlternateLabel {
    pub when: FieldCondition,
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// One row action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionConfig {
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Label and icon used instead for matching rows.
    #[serde(default)]
    pub alternate: Option<AlternateLabel>,
    /// `default`, `success`, `warning` or `danger`.
    #[serde(default = "default_variant")]
    pub variant: String,
    #[serde(default)]
    pub separator: bool,
    #[serde(default = "default_true")]
    pub refresh_after: bool,
    /// HTTP method of the request.
    #[serde(default = "default_method")]
    pub method: String,
    /// Request path; `{id}` and `{field}` are substituted from the row.
    pub path: String,
    /// JSON body of the request.
    #[serde(default)]
    pub body: Option<Value>,
    /// Only offer the action for rows passing this test.
    #[serde(default)]
    pub when: Option<FieldCondition>,
    /// Fields merged into the row before the request is sent.
    #[serde(default)]
    pub optimistic: Option<Map<String, Value>>,
}

fn default_variant() -> String {
    "default".to_string()
}

fn default_method() -> String {
    "PUT".to_string()
}

impl ActionConfig {
    /// The parsed visual variant.
    pub fn variant(&self) -> ActionVariant {
        ActionVariant::from_name(&self.variant).unwrap_or_default()
    }
}

impl TableConfig {
    /// Page size after applying the settings default.
    pub fn items_per_page(&self, settings: &Settings) -> u32 {
        self.items_per_page.unwrap_or(settings.items_per_page)
    }

    /// Total items mode after applying the settings default.
    pub fn total_items_mode(&self, settings: &Settings) -> TotalItemsMode {
        let name = self.total_items.as_deref().unwrap_or(&settings.total_items);
        TotalItemsMode::from_name(name).unwrap_or_default()
    }

    /// Heading text.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Validate this table.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "table name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "table name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.endpoint.trim().is_empty() {
            return Err(self.invalid("endpoint cannot be empty"));
        }

        if self.items_per_page == Some(0) {
            return Err(self.invalid("items_per_page must be greater than zero"));
        }

        if let Some(mode) = &self.total_items {
            if TotalItemsMode::from_name(mode).is_none() {
                return Err(self.invalid(&format!(
                    "total_items must be 'page' or 'server', got '{}'",
                    mode
                )));
            }
        }

        if self.columns.is_empty() {
            return Err(self.invalid("at least one column is required"));
        }

        let mut keys = HashSet::new();
        for column in &self.columns {
            if !keys.insert(column.key.as_str()) {
                return Err(self.invalid(&format!("duplicate column key '{}'", column.key)));
            }
        }

        let mut keys = HashSet::new();
        for filter in &self.filters {
            if !keys.insert(filter.key.as_str()) {
                return Err(self.invalid(&format!("duplicate filter key '{}'", filter.key)));
            }
        }

        for action in &self.actions {
            if parse_method(&action.method).is_none() {
                return Err(self.invalid(&format!(
                    "action '{}': unsupported method '{}'",
                    action.label, action.method
                )));
            }
            if ActionVariant::from_name(&action.variant).is_none() {
                return Err(self.invalid(&format!(
                    "action '{}': unknown variant '{}'",
                    action.label, action.variant
                )));
            }
            if action.path.trim().is_empty() {
                return Err(self.invalid(&format!("action '{}': path cannot be empty", action.label)));
            }
        }

        Ok(())
    }

    fn invalid(&self, message: &str) -> ConfigError {
        ConfigError::ValidationError(format!("table '{}': {}", self.name, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vendors() -> TableConfig {
        toml::from_str(
            r#"
            name = "vendors"
            title = "Vendors"
            endpoint = "/admin/vendors"
            filter_param = "status"

            [[columns]]
            key = "name"
            label = "Business"

            [[columns]]
            key = "status"
            label = "Status"
            kind = "status"

            [[filters]]
            key = "all"
            label = "All"
            value = "all"

            [[filters]]
            key = "floor"
            label = "Floor 2"
            value = 2

            [[actions]]
            label = "Approve"
            variant = "success"
            path = "/admin/vendors/{id}/approve"
            when = { field = "status", equals = ["pending"] }
            optimistic = { status = "approved" }
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_table() {
        let table = vendors();
        assert_eq!(table.display_title(), "Vendors");
        assert!(table.enable_search);
        assert_eq!(table.columns[1].kind, ColumnKind::Status);
        assert_eq!(table.columns[0].field(), "name");
        assert_eq!(table.filters[1].value, FilterValue::Number(2.0));
        assert_eq!(table.actions[0].method, "PUT");
        assert!(table.actions[0].refresh_after);
        assert_eq!(table.actions[0].variant(), ActionVariant::Success);
        assert_eq!(
            table.actions[0].optimistic.as_ref().unwrap().get("status"),
            Some(&json!("approved"))
        );
        assert_eq!(table.response, ResponseShape::default());
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_settings_defaults_apply() {
        let mut table = vendors();
        let settings = Settings::default();
        assert_eq!(table.items_per_page(&settings), 4);
        assert_eq!(table.total_items_mode(&settings), TotalItemsMode::PageRowCount);

        table.items_per_page = Some(10);
        table.total_items = Some("server".to_string());
        assert_eq!(table.items_per_page(&settings), 10);
        assert_eq!(table.total_items_mode(&settings), TotalItemsMode::ServerReported);
    }

    #[test]
    fn test_field_condition() {
        let row = JsonRow::from_value(json!({ "_id": "1", "status": "pending" }), "_id").unwrap();

        let pending = FieldCondition {
            field: "status".to_string(),
            equals: vec!["pending".to_string()],
            ..Default::default()
        };
        assert!(pending.matches(&row));

        let not_pending = FieldCondition {
            field: "status".to_string(),
            not_equals: vec!["pending".to_string(), "cancelled".to_string()],
            ..Default::default()
        };
        assert!(!not_pending.matches(&row));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut table = vendors();
        table.name = String::new();
        assert!(table
            .validate()
            .unwrap_err()
            .to_string()
            .contains("name cannot be empty"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut table = vendors();
        table.items_per_page = Some(0);
        assert!(table
            .validate()
            .unwrap_err()
            .to_string()
            .contains("greater than zero"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut table = vendors();
        table.columns.push(table.columns[0].clone());
        assert!(table
            .validate()
            .unwrap_err()
            .to_string()
            .contains("duplicate column key 'name'"));
    }

    #[test]
    fn test_bad_action_rejected() {
        let mut table = vendors();
        table.actions[0].method = "TRACE".to_string();
        assert!(table
            .validate()
            .unwrap_err()
            .to_string()
            .contains("unsupported method"));

        let mut table = vendors();
        table.actions[0].variant = "loud".to_string();
        assert!(table
            .validate()
            .unwrap_err()
            .to_string()
            .contains("unknown variant"));
    }

    #[test]
    fn test_bad_total_items_rejected() {
        let mut table = vendors();
        table.total_items = Some("rows".to_string());
        assert!(table.validate().is_err());
    }
}
