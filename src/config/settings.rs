//! Application settings configuration.

use serde::{Deserialize, Serialize};

use crate::table::{DEFAULT_DEBOUNCE, DEFAULT_ITEMS_PER_PAGE};

/// Application-wide settings.
///
/// Table entries may override the paging and counting defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// The name of the table opened when none is given on the command line.
    pub default_table: Option<String>,
    /// The UI theme to use.
    pub theme: String,
    /// Rows per page.
    pub items_per_page: u32,
    /// Quiet period before a search query is sent, in milliseconds.
    pub search_debounce_ms: u64,
    /// How the total items label is computed: `page` or `server`.
    pub total_items: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_table: None,
            theme: "dark".to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            search_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            total_items: "page".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.items_per_page, 4);
        assert_eq!(settings.search_debounce_ms, 500);
        assert_eq!(settings.total_items, "page");
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: Settings = toml::from_str("theme = \"light\"").unwrap();
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.items_per_page, 4);
        assert!(settings.default_table.is_none());
    }
}
