//! Construction-time configuration of a table.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::debounce::DEFAULT_DEBOUNCE;
use super::types::TotalItemsMode;

/// Default number of rows per page.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 4;

/// Callback invoked instead of the internal refetch after an action succeeds.
pub type RefreshCallback = Arc<dyn Fn() + Send + Sync>;

/// Callback notified with the new active filter value.
pub type FilterChangeCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Display strings, feature toggles and callbacks of a table.
///
/// Everything here is fixed when the table is built; none of it is a runtime
/// trigger for a refetch.
#[derive(Clone)]
pub struct TableOptions {
    pub title: Option<String>,
    pub search_placeholder: String,
    pub empty_message: String,
    pub loading_message: String,
    pub items_per_page: u32,
    pub enable_search: bool,
    pub enable_pagination: bool,
    pub enable_actions: bool,
    pub search_debounce: Duration,
    pub total_items_mode: TotalItemsMode,
    pub on_refresh: Option<RefreshCallback>,
    pub on_filter_change: Option<FilterChangeCallback>,
}

impl TableOptions {
    /// Options with every default applied.
    pub fn new() -> Self {
        Self {
            title: None,
            search_placeholder: "Search...".to_string(),
            empty_message: "No data found".to_string(),
            loading_message: "Loading...".to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            enable_search: true,
            enable_pagination: true,
            enable_actions: true,
            search_debounce: DEFAULT_DEBOUNCE,
            total_items_mode: TotalItemsMode::default(),
            on_refresh: None,
            on_filter_change: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn search_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.search_placeholder = placeholder.into();
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn loading_message(mut self, message: impl Into<String>) -> Self {
        self.loading_message = message.into();
        self
    }

    pub fn items_per_page(mut self, items: u32) -> Self {
        self.items_per_page = items;
        self
    }

    pub fn enable_search(mut self, enabled: bool) -> Self {
        self.enable_search = enabled;
        self
    }

    pub fn enable_pagination(mut self, enabled: bool) -> Self {
        self.enable_pagination = enabled;
        self
    }

    pub fn enable_actions(mut self, enabled: bool) -> Self {
        self.enable_actions = enabled;
        self
    }

    pub fn search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    pub fn total_items_mode(mut self, mode: TotalItemsMode) -> Self {
        self.total_items_mode = mode;
        self
    }

    /// Delegate post-action refreshes to the owner.
    pub fn on_refresh<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_refresh = Some(Arc::new(f));
        self
    }

    /// Be told when the active filter changes, before the refetch starts.
    pub fn on_filter_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_filter_change = Some(Arc::new(f));
        self
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("title", &self.title)
            .field("items_per_page", &self.items_per_page)
            .field("enable_search", &self.enable_search)
            .field("enable_pagination", &self.enable_pagination)
            .field("enable_actions", &self.enable_actions)
            .field("search_debounce", &self.search_debounce)
            .field("total_items_mode", &self.total_items_mode)
            .field("on_refresh", &self.on_refresh.is_some())
            .field("on_filter_change", &self.on_filter_change.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TableOptions::default();
        assert_eq!(options.items_per_page, 4);
        assert!(options.enable_search);
        assert!(options.enable_pagination);
        assert!(options.enable_actions);
        assert_eq!(options.search_debounce, Duration::from_millis(500));
        assert_eq!(options.total_items_mode, TotalItemsMode::PageRowCount);
        assert!(options.on_refresh.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = TableOptions::new()
            .title("Vendors")
            .items_per_page(10)
            .enable_search(false)
            .on_filter_change(|_| {});

        assert_eq!(options.title.as_deref(), Some("Vendors"));
        assert_eq!(options.items_per_page, 10);
        assert!(!options.enable_search);
        assert!(options.on_filter_change.is_some());
    }
}
