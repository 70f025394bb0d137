//! The generic table engine.
//!
//! [`DataTable`] is the single source of truth for which rows are displayed
//! and which page, filter and search produced them. It follows the same task
//! pattern as the rest of the application:
//!
//! 1. An operation (page change, filter change, settled search, row action)
//!    spawns a tokio task instead of awaiting inline.
//! 2. The task sends a [`TableMessage`] back through an unbounded channel.
//! 3. The owner drains the channel with [`DataTable::poll`] on every tick (or
//!    awaits [`DataTable::process_next`]) and the engine applies the result.
//!
//! Every fetch is tagged with a sequence number; only the response to the most
//! recently issued request is applied, so a slow response can never overwrite
//! the rows of a newer one.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::debounce::Debouncer;
use super::descriptor::{
    default_filter, ActionDescriptor, ActionVariant, ColumnDescriptor, FilterDescriptor,
};
use super::options::TableOptions;
use super::pagination::show_pagination;
use super::source::DataSource;
use super::types::{
    FetchRequest, FetchResponse, Pagination, ShallowMerge, TableRow, TotalItemsMode,
};

/// Banner text when the data source fails outright.
pub const FETCH_ERROR_MESSAGE: &str = "An error occurred while fetching data";

/// Banner text when the backend rejects a request without a message.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data";

/// Errors raised while building a table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// The page size must be positive.
    #[error("items per page must be greater than zero")]
    ZeroPageSize,

    /// Two columns share a key.
    #[error("duplicate column key: {0}")]
    DuplicateColumn(String),
}

/// Results delivered from background tasks to the table.
#[derive(Debug)]
pub enum TableMessage<R> {
    /// A page fetch finished.
    Fetched {
        seq: u64,
        requested_page: u32,
        result: anyhow::Result<FetchResponse<R>>,
    },

    /// The search debounce timer fired.
    SearchSettled { generation: u64 },

    /// A row action handler finished.
    ActionFinished {
        action: String,
        row_id: String,
        refresh_after: bool,
        result: anyhow::Result<()>,
    },
}

/// An action entry resolved for one row, ready to be shown in the row menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleAction {
    /// Index of the action in the table's descriptor list.
    pub index: usize,
    /// Resolved label.
    pub label: String,
    /// Resolved icon glyph.
    pub icon: String,
    /// Visual emphasis.
    pub variant: ActionVariant,
    /// Draw a divider above this entry.
    pub separator_before: bool,
}

/// A paginated, searchable, filterable table over rows of type `R`.
pub struct DataTable<R: TableRow> {
    columns: Vec<ColumnDescriptor<R>>,
    actions: Vec<ActionDescriptor<R>>,
    filters: Vec<FilterDescriptor>,
    source: Arc<dyn DataSource<R>>,
    options: TableOptions,

    rows: Vec<R>,
    pagination: Pagination,
    active_filter: String,
    search_query: String,
    active_menu: Option<String>,
    loading: bool,
    error: Option<String>,

    /// Sequence number of the most recently issued fetch.
    request_seq: u64,
    debouncer: Debouncer,
    tx: mpsc::UnboundedSender<TableMessage<R>>,
    rx: mpsc::UnboundedReceiver<TableMessage<R>>,
}

impl<R: TableRow> DataTable<R> {
    /// Create a table over `source` with the given columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the page size is zero or two columns share a key.
    pub fn new(
        source: Arc<dyn DataSource<R>>,
        columns: Vec<ColumnDescriptor<R>>,
        options: TableOptions,
    ) -> Result<Self, TableError> {
        if options.items_per_page == 0 {
            return Err(TableError::ZeroPageSize);
        }

        let mut keys = HashSet::new();
        for column in &columns {
            if !keys.insert(column.key.as_str()) {
                return Err(TableError::DuplicateColumn(column.key.clone()));
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            columns,
            actions: Vec::new(),
            filters: Vec::new(),
            source,
            pagination: Pagination::new(options.items_per_page),
            debouncer: Debouncer::new(options.search_debounce),
            options,
            rows: Vec::new(),
            active_filter: default_filter(&[]),
            search_query: String::new(),
            active_menu: None,
            loading: false,
            error: None,
            request_seq: 0,
            tx,
            rx,
        })
    }

    /// Set the row actions.
    pub fn with_actions(mut self, actions: Vec<ActionDescriptor<R>>) -> Self {
        self.actions = actions;
        self
    }

    /// Set the filter tabs and make the first one active.
    pub fn with_filters(mut self, filters: Vec<FilterDescriptor>) -> Self {
        self.active_filter = default_filter(&filters);
        self.filters = filters;
        self
    }

    // ========================================================================
    // State accessors
    // ========================================================================

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Find a loaded row by identity.
    pub fn row(&self, id: &str) -> Option<&R> {
        self.rows.iter().find(|row| row.row_id() == id)
    }

    pub fn columns(&self) -> &[ColumnDescriptor<R>] {
        &self.columns
    }

    pub fn actions(&self) -> &[ActionDescriptor<R>] {
        &self.actions
    }

    pub fn filters(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn active_filter(&self) -> &str {
        &self.active_filter
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Identity of the row whose menu is open.
    pub fn active_menu(&self) -> Option<&str> {
        self.active_menu.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The error banner text, if the last fetch failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the actions column and row menus are shown.
    pub fn has_actions(&self) -> bool {
        self.options.enable_actions && !self.actions.is_empty()
    }

    /// Whether the pagination strip is shown.
    pub fn shows_pagination(&self) -> bool {
        show_pagination(
            self.options.enable_pagination,
            self.loading,
            self.pagination.total_pages,
        )
    }

    /// The "N total items" label.
    pub fn total_items_label(&self) -> String {
        format!("{} total items", self.pagination.total_items)
    }

    // ========================================================================
    // Fetch orchestration
    // ========================================================================

    /// Issue the initial fetch of the first page.
    pub fn mount(&mut self) {
        debug!(filter = %self.active_filter, "Mounting table");
        let search = self.search_query.clone();
        self.load_data(1, &search);
    }

    /// Fetch `page` with `search` from the data source.
    ///
    /// Sets the loading flag and clears any error immediately; the result is
    /// applied when the owner next drains the message channel.
    pub fn load_data(&mut self, page: u32, search: &str) {
        self.request_seq += 1;
        let seq = self.request_seq;

        self.loading = true;
        self.error = None;

        let request = self.build_request(page, search);
        debug!(seq, page, limit = request.limit, search = ?request.search, "Loading table data");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.fetch(request).await;
            let _ = tx.send(TableMessage::Fetched {
                seq,
                requested_page: page,
                result,
            });
        });
    }

    fn build_request(&self, page: u32, search: &str) -> FetchRequest {
        let trimmed = search.trim();
        let search = if self.options.enable_search && !trimmed.is_empty() {
            Some(trimmed.to_string())
        } else {
            None
        };

        FetchRequest {
            page,
            limit: self.options.items_per_page,
            search,
        }
    }

    /// Reload the current page, search and filter.
    ///
    /// Any optimistic patches not yet persisted by the backend are discarded.
    pub fn refresh_data(&mut self) {
        let page = self.pagination.current_page;
        let search = self.search_query.clone();
        self.load_data(page, &search);
    }

    /// Request a page change. Pages outside `[1, total_pages]` are ignored.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if !self.pagination.contains_page(page) {
            debug!(page, total_pages = self.pagination.total_pages, "Ignoring out-of-range page");
            return false;
        }
        let search = self.search_query.clone();
        self.load_data(page, &search);
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.pagination.current_page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to_page(self.pagination.current_page.saturating_sub(1))
    }

    /// Make `value` the active filter and reload from the first page.
    ///
    /// The owner's filter callback runs before the fetch starts so that a data
    /// source reading shared filter state sees the new value.
    pub fn set_active_filter(&mut self, value: &str) -> bool {
        if self.active_filter == value {
            return false;
        }

        info!(filter = %value, "Active filter changed");
        self.active_filter = value.to_string();
        if let Some(callback) = self.options.on_filter_change.clone() {
            callback(value);
        }

        let search = self.search_query.clone();
        self.load_data(1, &search);
        true
    }

    /// Activate the filter tab at `index`.
    pub fn select_filter(&mut self, index: usize) -> bool {
        match self.filters.get(index) {
            Some(filter) => {
                let value = filter.value.to_string();
                self.set_active_filter(&value)
            }
            None => false,
        }
    }

    /// Replace the search query and schedule a debounced reload of page 1.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if self.search_query == query {
            return;
        }
        self.search_query = query;

        let tx = self.tx.clone();
        self.debouncer.schedule(move |generation| {
            let _ = tx.send(TableMessage::SearchSettled { generation });
        });
    }

    // ========================================================================
    // Message handling
    // ========================================================================

    /// Apply every message that is ready without waiting.
    ///
    /// Returns the number of messages applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    /// Wait for the next message and apply it.
    pub async fn process_next(&mut self) {
        if let Some(message) = self.rx.recv().await {
            self.apply(message);
        }
    }

    /// Apply a single message to the table state.
    pub fn apply(&mut self, message: TableMessage<R>) {
        match message {
            TableMessage::Fetched {
                seq,
                requested_page,
                result,
            } => self.apply_fetch(seq, requested_page, result),
            TableMessage::SearchSettled { generation } => {
                if self.debouncer.settle(generation) {
                    let search = self.search_query.clone();
                    self.load_data(1, &search);
                }
            }
            TableMessage::ActionFinished {
                action,
                row_id,
                refresh_after,
                result,
            } => self.apply_action_result(&action, &row_id, refresh_after, result),
        }
    }

    fn apply_fetch(
        &mut self,
        seq: u64,
        requested_page: u32,
        result: anyhow::Result<FetchResponse<R>>,
    ) {
        if seq != self.request_seq {
            debug!(seq, latest = self.request_seq, "Discarding stale response");
            return;
        }

        self.loading = false;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Failed to fetch table data");
                self.fail(FETCH_ERROR_MESSAGE.to_string());
                return;
            }
        };

        if !response.success {
            let message = response
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FETCH_FAILED_MESSAGE.to_string());
            warn!(message = %message, "Data source rejected the request");
            self.fail(message);
            return;
        }

        let rows = response.users;
        let total_items = match self.options.total_items_mode {
            TotalItemsMode::PageRowCount => rows.len() as u64,
            TotalItemsMode::ServerReported => {
                response.total_items.unwrap_or(rows.len() as u64)
            }
        };

        self.pagination.total_pages = response.total_pages.unwrap_or(0);
        self.pagination.current_page = self
            .pagination
            .clamp(response.current_page.unwrap_or(requested_page));
        self.pagination.total_items = total_items;
        self.rows = rows;

        if let Some(id) = &self.active_menu {
            if !self.rows.iter().any(|row| row.row_id() == id) {
                self.active_menu = None;
            }
        }

        debug!(
            rows = self.rows.len(),
            page = self.pagination.current_page,
            total_pages = self.pagination.total_pages,
            "Table data loaded"
        );
    }

    fn fail(&mut self, message: String) {
        self.rows.clear();
        self.pagination.clear_counts();
        self.active_menu = None;
        self.error = Some(message);
    }

    // ========================================================================
    // Row menu and action dispatch
    // ========================================================================

    /// Open the menu of `row_id`, or close it if it is already open.
    ///
    /// At most one menu is open at a time.
    pub fn toggle_menu(&mut self, row_id: &str) {
        if !self.has_actions() {
            return;
        }
        if self.active_menu.as_deref() == Some(row_id) {
            self.active_menu = None;
        } else {
            self.active_menu = Some(row_id.to_string());
        }
    }

    pub fn close_menu(&mut self) {
        self.active_menu = None;
    }

    /// The menu entries for `row`, in descriptor order.
    ///
    /// Conditions, labels and icons are evaluated on every call.
    pub fn visible_actions(&self, row: &R) -> Vec<VisibleAction> {
        if !self.has_actions() {
            return Vec::new();
        }

        let mut visible: Vec<VisibleAction> = Vec::new();
        for (index, action) in self.actions.iter().enumerate() {
            if !action.applies_to(row) {
                continue;
            }
            let separator_before = action.separator && !visible.is_empty();
            visible.push(VisibleAction {
                index,
                label: action.label.resolve(row),
                icon: action.icon.resolve(row),
                variant: action.variant,
                separator_before,
            });
        }
        visible
    }

    /// Run the action at `index` against the row `row_id`.
    ///
    /// The menu is closed first. Returns `false` if the action does not exist
    /// or does not apply to the row.
    pub fn dispatch_action(&mut self, index: usize, row_id: &str) -> bool {
        self.close_menu();

        if !self.has_actions() {
            return false;
        }
        let Some(action) = self.actions.get(index) else {
            warn!(index, "Unknown row action");
            return false;
        };
        let Some(row) = self.row(row_id).cloned() else {
            warn!(row_id, "Row action for a row that is not loaded");
            return false;
        };
        if !action.applies_to(&row) {
            debug!(index, row_id, "Row action does not apply to row");
            return false;
        }

        let label = action.label.resolve(&row);
        let refresh_after = action.refresh_after;
        let future = action.click(row);
        info!(action = %label, row_id, "Dispatching row action");

        let tx = self.tx.clone();
        let row_id = row_id.to_string();
        tokio::spawn(async move {
            let result = future.await;
            let _ = tx.send(TableMessage::ActionFinished {
                action: label,
                row_id,
                refresh_after,
                result,
            });
        });
        true
    }

    fn apply_action_result(
        &mut self,
        action: &str,
        row_id: &str,
        refresh_after: bool,
        result: anyhow::Result<()>,
    ) {
        if let Err(e) = result {
            error!(action, row_id, error = %e, "Row action failed");
            return;
        }

        if let Some(callback) = self.options.on_refresh.clone() {
            debug!(action, "Delegating refresh to owner");
            callback();
        } else if refresh_after {
            self.refresh_data();
        } else {
            debug!(action, "Row action completed without refresh");
        }
    }

    // ========================================================================
    // Optimistic updates
    // ========================================================================

    /// Apply `update` to the loaded row `id`.
    ///
    /// Returns `false` without touching anything if the row is not on the
    /// current page.
    pub fn update_item_with<F>(&mut self, id: &str, update: F) -> bool
    where
        F: FnOnce(&mut R),
    {
        match self.rows.iter_mut().find(|row| row.row_id() == id) {
            Some(row) => {
                update(row);
                true
            }
            None => {
                debug!(id, "Optimistic update for a row that is not loaded");
                false
            }
        }
    }
}

impl<R: TableRow + ShallowMerge> DataTable<R> {
    /// Merge `patch` into the loaded row `id` without a round trip.
    ///
    /// Other rows and the pagination counts are left untouched.
    pub fn update_item_optimistically(&mut self, id: &str, patch: R::Patch) -> bool {
        self.update_item_with(id, |row| row.shallow_merge(patch))
    }
}
