//! A table over a configured REST listing.
//!
//! [`Listing`] turns a [`TableConfig`] into a [`DataTable<JsonRow>`] backed by
//! an [`HttpSource`]. Row actions become HTTP requests; their outcome is
//! reported back through a channel so the UI can show a toast.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ratatui::text::{Line, Span};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{parse_method, FilterHandle, HttpClient, HttpSource, JsonRow, RowActionRequest};
use crate::config::{ActionConfig, ColumnConfig, ColumnKind, Settings, TableConfig};
use crate::table::{
    default_filter, ActionDescriptor, ColumnDescriptor, DataSource, DataTable, FilterDescriptor,
    TableError, TableOptions, TableRow,
};
use crate::ui::theme::TableTheme;

/// The result of one row action request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub label: String,
    pub row_id: String,
    /// The failure message, if the request failed.
    pub error: Option<String>,
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A configured listing: the table engine plus the action plumbing around it.
pub struct Listing {
    name: String,
    table: DataTable<JsonRow>,
    /// Optimistic patches, by action index.
    patches: Vec<Option<Map<String, Value>>>,
    /// Patched actions still in flight, per row.
    patched: HashMap<String, usize>,
    outcome_rx: mpsc::UnboundedReceiver<ActionOutcome>,
}

impl Listing {
    /// Build the listing described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the page size is zero or two columns share a key.
    pub fn build(
        config: &TableConfig,
        settings: &Settings,
        client: HttpClient,
        theme: &TableTheme,
    ) -> Result<Self, TableError> {
        let filters: Vec<FilterDescriptor> = config
            .filters
            .iter()
            .map(|f| FilterDescriptor::new(f.key.clone(), f.label.clone(), f.value.clone()))
            .collect();

        let filter = FilterHandle::new(default_filter(&filters));
        let mut source = HttpSource::new(client.clone(), config.endpoint.clone(), config.response.clone());
        if let Some(param) = &config.filter_param {
            source = source.with_filter_param(param.clone(), filter.clone());
        }
        let source: Arc<dyn DataSource<JsonRow>> = Arc::new(source);

        let columns = config
            .columns
            .iter()
            .map(|c| column(c, theme))
            .collect();

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let actions = config
            .actions
            .iter()
            .map(|a| action(a, &client, &outcome_tx))
            .collect();
        let patches = config.actions.iter().map(|a| a.optimistic.clone()).collect();

        let table = DataTable::new(source, columns, options(config, settings, filter))?
            .with_filters(filters)
            .with_actions(actions);

        info!(table = %config.name, endpoint = %config.endpoint, "Listing built");

        Ok(Self {
            name: config.name.clone(),
            table,
            patches,
            patched: HashMap::new(),
            outcome_rx,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &DataTable<JsonRow> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut DataTable<JsonRow> {
        &mut self.table
    }

    /// Dispatch the action at `index` on `row_id`, then apply its optimistic patch.
    ///
    /// The patch is merged after dispatch so the action's condition is tested
    /// against the row as the user saw it.
    pub fn run_action(&mut self, index: usize, row_id: &str) -> bool {
        if !self.table.dispatch_action(index, row_id) {
            return false;
        }
        if let Some(Some(patch)) = self.patches.get(index) {
            debug!(index, row_id, "Applying optimistic patch");
            if self.table.update_item_optimistically(row_id, patch.clone()) {
                *self.patched.entry(row_id.to_string()).or_default() += 1;
            }
        }
        true
    }

    /// Apply pending table messages and collect finished actions.
    ///
    /// A failed action whose row was patched optimistically triggers a reload
    /// so the row shows the server state again.
    pub fn poll(&mut self) -> Vec<ActionOutcome> {
        self.table.poll();

        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            outcomes.push(outcome);
        }

        let mut rollback = false;
        for outcome in &outcomes {
            let was_patched = self.settle_patch(&outcome.row_id);
            rollback |= was_patched && !outcome.is_success();
        }
        if rollback {
            warn!("Row action failed, reloading to undo optimistic changes");
            self.table.refresh_data();
        }

        outcomes
    }
}

impl Listing {
    /// Count one patched action on `row_id` as finished.
    fn settle_patch(&mut self, row_id: &str) -> bool {
        match self.patched.get_mut(row_id) {
            Some(pending) if *pending > 1 => {
                *pending -= 1;
                true
            }
            Some(_) => {
                self.patched.remove(row_id);
                true
            }
            None => false,
        }
    }
}

fn options(config: &TableConfig, settings: &Settings, filter: FilterHandle) -> TableOptions {
    let mut options = TableOptions::new()
        .items_per_page(config.items_per_page(settings))
        .enable_search(config.enable_search)
        .enable_pagination(config.enable_pagination)
        .enable_actions(config.enable_actions)
        .search_debounce(Duration::from_millis(settings.search_debounce_ms))
        .total_items_mode(config.total_items_mode(settings))
        .title(config.display_title())
        .on_filter_change(move |value| filter.set(value));

    if let Some(placeholder) = &config.search_placeholder {
        options = options.search_placeholder(placeholder.clone());
    }
    if let Some(message) = &config.empty_message {
        options = options.empty_message(message.clone());
    }
    if let Some(message) = &config.loading_message {
        options = options.loading_message(message.clone());
    }
    options
}

fn column(config: &ColumnConfig, theme: &TableTheme) -> ColumnDescriptor<JsonRow> {
    let field = config.field().to_string();
    let kind = config.kind;
    let theme = theme.clone();

    let mut descriptor = ColumnDescriptor::new(
        config.key.clone(),
        config.label.clone(),
        move |row: &JsonRow| {
            let text = row.text(&field);
            let style = match kind {
                ColumnKind::Text => theme.text(),
                ColumnKind::Status => theme.status(&text),
                ColumnKind::Muted => theme.muted(),
            };
            Line::from(Span::styled(text, style))
        },
    );
    if let Some(width) = config.width {
        descriptor = descriptor.width(width);
    }
    if config.hide_on_narrow {
        descriptor = descriptor.hidden_on_narrow();
    }
    descriptor
}

fn action(
    config: &ActionConfig,
    client: &HttpClient,
    outcomes: &mpsc::UnboundedSender<ActionOutcome>,
) -> ActionDescriptor<JsonRow> {
    let method = parse_method(&config.method).unwrap_or(reqwest::Method::PUT);
    let request = Arc::new(RowActionRequest::new(method, config.path.clone(), config.body.clone()));
    let client = client.clone();
    let outcomes = outcomes.clone();
    let label = config.label.clone();

    let mut descriptor = ActionDescriptor::new(config.label.clone(), move |row: JsonRow| {
        let request = Arc::clone(&request);
        let client = client.clone();
        let outcomes = outcomes.clone();
        let label = label.clone();
        async move {
            let result = request.execute(&client, &row).await;
            let _ = outcomes.send(ActionOutcome {
                label,
                row_id: row.row_id().to_string(),
                error: result.as_ref().err().map(|e| e.to_string()),
            });
            result.map(|_| ()).map_err(anyhow::Error::from)
        }
    })
    .variant(config.variant())
    .refresh_after(config.refresh_after);

    if let Some(icon) = &config.icon {
        descriptor = descriptor.icon(icon.clone());
    }
    if config.separator {
        descriptor = descriptor.separator();
    }

    if let Some(alternate) = config.alternate.clone() {
        let base_label = config.label.clone();
        let base_icon = config.icon.clone().unwrap_or_default();
        let when = alternate.when.clone();
        descriptor = descriptor.label_with(move |row: &JsonRow| {
            if when.matches(row) {
                alternate.label.clone()
            } else {
                base_label.clone()
            }
        });
        if let Some(alternate_icon) = alternate.icon {
            let when = alternate.when;
            descriptor = descriptor.icon_with(move |row: &JsonRow| {
                let icon = if when.matches(row) {
                    &alternate_icon
                } else {
                    &base_icon
                };
                icon.clone()
            });
        }
    }

    if let Some(condition) = config.when.clone() {
        descriptor = descriptor.condition(move |row: &JsonRow| condition.matches(row));
    }

    descriptor
}
