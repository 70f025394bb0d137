//! Column, action and filter descriptors supplied by the table owner.
//!
//! Descriptors are the whole configuration contract of the engine: columns map
//! a row to a rendered cell, actions describe per-row operations shown in the
//! contextual menu, and filters define the static tab set.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ratatui::text::Line;
use serde::{Deserialize, Serialize};

/// Type alias for boxed futures returned by row action handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type alias for the cell render closure of a column.
type RenderFn<R> = Arc<dyn Fn(&R) -> Line<'static> + Send + Sync>;

/// Type alias for the click handler of an action.
type ClickFn<R> = Arc<dyn Fn(R) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Type alias for the visibility predicate of an action.
type ConditionFn<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// A value that is either fixed or computed from the row at render time.
pub enum RowValue<R, T> {
    /// The same value for every row.
    Static(T),
    /// Computed from the row on every render pass.
    PerRow(Arc<dyn Fn(&R) -> T + Send + Sync>),
}

impl<R, T: Clone> RowValue<R, T> {
    /// Resolve the value for `row`.
    pub fn resolve(&self, row: &R) -> T {
        match self {
            RowValue::Static(value) => value.clone(),
            RowValue::PerRow(f) => f(row),
        }
    }
}

impl<R, T: Clone> Clone for RowValue<R, T> {
    fn clone(&self) -> Self {
        match self {
            RowValue::Static(value) => RowValue::Static(value.clone()),
            RowValue::PerRow(f) => RowValue::PerRow(Arc::clone(f)),
        }
    }
}

impl<R> From<&str> for RowValue<R, String> {
    fn from(value: &str) -> Self {
        RowValue::Static(value.to_string())
    }
}

impl<R> From<String> for RowValue<R, String> {
    fn from(value: String) -> Self {
        RowValue::Static(value)
    }
}

/// Describes one table column.
pub struct ColumnDescriptor<R> {
    /// Unique key among the table's columns.
    pub key: String,
    /// Header label.
    pub label: String,
    /// Relative layout weight.
    pub width: u16,
    /// Hide this column when the table is rendered in a narrow area.
    pub hide_on_narrow: bool,
    render: RenderFn<R>,
}

impl<R> ColumnDescriptor<R> {
    /// Create a column with weight 1 that is always shown.
    pub fn new<F>(key: impl Into<String>, label: impl Into<String>, render: F) -> Self
    where
        F: Fn(&R) -> Line<'static> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            label: label.into(),
            width: 1,
            hide_on_narrow: false,
            render: Arc::new(render),
        }
    }

    /// Set the layout weight.
    pub fn width(mut self, width: u16) -> Self {
        self.width = width.max(1);
        self
    }

    /// Hide this column on small screens.
    pub fn hidden_on_narrow(mut self) -> Self {
        self.hide_on_narrow = true;
        self
    }

    /// Render the cell for `row`.
    pub fn render(&self, row: &R) -> Line<'static> {
        (self.render)(row)
    }
}

impl<R> Clone for ColumnDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            width: self.width,
            hide_on_narrow: self.hide_on_narrow,
            render: Arc::clone(&self.render),
        }
    }
}

impl<R> fmt::Debug for ColumnDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("width", &self.width)
            .field("hide_on_narrow", &self.hide_on_narrow)
            .finish_non_exhaustive()
    }
}

/// Visual emphasis of an action menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionVariant {
    #[default]
    Default,
    Success,
    Warning,
    Danger,
}

impl ActionVariant {
    /// Parse the configuration spelling of a variant.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::Default),
            "success" => Some(Self::Success),
            "warning" => Some(Self::Warning),
            "danger" => Some(Self::Danger),
            _ => None,
        }
    }
}

/// Describes one per-row operation exposed through the row menu.
pub struct ActionDescriptor<R> {
    /// Menu label, fixed or per row.
    pub label: RowValue<R, String>,
    /// Menu icon glyph, fixed or per row.
    pub icon: RowValue<R, String>,
    /// Visual emphasis.
    pub variant: ActionVariant,
    /// Draw a divider above this entry (ignored for the first visible entry).
    pub separator: bool,
    /// Refetch the current page after a successful click.
    pub refresh_after: bool,
    condition: Option<ConditionFn<R>>,
    on_click: ClickFn<R>,
}

impl<R: 'static> ActionDescriptor<R> {
    /// Create an action with a click handler.
    ///
    /// The handler receives an owned copy of the row and runs on a background
    /// task. By default the action has no icon, is always visible and refreshes
    /// the table after it succeeds.
    pub fn new<F, Fut>(label: impl Into<RowValue<R, String>>, on_click: F) -> Self
    where
        F: Fn(R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            label: label.into(),
            icon: RowValue::Static(String::new()),
            variant: ActionVariant::Default,
            separator: false,
            refresh_after: true,
            condition: None,
            on_click: Arc::new(move |row| -> BoxFuture<'static, anyhow::Result<()>> {
                Box::pin(on_click(row))
            }),
        }
    }

    /// Compute the label from the row.
    pub fn label_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        self.label = RowValue::PerRow(Arc::new(f));
        self
    }

    /// Set a fixed icon.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = RowValue::Static(icon.into());
        self
    }

    /// Compute the icon from the row.
    pub fn icon_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        self.icon = RowValue::PerRow(Arc::new(f));
        self
    }

    /// Set the visual variant.
    pub fn variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Draw a divider above this entry.
    pub fn separator(mut self) -> Self {
        self.separator = true;
        self
    }

    /// Control whether the table refetches after a successful click.
    pub fn refresh_after(mut self, refresh: bool) -> Self {
        self.refresh_after = refresh;
        self
    }

    /// Only show this action for rows matching `condition`.
    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Whether this action applies to `row`. Evaluated fresh on every call.
    pub fn applies_to(&self, row: &R) -> bool {
        self.condition.as_ref().map_or(true, |condition| condition(row))
    }

    /// Start the click handler for `row`.
    pub fn click(&self, row: R) -> BoxFuture<'static, anyhow::Result<()>> {
        (self.on_click)(row)
    }
}

impl<R> Clone for ActionDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            icon: self.icon.clone(),
            variant: self.variant,
            separator: self.separator,
            refresh_after: self.refresh_after,
            condition: self.condition.clone(),
            on_click: Arc::clone(&self.on_click),
        }
    }
}

impl<R> fmt::Debug for ActionDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("variant", &self.variant)
            .field("separator", &self.separator)
            .field("refresh_after", &self.refresh_after)
            .field("conditional", &self.condition.is_some())
            .finish_non_exhaustive()
    }
}

/// The value a filter tab selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(text) => f.write_str(text),
            FilterValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value as f64)
    }
}

/// One tab in the static filter set.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDescriptor {
    /// Unique key of the tab.
    pub key: String,
    /// Tab label.
    pub label: String,
    /// The value made active when the tab is selected.
    pub value: FilterValue,
}

impl FilterDescriptor {
    /// Create a filter tab.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value: value.into(),
        }
    }
}

/// The active filter used before any tab is chosen.
pub fn default_filter(filters: &[FilterDescriptor]) -> String {
    filters
        .first()
        .map(|f| f.value.to_string())
        .unwrap_or_else(|| "all".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Booking {
        status: String,
    }

    fn booking(status: &str) -> Booking {
        Booking {
            status: status.to_string(),
        }
    }

    #[test]
    fn test_row_value_resolves_per_row() {
        let value: RowValue<Booking, String> =
            RowValue::PerRow(Arc::new(|b: &Booking| format!("Status: {}", b.status)));
        assert_eq!(value.resolve(&booking("pending")), "Status: pending");
        assert_eq!(value.resolve(&booking("paid")), "Status: paid");

        let fixed: RowValue<Booking, String> = "Cancel".into();
        assert_eq!(fixed.resolve(&booking("pending")), "Cancel");
    }

    #[test]
    fn test_column_render_and_width() {
        let column = ColumnDescriptor::new("status", "Status", |b: &Booking| {
            Line::from(b.status.clone())
        })
        .width(0)
        .hidden_on_narrow();

        assert_eq!(column.width, 1);
        assert!(column.hide_on_narrow);
        assert_eq!(column.render(&booking("open")).spans[0].content, "open");
    }

    #[test]
    fn test_action_defaults() {
        let action = ActionDescriptor::new("Approve", |_b: Booking| async { Ok(()) });
        assert!(action.refresh_after);
        assert!(!action.separator);
        assert_eq!(action.variant, ActionVariant::Default);
        assert!(action.applies_to(&booking("anything")));
    }

    #[test]
    fn test_action_condition_evaluated_each_call() {
        let action = ActionDescriptor::new("Approve", |_b: Booking| async { Ok(()) })
            .condition(|b: &Booking| b.status == "pending");

        let mut row = booking("pending");
        assert!(action.applies_to(&row));
        row.status = "approved".to_string();
        assert!(!action.applies_to(&row));
    }

    #[tokio::test]
    async fn test_action_click_runs_handler() {
        let action = ActionDescriptor::new("Fail", |b: Booking| async move {
            anyhow::bail!("cannot process {}", b.status)
        });
        let err = action.click(booking("paid")).await.unwrap_err();
        assert_eq!(err.to_string(), "cannot process paid");
    }

    #[test]
    fn test_variant_from_name() {
        assert_eq!(ActionVariant::from_name("danger"), Some(ActionVariant::Danger));
        assert_eq!(ActionVariant::from_name("success"), Some(ActionVariant::Success));
        assert_eq!(ActionVariant::from_name("loud"), None);
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(&[]), "all");

        let filters = vec![
            FilterDescriptor::new("pending", "Pending", "pending"),
            FilterDescriptor::new("approved", "Approved", "approved"),
        ];
        assert_eq!(default_filter(&filters), "pending");

        let numeric = vec![FilterDescriptor::new("floor", "Floor 2", 2i64)];
        assert_eq!(default_filter(&numeric), "2");
    }
}
