//! Generic paginated table engine.
//!
//! The engine owns the displayed rows, the paging state, the active filter and
//! the search query. Rows come from a [`DataSource`]; columns, row actions and
//! filter tabs are described declaratively and rendered by the UI layer.

pub mod debounce;
pub mod descriptor;
pub mod engine;
pub mod options;
pub mod pagination;
pub mod source;
pub mod types;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use descriptor::{
    default_filter, ActionDescriptor, ActionVariant, BoxFuture, ColumnDescriptor,
    FilterDescriptor, FilterValue, RowValue,
};
pub use engine::{
    DataTable, TableError, TableMessage, VisibleAction, FETCH_ERROR_MESSAGE,
    FETCH_FAILED_MESSAGE,
};
pub use options::{TableOptions, DEFAULT_ITEMS_PER_PAGE};
pub use pagination::{page_window, show_pagination, WINDOW_SIZE};
pub use source::{DataSource, FnSource};
pub use types::{FetchRequest, FetchResponse, Pagination, ShallowMerge, TableRow, TotalItemsMode};
