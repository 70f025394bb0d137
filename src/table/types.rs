//! Core data types shared by the table engine and its data sources.

use std::fmt;

/// A single record displayed as one table line.
///
/// The engine never looks inside a row except through the render functions
/// supplied by the caller. The only thing it needs is a stable identity.
pub trait TableRow: Clone + fmt::Debug + Send + Sync + 'static {
    /// The unique identity of this row.
    fn row_id(&self) -> &str;
}

/// Rows that accept a partial update merged over their current fields.
pub trait ShallowMerge {
    /// The partial set of fields to merge.
    type Patch;

    /// Merge `patch` into this row, replacing only the fields it names.
    fn shallow_merge(&mut self, patch: Self::Patch);
}

/// Parameters passed to the data source for one page of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// The 1-based page number.
    pub page: u32,
    /// The configured page size.
    pub limit: u32,
    /// The trimmed search query, present only when search is enabled and non-empty.
    pub search: Option<String>,
}

/// The result a data source returns for one page.
#[derive(Debug, Clone)]
pub struct FetchResponse<R> {
    /// Whether the backend accepted the request.
    pub success: bool,
    /// The rows of the requested page.
    pub users: Vec<R>,
    /// The page the backend actually served.
    pub current_page: Option<u32>,
    /// Number of pages available.
    pub total_pages: Option<u32>,
    /// Grand total of matching rows, if the backend reports it.
    pub total_items: Option<u64>,
    /// Error description when `success` is false.
    pub message: Option<String>,
}

impl<R> FetchResponse<R> {
    /// A successful response carrying `rows`.
    pub fn ok(rows: Vec<R>) -> Self {
        Self {
            success: true,
            users: rows,
            current_page: None,
            total_pages: None,
            total_items: None,
            message: None,
        }
    }

    /// A rejected response with an optional message.
    pub fn failure(message: Option<String>) -> Self {
        Self {
            success: false,
            users: Vec::new(),
            current_page: None,
            total_pages: None,
            total_items: None,
            message,
        }
    }

    /// Set the page the backend served.
    pub fn with_current_page(mut self, page: u32) -> Self {
        self.current_page = Some(page);
        self
    }

    /// Set the number of available pages.
    pub fn with_total_pages(mut self, total: u32) -> Self {
        self.total_pages = Some(total);
        self
    }

    /// Set the grand total of matching rows.
    pub fn with_total_items(mut self, total: u64) -> Self {
        self.total_items = Some(total);
        self
    }
}

/// How the "N total items" figure is computed after a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalItemsMode {
    /// Count of rows returned for the current page.
    #[default]
    PageRowCount,
    /// Grand total reported by the backend, falling back to the page count.
    ServerReported,
}

impl TotalItemsMode {
    /// Parse the configuration spelling of a mode.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "page" => Some(Self::PageRowCount),
            "server" => Some(Self::ServerReported),
            _ => None,
        }
    }
}

/// Paging state of the currently displayed rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// The current page, always at least 1.
    pub current_page: u32,
    /// Number of pages available.
    pub total_pages: u32,
    /// Number of items shown in the "total items" label.
    pub total_items: u64,
    /// Fixed page size.
    pub items_per_page: u32,
}

impl Pagination {
    /// Create pagination state for an empty table.
    pub fn new(items_per_page: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            total_items: 0,
            items_per_page,
        }
    }

    /// Zero the page and item counts, keeping the current page and page size.
    pub fn clear_counts(&mut self) {
        self.total_pages = 0;
        self.total_items = 0;
    }
}
