//! deskgrid: paginated, searchable, filterable data tables in the terminal.
//!
//! The [`table`] module is a UI-independent engine: give it a
//! [`table::DataSource`], column descriptors and row actions, and it manages
//! paging, debounced search, filter tabs, the row action menu and optimistic
//! row updates. The [`ui`] module draws it with ratatui, and [`listing`] wires
//! it to a REST backend described in the configuration file.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod listing;
pub mod logging;
pub mod table;
pub mod terminal;
pub mod ui;

pub use error::{AppError, Result};
