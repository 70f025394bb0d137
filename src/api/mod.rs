//! REST client and the table data source built on it.
//!
//! This module provides the interface for communicating with the backend.

mod client;
mod error;
mod source;
mod types;

pub use client::HttpClient;
pub use error::{ApiError, Result};
pub use source::{parse_method, FilterHandle, HttpSource, RowActionRequest, ALL_FILTER};
pub use types::{display_value, JsonRow, ResponseShape};
