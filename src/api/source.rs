//! REST-backed data source and row actions.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

use super::client::HttpClient;
use super::error::{ApiError, Result};
use super::types::{JsonRow, ResponseShape};
use crate::table::{DataSource, FetchRequest, FetchResponse, TableRow};

/// Filter value meaning "no filter".
pub const ALL_FILTER: &str = "all";

/// Shared active-filter state read by an [`HttpSource`] on every fetch.
///
/// The table's filter-change callback writes it; the source reads it.
#[derive(Debug, Clone, Default)]
pub struct FilterHandle(Arc<RwLock<String>>);

impl FilterHandle {
    pub fn new(initial: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(initial.into())))
    }

    /// Replace the active filter value.
    pub fn set(&self, value: &str) {
        let mut guard = match self.0.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = value.to_string();
    }

    /// The active filter value.
    pub fn get(&self) -> String {
        match self.0.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Fetches listing pages from a REST endpoint.
///
/// Issues `GET {endpoint}?page=&limit=&search=` and, when a filter parameter
/// is configured and the active filter is not `all`, `&{param}={filter}`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: HttpClient,
    endpoint: String,
    shape: ResponseShape,
    filter_param: Option<String>,
    filter: FilterHandle,
}

impl HttpSource {
    pub fn new(client: HttpClient, endpoint: impl Into<String>, shape: ResponseShape) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            shape,
            filter_param: None,
            filter: FilterHandle::new(ALL_FILTER),
        }
    }

    /// Send the active filter as the query parameter `param`.
    pub fn with_filter_param(mut self, param: impl Into<String>, filter: FilterHandle) -> Self {
        self.filter_param = Some(param.into());
        self.filter = filter;
        self
    }

    /// The shared filter state this source reads.
    pub fn filter_handle(&self) -> FilterHandle {
        self.filter.clone()
    }

    /// Build the query parameters for `request`.
    pub fn query(&self, request: &FetchRequest) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), request.page.to_string()),
            ("limit".to_string(), request.limit.to_string()),
        ];

        if let Some(search) = &request.search {
            query.push(("search".to_string(), search.clone()));
        }

        if let Some(param) = &self.filter_param {
            let filter = self.filter.get();
            if !filter.is_empty() && filter != ALL_FILTER {
                query.push((param.clone(), filter));
            }
        }

        query
    }
}

#[async_trait]
impl DataSource<JsonRow> for HttpSource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch(&self, request: FetchRequest) -> anyhow::Result<FetchResponse<JsonRow>> {
        let query = self.query(&request);
        let body = self.client.get_json(&self.endpoint, &query).await?;
        let response = self.shape.translate(&body)?;
        debug!(rows = response.users.len(), success = response.success, "Fetched listing page");
        Ok(response)
    }
}

/// Parse an HTTP method name used in row action configuration.
pub fn parse_method(name: &str) -> Option<Method> {
    match name.to_ascii_uppercase().as_str() {
        "GET" => Some(Method::GET),
        "POST" => Some(Method::POST),
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

/// A configured HTTP call performed against one row.
///
/// `{id}` in the path is replaced by the row identity, `{field}` by that
/// field's text. Substituted values are percent-encoded.
#[derive(Debug, Clone)]
pub struct RowActionRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl RowActionRequest {
    pub fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }

    /// The request path for `row`.
    pub fn path_for(&self, row: &JsonRow) -> String {
        let mut path = String::with_capacity(self.path.len());
        let mut rest = self.path.as_str();

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            path.push_str(&rest[..start]);
            let name = &rest[start + 1..start + len];
            let value = if name == "id" {
                row.row_id().to_string()
            } else {
                row.text(name)
            };
            path.push_str(&urlencoding::encode(&value));
            rest = &rest[start + len + 1..];
        }
        path.push_str(rest);
        path
    }

    /// Perform the request for `row`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers with
    /// `success: false`.
    pub async fn execute(&self, client: &HttpClient, row: &JsonRow) -> Result<Value> {
        let path = self.path_for(row);
        let value = client
            .send_json(self.method.clone(), &path, self.body.as_ref())
            .await?;

        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Action failed")
                .to_string();
            return Err(ApiError::Rejected(message));
        }

        Ok(value)
    }
}
