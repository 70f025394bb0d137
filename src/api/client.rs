//! REST client implementation.
//!
//! This module provides the HTTP client used by the table data sources and the
//! row actions. It handles authentication, request/response processing, error
//! mapping and retry logic.

use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::error::{ApiError, Result};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// The backend REST client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// The HTTP client.
    client: Client,
    /// The base URL of the backend, without a trailing slash.
    base_url: String,
    /// Bearer token sent with every request.
    token: Option<String>,
}

impl HttpClient {
    /// Create a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s) or the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)?;

        info!(base_url = %base_url, authenticated = token.is_some(), "Created API client");
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Build the absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Perform a GET request with query parameters and parse the JSON body.
    ///
    /// Transient failures are retried with exponential backoff.
    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        self.get(path, query).await
    }

    /// Perform a request carrying an optional JSON body.
    ///
    /// Sent exactly once: a failed write is reported, never repeated.
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url(path);
        self.execute(method, &url, &[], body).await
    }

    /// Perform a GET request with retry logic for transient failures.
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        let url = self.url(path);
        let mut attempts = 0;
        let mut last_error: Option<ApiError> = None;

        while attempts < MAX_RETRIES {
            attempts += 1;
            debug!("Request attempt {}/{}", attempts, MAX_RETRIES);

            match self.execute(Method::GET, &url, query, None).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if e.is_retryable() && attempts < MAX_RETRIES {
                        let delay = calculate_retry_delay(attempts);
                        warn!(
                            "Request failed (attempt {}), retrying in {}ms: {}",
                            attempts, delay, e
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or(ApiError::ServerError("Max retries exceeded".to_string())))
    }

    /// Execute a single request.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        handle_response(response).await
    }
}

/// Handle the HTTP response, checking for errors and parsing JSON.
async fn handle_response(response: Response) -> Result<Value> {
    let status = response.status();
    let url = response.url().to_string();

    if status.is_success() {
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    } else {
        let error_body = response.text().await.unwrap_or_default();
        debug!("Error response body: {}", error_body);

        Err(error_from_response(status, &url, &error_body))
    }
}

/// Create an appropriate error from an HTTP response.
fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
    let context = extract_error_message(body).unwrap_or_else(|| url.to_string());
    ApiError::from_status(status, &context)
}

/// Pull a human-readable message out of a JSON error body.
///
/// Looks at `message`, then `error` (either a string or an object with its
/// own `message`).
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    if let Some(message) = json.get("message").and_then(Value::as_str) {
        if !message.is_empty() {
            return Some(message.to_string());
        }
    }

    match json.get("error") {
        Some(Value::String(error)) if !error.is_empty() => Some(error.clone()),
        Some(Value::Object(error)) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Calculate retry delay with exponential backoff.
fn calculate_retry_delay(attempt: u32) -> u64 {
    RETRY_DELAY_MS * 2u64.pow(attempt - 1)
}

/// Normalize the base URL by removing trailing slashes and checking the scheme.
fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::InvalidUrl(url.to_string()));
    }

    // Warn if not HTTPS (but don't enforce for localhost/testing)
    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve `500` with a JSON message on every connection, counting them.
    async fn failing_server() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let body = r#"{"message":"boom"}"#;
                let response = format!(
                    "HTTP/1.1 500 Internal Server Error\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), hits)
    }

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://api.deskhub.io/").unwrap(),
            "https://api.deskhub.io"
        );
    }

    #[test]
    fn test_normalize_base_url_handles_multiple_slashes() {
        assert_eq!(
            normalize_base_url("http://localhost:5000///").unwrap(),
            "http://localhost:5000"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_missing_scheme() {
        assert!(matches!(
            normalize_base_url("api.deskhub.io"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_url_joins_paths() {
        let client = HttpClient::new("https://api.deskhub.io/v1/", None).unwrap();
        assert_eq!(
            client.url("/admin/vendors"),
            "https://api.deskhub.io/v1/admin/vendors"
        );
        assert_eq!(client.url("bookings"), "https://api.deskhub.io/v1/bookings");
        assert_eq!(
            client.url("https://other.host/x"),
            "https://other.host/x"
        );
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"success":false,"message":"Vendor not found"}"#),
            Some("Vendor not found".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"error":"jwt expired"}"#),
            Some("jwt expired".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"bad id"}}"#),
            Some("bad id".to_string())
        );
        assert_eq!(extract_error_message("<html>502</html>"), None);
        assert_eq!(extract_error_message(r#"{"message":""}"#), None);
    }

    #[test]
    fn test_error_from_response_prefers_body_message() {
        let err = error_from_response(
            StatusCode::NOT_FOUND,
            "https://api/x",
            r#"{"message":"Space not found"}"#,
        );
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Space not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }

        let err = error_from_response(StatusCode::NOT_FOUND, "https://api/x", "");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "https://api/x"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_retry_delay_exponential() {
        assert_eq!(calculate_retry_delay(1), 1000);
        assert_eq!(calculate_retry_delay(2), 2000);
        assert_eq!(calculate_retry_delay(3), 4000);
    }

    #[tokio::test]
    async fn test_send_json_is_not_retried() {
        let (base_url, hits) = failing_server().await;
        let client = HttpClient::new(&base_url, None).unwrap();

        let result = client
            .send_json(Method::POST, "/bookings/b1/cancel", None)
            .await;

        match result {
            Err(ApiError::ServerError(msg)) => assert!(msg.contains("boom")),
            other => panic!("Expected ServerError, got {:?}", other),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
