//! The data-fetch contract between the table engine and its owner.

use std::future::Future;

use async_trait::async_trait;

use super::types::{FetchRequest, FetchResponse};

/// Supplies pages of rows to a table.
///
/// This is the only way rows enter the engine. Implementations must be safe
/// to call repeatedly with the same request, and must translate their own
/// response envelope into a [`FetchResponse`] before returning.
///
/// An `Err` is treated the same as a response with `success = false`: the
/// table shows an error banner and clears its rows.
#[async_trait]
pub trait DataSource<R>: Send + Sync {
    /// Fetch one page of rows.
    async fn fetch(&self, request: FetchRequest) -> anyhow::Result<FetchResponse<R>>;
}

/// A [`DataSource`] backed by a closure.
pub struct FnSource<F> {
    f: F,
}

impl<F> FnSource<F> {
    /// Wrap a closure returning a future of one page.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<R, F, Fut> DataSource<R> for FnSource<F>
where
    R: Send + 'static,
    F: Fn(FetchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<FetchResponse<R>>> + Send + 'static,
{
    async fn fetch(&self, request: FetchRequest) -> anyhow::Result<FetchResponse<R>> {
        (self.f)(request).await
    }
}
