//! Bearer token source.
//!
//! Acquiring and refreshing tokens happens elsewhere; uploads only need a
//! token string to attach to each request.

use std::future::Future;
use std::pin::Pin;

use crate::error::UploadError;

/// Supplies the bearer token for a batch of requests.
pub trait TokenProvider: Send + Sync {
    /// Returns a valid bearer token, refreshing it first if needed.
    fn token(&self) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send + '_>>;
}

/// A token acquired ahead of time.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send + '_>> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}
