//! External cache invalidation provider contract
//!
//! A named capability for purging content from a downstream cache such as
//! a CDN distribution. The resolution engine never calls it; adapters
//! (e.g. a CloudFront client) implement this trait and callers reacting
//! to content changes invoke it. Transport and authentication failures
//! surface as [`ClientCacheError::ProviderError`] and are never silently
//! swallowed, since stale downstream content is a correctness issue.

use crate::error::Result;
use async_trait::async_trait;

/// Path that invalidates everything a provider holds
pub const PURGE_ALL_PATH: &str = "/*";

/// A named external cache invalidation capability
#[async_trait]
pub trait InvalidationProvider: Send + Sync {
    /// Stable provider name, e.g. `cloudfront`
    fn name(&self) -> &str;

    /// Invalidate the given paths in one batch
    async fn invalidate_paths(&self, paths: &[String]) -> Result<()>;

    /// Invalidate a single path
    async fn invalidate(&self, path: &str) -> Result<()> {
        self.invalidate_paths(&[path.to_string()]).await
    }

    /// Invalidate everything
    async fn purge(&self) -> Result<()> {
        self.invalidate_paths(&[PURGE_ALL_PATH.to_string()]).await
    }
}
