//! Response guard enforcing preset caching headers
//!
//! The guard wraps an outbound response sink and polices the caching
//! headers (`Cache-Control`, `Expires`, `Pragma`). While locked, plain
//! writes to those headers are silently discarded; a header name carrying
//! the `Force-` prefix always goes through with the prefix stripped, the
//! escape hatch for trusted internal callers. A full reset while locked
//! preserves the policed headers across the reset.

use crate::models::{FILTERED_HEADER_NAMES, FORCE_HEADER_PREFIX};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::str::FromStr;
use tracing::{debug, warn};

/// Outbound response sink the guard wraps; transport is not part of the
/// core and is provided by the embedding server adapter
pub trait ResponseSink {
    /// Set a header, replacing any previous value
    fn set_header(&mut self, name: &str, value: &str);

    /// Add a header value without replacing previous ones
    fn add_header(&mut self, name: &str, value: &str);

    /// First value of the named header, if present
    fn header(&self, name: &str) -> Option<String>;

    fn contains_header(&self, name: &str) -> bool;

    /// Names of all headers currently present
    fn header_names(&self) -> Vec<String>;

    /// Clear all headers, e.g. on error-page rewrite
    fn reset(&mut self);
}

/// In-memory response backed by an [`http::HeaderMap`]; the sink used by
/// tests and by embedders that assemble responses themselves
#[derive(Debug, Default, Clone)]
pub struct MemoryResponse {
    headers: HeaderMap,
}

impl MemoryResponse {
    pub fn new() -> Self {
        MemoryResponse::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn parse(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
        let name = match HeaderName::from_str(name) {
            Ok(name) => name,
            Err(_) => {
                warn!("Ignoring invalid header name '{}'", name);
                return None;
            }
        };
        let value = match HeaderValue::from_str(value) {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid value for header '{}'", name);
                return None;
            }
        };
        Some((name, value))
    }
}

impl ResponseSink for MemoryResponse {
    fn set_header(&mut self, name: &str, value: &str) {
        if let Some((name, value)) = Self::parse(name, value) {
            self.headers.insert(name, value);
        }
    }

    fn add_header(&mut self, name: &str, value: &str) {
        if let Some((name, value)) = Self::parse(name, value) {
            self.headers.append(name, value);
        }
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    fn contains_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    fn header_names(&self) -> Vec<String> {
        self.headers.keys().map(|k| k.as_str().to_string()).collect()
    }

    fn reset(&mut self) {
        self.headers.clear();
    }
}

/// Per-request wrapper policing the caching headers of a response sink
///
/// State is `UNLOCKED` initially; `lock_filtered_headers` is called once
/// in strict mode after the preset header has been written. The state is
/// scoped to a single request/response exchange.
pub struct ResponseGuard<S: ResponseSink> {
    inner: S,
    locked: bool,
}

fn is_filtered(name: &str) -> bool {
    FILTERED_HEADER_NAMES
        .iter()
        .any(|filtered| filtered.eq_ignore_ascii_case(name))
}

impl<S: ResponseSink> ResponseGuard<S> {
    pub fn new(inner: S) -> Self {
        ResponseGuard {
            inner,
            locked: false,
        }
    }

    /// Lock the caching headers for the remainder of the request
    pub fn lock_filtered_headers(&mut self) {
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Set a header through the guard. `Force-`-prefixed names always
    /// write the underlying header; locked caching headers are silently
    /// discarded; anything else passes through.
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let Some(underlying) = name.strip_prefix(FORCE_HEADER_PREFIX) {
            debug!("Overriding header {} with value {}", underlying, value);
            self.inner.set_header(underlying, value);
        } else if is_filtered(name) {
            if self.locked {
                debug!("Ignoring filtered header {} with value {}", name, value);
            } else {
                debug!("Setting filtered header {} with value {}", name, value);
                self.inner.set_header(name, value);
            }
        } else {
            self.inner.set_header(name, value);
        }
    }

    /// Add a header through the guard; caching headers collapse to a
    /// single value under the same policing as `set_header`
    pub fn add_header(&mut self, name: &str, value: &str) {
        if is_filtered(name) {
            if self.locked {
                debug!("Ignoring filtered header {} with value {}", name, value);
            } else {
                self.inner.set_header(name, value);
            }
        } else {
            self.inner.add_header(name, value);
        }
    }

    /// Reset the response. While locked, the policed headers are
    /// snapshotted beforehand and restored afterward so a reset never
    /// drops the lock's effect.
    pub fn reset(&mut self) {
        let mut preserved: Vec<(&str, String)> = Vec::new();
        if self.locked {
            for name in FILTERED_HEADER_NAMES {
                if let Some(value) = self.inner.header(name) {
                    preserved.push((name, value));
                }
            }
        }
        self.inner.reset();
        for (name, value) in preserved {
            self.inner.set_header(name, &value);
        }
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.inner.header(name)
    }

    pub fn contains_header(&self, name: &str) -> bool {
        self.inner.contains_header(name)
    }

    pub fn header_names(&self) -> Vec<String> {
        self.inner.header_names()
    }

    /// Unwrap the underlying sink at the end of the exchange
    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_response_set_and_add() {
        let mut response = MemoryResponse::new();
        response.set_header("X-Test", "1");
        response.set_header("X-Test", "2");
        assert_eq!(response.header("X-Test"), Some("2".to_string()));

        response.add_header("Vary", "Accept");
        response.add_header("Vary", "Cookie");
        assert_eq!(response.headers().get_all("Vary").iter().count(), 2);
    }

    #[test]
    fn test_memory_response_ignores_invalid_values() {
        let mut response = MemoryResponse::new();
        response.set_header("X-Bad", "line\nbreak");
        assert!(!response.contains_header("X-Bad"));
        response.set_header("bad name", "value");
        assert!(response.header_names().is_empty());
    }

    #[test]
    fn test_unlocked_guard_passes_filtered_headers() {
        let mut guard = ResponseGuard::new(MemoryResponse::new());
        guard.set_header("Cache-Control", "no-store");
        assert_eq!(guard.header("Cache-Control"), Some("no-store".to_string()));
    }

    #[test]
    fn test_locked_guard_discards_filtered_headers() {
        let mut guard = ResponseGuard::new(MemoryResponse::new());
        guard.set_header("Cache-Control", "public, max-age=60");
        guard.lock_filtered_headers();

        guard.set_header("Cache-Control", "no-store");
        guard.set_header("Expires", "0");
        guard.add_header("Pragma", "no-cache");
        assert_eq!(
            guard.header("Cache-Control"),
            Some("public, max-age=60".to_string())
        );
        assert!(!guard.contains_header("Expires"));
        assert!(!guard.contains_header("Pragma"));

        // Non-filtered headers are unaffected by the lock
        guard.set_header("Content-Type", "text/html");
        assert!(guard.contains_header("Content-Type"));
    }

    #[test]
    fn test_force_prefix_bypasses_lock() {
        let mut guard = ResponseGuard::new(MemoryResponse::new());
        guard.set_header("Cache-Control", "public, max-age=60");
        guard.lock_filtered_headers();

        guard.set_header("Force-Cache-Control", "no-store");
        assert_eq!(guard.header("Cache-Control"), Some("no-store".to_string()));
    }

    #[test]
    fn test_reset_under_lock_preserves_filtered_headers() {
        let mut guard = ResponseGuard::new(MemoryResponse::new());
        guard.set_header("Cache-Control", "public, max-age=60");
        guard.set_header("Pragma", "no-cache");
        guard.set_header("X-Other", "value");
        guard.lock_filtered_headers();

        guard.reset();
        assert_eq!(
            guard.header("Cache-Control"),
            Some("public, max-age=60".to_string())
        );
        assert_eq!(guard.header("Pragma"), Some("no-cache".to_string()));
        assert!(!guard.contains_header("X-Other"));
    }

    #[test]
    fn test_reset_unlocked_clears_everything() {
        let mut guard = ResponseGuard::new(MemoryResponse::new());
        guard.set_header("Cache-Control", "public");
        guard.reset();
        assert!(guard.header_names().is_empty());
    }

    #[test]
    fn test_filtered_add_header_collapses() {
        let mut guard = ResponseGuard::new(MemoryResponse::new());
        guard.add_header("Cache-Control", "public");
        guard.add_header("Cache-Control", "no-store");
        let inner = guard.into_inner();
        assert_eq!(inner.headers().get_all("Cache-Control").iter().count(), 1);
        assert_eq!(inner.header("Cache-Control"), Some("no-store".to_string()));
    }
}
