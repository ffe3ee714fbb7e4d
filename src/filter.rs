//! Request filter presetting and enforcing the Cache-Control header
//!
//! The filter runs the full per-request sequence: resolve the preset value
//! for the request, install it on the response (falling back to the
//! default template when no rule matches), lock the caching headers in
//! strict mode, run the downstream chain against the guard, then compare
//! the final header to the preset and report any drift.

use crate::metrics::ClientCacheMetrics;
use crate::models::CacheMode;
use crate::response::{ResponseGuard, ResponseSink};
use crate::service::ClientCacheService;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const CACHE_CONTROL: &str = "Cache-Control";

/// An observed change to the preset Cache-Control header outside the
/// explicit escape-hatch path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEvent {
    /// Value the filter preset
    pub preset: String,
    /// Value present after the downstream chain, if any
    pub current: Option<String>,
    /// Mode in effect; under `Strict` the event means the lock was
    /// bypassed through an unexpected path
    pub mode: CacheMode,
}

/// Result of one filter pass, for callers that want to observe what the
/// filter decided (the filter also logs everything it reports here)
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// The resolved preset value, if a rule matched
    pub preset: Option<String>,
    /// Whether the default template value was installed instead
    pub used_default: bool,
    /// Drift between preset and final header, if any
    pub override_event: Option<OverrideEvent>,
}

/// Presets the Cache-Control header for every request and polices
/// downstream overrides
pub struct ClientCacheFilter {
    service: Arc<ClientCacheService>,
    metrics: Option<Arc<ClientCacheMetrics>>,
}

impl ClientCacheFilter {
    pub fn new(service: Arc<ClientCacheService>) -> Self {
        ClientCacheFilter {
            service,
            metrics: None,
        }
    }

    /// Enable Prometheus metrics
    pub fn with_metrics(mut self, metrics: Arc<ClientCacheMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run one request through the filter
    ///
    /// # Arguments
    /// * `method` - HTTP method of the request
    /// * `url` - full request path
    /// * `params` - dynamic template parameters for this request
    /// * `response` - the outbound response sink
    /// * `downstream` - the rest of the processing chain, handed the guard
    ///
    /// # Returns
    /// The response sink and a [`FilterOutcome`] describing what happened.
    pub fn apply<S, F>(
        &self,
        method: &str,
        url: &str,
        params: &HashMap<String, String>,
        response: S,
        downstream: F,
    ) -> (S, FilterOutcome)
    where
        S: ResponseSink,
        F: FnOnce(&mut ResponseGuard<S>),
    {
        let mut guard = ResponseGuard::new(response);
        debug!("{} {} Entering cache control preset filter", method, url);

        let mode = self.service.mode();
        let preset = self.service.resolve(method, url, params);
        let mut used_default = false;
        match &preset {
            Some(value) => {
                guard.set_header(CACHE_CONTROL, value);
                if mode == CacheMode::Strict {
                    // Strict mode prevents any further modification of the
                    // caching headers, even through reset().
                    guard.lock_filtered_headers();
                }
                debug!("[{}] Presetting Cache-Control: [{}]", url, value);
                self.record_resolution("rule");
            }
            None if !guard.contains_header(CACHE_CONTROL) => {
                let default_value = self.service.default_cache_control();
                guard.set_header(CACHE_CONTROL, &default_value);
                used_default = true;
                debug!("[{}] Presetting DEFAULT Cache-Control: [{}]", url, default_value);
                self.record_resolution("default");
            }
            None => {
                warn!(
                    "[{}] Cache-Control header left unchanged: [{}]",
                    url,
                    guard.header(CACHE_CONTROL).unwrap_or_default()
                );
                self.record_resolution("unchanged");
            }
        }

        downstream(&mut guard);

        let override_event = match &preset {
            Some(value) if !used_default && guard.header(CACHE_CONTROL).as_deref() != Some(value.as_str()) => {
                let current = guard.header(CACHE_CONTROL);
                let shown = current.as_deref().unwrap_or("Header Not Set");
                match mode {
                    CacheMode::AllowOverrides => info!(
                        "[{}] Cache-Control header overridden by another component, current value: [{}] was preset to: [{}]",
                        url, shown, value
                    ),
                    CacheMode::Strict => error!(
                        "[{}] Cache-Control header overridden/removed despite strict mode, current value: [{}] was preset to: [{}]",
                        url, shown, value
                    ),
                }
                self.record_override(&mode.to_string());
                Some(OverrideEvent {
                    preset: value.clone(),
                    current,
                    mode,
                })
            }
            _ => None,
        };

        for name in guard.header_names() {
            debug!(
                "[{}] Final header: [{}] value: [{}]",
                url,
                name,
                guard.header(&name).unwrap_or_default()
            );
        }

        (
            guard.into_inner(),
            FilterOutcome {
                preset,
                used_default,
                override_event,
            },
        )
    }

    fn record_resolution(&self, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_resolution(outcome);
        }
    }

    fn record_override(&self, mode: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_override(mode);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientCacheConfig, RuleSetConfig};
    use crate::response::MemoryResponse;

    fn filter_with(mode: CacheMode, rules: &[&str]) -> ClientCacheFilter {
        let mut config = ClientCacheConfig::default();
        config.mode = mode;
        config.rule_sets.insert(
            "test".to_string(),
            RuleSetConfig {
                name: None,
                description: None,
                rules: rules.iter().map(|r| r.to_string()).collect(),
            },
        );
        ClientCacheFilter::new(Arc::new(ClientCacheService::new(&config).unwrap()))
    }

    #[test]
    fn test_preset_from_rule() {
        let filter = filter_with(CacheMode::AllowOverrides, &["GET;/a;public, max-age=60"]);
        let (response, outcome) =
            filter.apply("GET", "/a", &HashMap::new(), MemoryResponse::new(), |_| {});
        assert_eq!(outcome.preset.as_deref(), Some("public, max-age=60"));
        assert!(!outcome.used_default);
        assert!(outcome.override_event.is_none());
        assert_eq!(
            response.header("Cache-Control").as_deref(),
            Some("public, max-age=60")
        );
    }

    #[test]
    fn test_default_when_no_rule_matches() {
        let filter = filter_with(CacheMode::AllowOverrides, &["GET;/a;x"]);
        let (response, outcome) =
            filter.apply("POST", "/api/x", &HashMap::new(), MemoryResponse::new(), |_| {});
        assert!(outcome.preset.is_none());
        assert!(outcome.used_default);
        assert_eq!(
            response.header("Cache-Control").as_deref(),
            Some("private, no-cache, no-store, must-revalidate, proxy-revalidate, max-age=0")
        );
    }

    #[test]
    fn test_existing_header_left_untouched_on_miss() {
        let filter = filter_with(CacheMode::AllowOverrides, &["GET;/a;x"]);
        let mut response = MemoryResponse::new();
        response.set_header("Cache-Control", "no-store");
        let (response, outcome) =
            filter.apply("POST", "/api/x", &HashMap::new(), response, |_| {});
        assert!(!outcome.used_default);
        assert_eq!(response.header("Cache-Control").as_deref(), Some("no-store"));
    }

    #[test]
    fn test_override_event_not_raised_for_default_preset() {
        let filter = filter_with(CacheMode::AllowOverrides, &[]);
        let (_, outcome) = filter.apply(
            "GET",
            "/x",
            &HashMap::new(),
            MemoryResponse::new(),
            |guard| guard.set_header("Cache-Control", "no-store"),
        );
        assert!(outcome.used_default);
        assert!(outcome.override_event.is_none());
    }
}
