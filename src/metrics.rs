//! Prometheus metrics for cache control resolution

use prometheus::{register_counter_vec, CounterVec, Registry};
use std::sync::Arc;

/// Metrics for header resolution and override policing
#[derive(Clone)]
pub struct ClientCacheMetrics {
    /// Total number of resolved requests, by outcome (rule/default/unchanged)
    pub resolutions_total: Arc<CounterVec>,

    /// Total number of override events observed after the downstream chain,
    /// by mode (strict/overrides)
    pub override_events_total: Arc<CounterVec>,
}

impl ClientCacheMetrics {
    /// Create new metrics on the default registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let resolutions_total = register_counter_vec!(
            "client_cache_control_resolutions_total",
            "Total number of requests with a preset Cache-Control header",
            &["outcome"] // outcome: rule, default, unchanged
        )?;

        let override_events_total = register_counter_vec!(
            "client_cache_control_override_events_total",
            "Total number of Cache-Control override events after downstream processing",
            &["mode"] // mode: strict, overrides
        )?;

        Ok(Self {
            resolutions_total: Arc::new(resolutions_total),
            override_events_total: Arc::new(override_events_total),
        })
    }

    /// Create metrics with a custom registry
    pub fn with_registry(registry: &Registry) -> Result<Self, prometheus::Error> {
        let resolutions_total = CounterVec::new(
            prometheus::Opts::new(
                "client_cache_control_resolutions_total",
                "Total number of requests with a preset Cache-Control header",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(resolutions_total.clone()))?;

        let override_events_total = CounterVec::new(
            prometheus::Opts::new(
                "client_cache_control_override_events_total",
                "Total number of Cache-Control override events after downstream processing",
            ),
            &["mode"],
        )?;
        registry.register(Box::new(override_events_total.clone()))?;

        Ok(Self {
            resolutions_total: Arc::new(resolutions_total),
            override_events_total: Arc::new(override_events_total),
        })
    }

    /// Record a resolution outcome
    pub fn record_resolution(&self, outcome: &str) {
        self.resolutions_total.with_label_values(&[outcome]).inc();
    }

    /// Record an observed override event
    pub fn record_override(&self, mode: &str) {
        self.override_events_total.with_label_values(&[mode]).inc();
    }
}
