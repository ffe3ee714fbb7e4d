//! Client Cache Control
//!
//! A Cache-Control rule resolution engine for content-management servers:
//! presets HTTP caching headers per request from an ordered set of
//! configurable rules and polices downstream overrides.
//!
//! # Overview
//!
//! Every inbound request is classified by (method, URL) against the active
//! rule set. The first matching rule resolves either to a literal header
//! value or to a named, parameterized header template; the resolved value
//! is installed on the response before downstream processing runs. When no
//! rule matches, the default template's static value is used. In strict
//! mode the caching headers are locked after the preset and later writes
//! to them are silently discarded; in allow-overrides mode deviations are
//! observed and reported but not rejected.
//!
//! # Features
//!
//! - **Ordered rule sets**: deterministic specificity ordering with
//!   first-match-wins resolution
//! - **Header templates**: config-time `##key##` settings substitution and
//!   request-time `%%key%%` parameters
//! - **Override policing**: strict or allow-overrides mode, with a
//!   `Force-` header prefix as escape hatch for trusted callers
//! - **Atomic reconfiguration**: rule sets and templates swap as immutable
//!   snapshots; request threads never lock
//! - **Invalidation contract**: a typed async interface external CDN
//!   purge adapters implement
//!
//! # Quick Start
//!
//! ```rust
//! use client_cache_control::{
//!     ClientCacheConfig, ClientCacheFilter, ClientCacheService, MemoryResponse, ResponseSink,
//!     RuleSetConfig,
//! };
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = ClientCacheConfig::default();
//! config.rule_sets.insert(
//!     "default".to_string(),
//!     RuleSetConfig {
//!         rules: vec!["GET|HEAD;/files/.*;template:public".to_string()],
//!         ..Default::default()
//!     },
//! );
//!
//! let service = Arc::new(ClientCacheService::new(&config)?);
//! let filter = ClientCacheFilter::new(service);
//!
//! let (response, outcome) = filter.apply(
//!     "GET",
//!     "/files/logo.png",
//!     &HashMap::new(),
//!     MemoryResponse::new(),
//!     |_guard| { /* downstream chain */ },
//! );
//! assert!(outcome.preset.is_some());
//! assert!(response.header("Cache-Control").is_some());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`ClientCacheService`]: owns the rule sets, template store and mode
//!   as an atomically swapped snapshot; resolves preset values
//! - [`CacheRule`] / [`RuleSet`]: match predicates with actions, built
//!   from configuration entries and re-sorted on every change
//! - [`TemplateStore`]: named header templates, frozen after
//!   configuration-time substitution
//! - [`ResponseGuard`]: wraps the outbound response and enforces the
//!   write-once/override contract
//! - [`ClientCacheFilter`]: per-request orchestration and drift reporting
//! - [`InvalidationProvider`]: contract for external cache purge adapters
//!
//! # Configuration
//!
//! Configuration is loaded from a YAML file:
//!
//! ```yaml
//! mode: strict                    # or "overrides"
//! intermediates_ttl: 300          # seconds
//! immutable_ttl: 2678400
//! rule_sets:
//!   default:
//!     name: Default rules
//!     rules:
//!       - "GET|HEAD;(?:/[^/]+)?/files/.*;template:public"
//!       - "GET|HEAD;(?:/[^/]+)?/cms/.*;template:private"
//! ```
//!
//! Rule sets can also be delivered and removed at runtime through
//! [`ClientCacheService::update_rule_set`] and
//! [`ClientCacheService::remove_rule_set`]; each update swaps in a freshly
//! sorted snapshot.

pub mod config;
pub mod error;
pub mod filter;
pub mod inspect;
pub mod invalidation;
pub mod metrics;
pub mod models;
pub mod response;
pub mod rule;
pub mod rule_set;
pub mod service;
pub mod template;

// Re-export commonly used types
pub use config::{ClientCacheConfig, RuleSetConfig};
pub use error::{ClientCacheError, Result};
pub use filter::{ClientCacheFilter, FilterOutcome, OverrideEvent};
pub use invalidation::InvalidationProvider;
pub use metrics::ClientCacheMetrics;
pub use models::{CacheMode, RuleInfo, TemplateInfo, CUSTOM_TTL_PARAM};
pub use response::{MemoryResponse, ResponseGuard, ResponseSink};
pub use rule::{CacheRule, RuleAction};
pub use rule_set::RuleSet;
pub use service::ClientCacheService;
pub use template::{HeaderTemplate, TemplateStore};
