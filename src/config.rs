//! Configuration management for the client cache control engine

use crate::error::{ClientCacheError, Result};
use crate::models::CacheMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Configuration for the client cache control engine
///
/// Template texts may contain static placeholders (`##intermediates.ttl##`,
/// `##immutable.ttl##`) resolved once when the configuration is applied, and
/// dynamic placeholders (`%%customTTL%%`) resolved per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCacheConfig {
    /// Resolution mode: "strict" locks preset caching headers for the
    /// request, "overrides" lets downstream components replace them
    /// (default: overrides)
    #[serde(default)]
    pub mode: CacheMode,

    /// Duration an intermediate cache may keep content without
    /// revalidation, in seconds (default: 300)
    #[serde(default = "default_intermediates_ttl")]
    pub intermediates_ttl: u64,

    /// Duration content is considered immutable in all caches, in seconds
    /// (default: 2678400 = 31 days)
    #[serde(default = "default_immutable_ttl")]
    pub immutable_ttl: u64,

    /// Header template for private resources (client cache with
    /// revalidation, no intermediates cache)
    #[serde(default = "default_template_private")]
    pub template_private: String,

    /// Header template for rendered resources with a per-content cache TTL
    #[serde(default = "default_template_custom")]
    pub template_custom: String,

    /// Header template for public dynamic resources such as pages or files
    #[serde(default = "default_template_public")]
    pub template_public: String,

    /// Header template for resources that never change
    #[serde(default = "default_template_immutable")]
    pub template_immutable: String,

    /// Rule sets keyed by configuration entry, applied at startup. Further
    /// entries can be added or removed at runtime through the service.
    #[serde(default)]
    pub rule_sets: BTreeMap<String, RuleSetConfig>,
}

/// One rule-set configuration entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Serialized rules, `METHODS;PATTERN;ACTION` each, e.g.
    /// `GET|HEAD;(?:/[^/]+)?/files/.*;template:public`
    #[serde(default)]
    pub rules: Vec<String>,
}

// Default value functions for serde
fn default_intermediates_ttl() -> u64 {
    300
}

fn default_immutable_ttl() -> u64 {
    2678400 // 31 days
}

fn default_template_private() -> String {
    "private, no-cache, no-store, must-revalidate, proxy-revalidate, max-age=0".to_string()
}

fn default_template_custom() -> String {
    "public, must-revalidate, max-age=1, s-maxage=%%customTTL%%, stale-while-revalidate=15"
        .to_string()
}

fn default_template_public() -> String {
    "public, must-revalidate, max-age=1, s-maxage=##intermediates.ttl##, stale-while-revalidate=15"
        .to_string()
}

fn default_template_immutable() -> String {
    "public, max-age=##immutable.ttl##, s-maxage=##immutable.ttl##, stale-while-revalidate=15, immutable"
        .to_string()
}

impl Default for ClientCacheConfig {
    fn default() -> Self {
        ClientCacheConfig {
            mode: CacheMode::default(),
            intermediates_ttl: default_intermediates_ttl(),
            immutable_ttl: default_immutable_ttl(),
            template_private: default_template_private(),
            template_custom: default_template_custom(),
            template_public: default_template_public(),
            template_immutable: default_template_immutable(),
            rule_sets: BTreeMap::new(),
        }
    }
}

impl ClientCacheConfig {
    /// Load configuration from a YAML file
    ///
    /// # Returns
    /// * `Ok(ClientCacheConfig)` if loading and validation succeed
    /// * `Err(ClientCacheError)` if the file cannot be read or the config is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ClientCacheError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: ClientCacheConfig = serde_yaml::from_str(&content).map_err(|e| {
            ClientCacheError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Validation Rules
    /// - intermediates_ttl must be > 0
    /// - immutable_ttl must be > 0
    /// - no template text may be empty
    pub fn validate(&self) -> Result<()> {
        if self.intermediates_ttl == 0 {
            return Err(ClientCacheError::ConfigError(
                "intermediates_ttl must be greater than 0".to_string(),
            ));
        }

        if self.immutable_ttl == 0 {
            return Err(ClientCacheError::ConfigError(
                "immutable_ttl must be greater than 0".to_string(),
            ));
        }

        for (field, value) in [
            ("template_private", &self.template_private),
            ("template_custom", &self.template_custom),
            ("template_public", &self.template_public),
            ("template_immutable", &self.template_immutable),
        ] {
            if value.trim().is_empty() {
                return Err(ClientCacheError::ConfigError(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        Ok(())
    }

    /// Static settings available for `##key##` substitution in templates
    pub fn settings(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "intermediates.ttl".to_string(),
                self.intermediates_ttl.to_string(),
            ),
            ("immutable.ttl".to_string(), self.immutable_ttl.to_string()),
        ])
    }
}
