//! Shared types and constants for the client cache control engine

use serde::{Deserialize, Serialize};

/// Header names the engine presets and polices on the response
pub const FILTERED_HEADER_NAMES: [&str; 3] = ["Cache-Control", "Expires", "Pragma"];

/// Prefix that bypasses the strict-mode lock: `Force-Cache-Control` writes
/// `Cache-Control` regardless of lock state. Reserved for trusted internal
/// callers such as the render pipeline.
pub const FORCE_HEADER_PREFIX: &str = "Force-";

/// Dynamic template parameter carrying a per-content cache TTL, substituted
/// into `%%customTTL%%` placeholders at request time
pub const CUSTOM_TTL_PARAM: &str = "customTTL";

/// Global resolution mode for preset caching headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Preset caching headers are locked for the remainder of the request;
    /// downstream writes to them are silently discarded
    Strict,
    /// Downstream code may replace the preset; deviations are observable
    /// but not rejected
    #[serde(rename = "overrides")]
    AllowOverrides,
}

impl CacheMode {
    /// Parse the configuration value (`strict` or `overrides`)
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "strict" => Some(CacheMode::Strict),
            "overrides" => Some(CacheMode::AllowOverrides),
            _ => None,
        }
    }

    /// Whether downstream components may override preset caching headers
    pub fn allows_overrides(&self) -> bool {
        matches!(self, CacheMode::AllowOverrides)
    }
}

impl Default for CacheMode {
    fn default() -> Self {
        CacheMode::AllowOverrides
    }
}

impl std::fmt::Display for CacheMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheMode::Strict => write!(f, "strict"),
            CacheMode::AllowOverrides => write!(f, "overrides"),
        }
    }
}

/// Read-only view of an active rule, for operator tooling and query surfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInfo {
    /// Key of the configuration entry that owns the rule
    pub rule_set_key: String,
    /// HTTP methods the rule applies to, sorted
    pub methods: Vec<String>,
    /// URL pattern as configured
    pub url_pattern: String,
    /// Resolved action: the literal header value, or `template:<name>`
    pub action: String,
}

/// Read-only view of a configured header template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub name: String,
    /// Template text after configuration-time substitution
    pub template: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(CacheMode::parse("strict"), Some(CacheMode::Strict));
        assert_eq!(CacheMode::parse("overrides"), Some(CacheMode::AllowOverrides));
        assert_eq!(CacheMode::parse("lenient"), None);
    }

    #[test]
    fn test_mode_default_allows_overrides() {
        assert!(CacheMode::default().allows_overrides());
        assert!(!CacheMode::Strict.allows_overrides());
    }

    #[test]
    fn test_mode_display_roundtrip() {
        for mode in [CacheMode::Strict, CacheMode::AllowOverrides] {
            assert_eq!(CacheMode::parse(&mode.to_string()), Some(mode));
        }
    }
}
