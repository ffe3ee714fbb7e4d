//! Named, parameterized Cache-Control header templates
//!
//! Templates carry two placeholder kinds. Static placeholders (`##key##`)
//! are resolved exactly once against configuration settings when the store
//! is built; a residual `##...##` token after that substitution is a
//! configuration error. Dynamic placeholders (`%%key%%`) stay open and are
//! filled per request from caller-supplied parameters; unknown placeholders
//! are left verbatim so a missing parameter never breaks header delivery.

use crate::config::ClientCacheConfig;
use crate::error::{ClientCacheError, Result};
use crate::models::TemplateInfo;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Built-in template names
pub const PRIVATE: &str = "private";
pub const PUBLIC: &str = "public";
pub const CUSTOM: &str = "custom";
pub const IMMUTABLE: &str = "immutable";

/// Template used when no rule matches a request
pub const DEFAULT_TEMPLATE: &str = PRIVATE;

/// Last-resort header value when even the default template is unavailable
pub const FALLBACK_PRIVATE_HEADER: &str =
    "private, no-cache, no-store, must-revalidate, proxy-revalidate, max-age=0";

/// A named Cache-Control header template, frozen after configuration-time
/// substitution of static placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTemplate {
    name: String,
    template: String,
}

impl HeaderTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        HeaderTemplate {
            name: name.into(),
            template: template.into(),
        }
    }

    /// Fallback template resolving to an empty header value
    pub fn empty() -> Self {
        HeaderTemplate::new("empty", "")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template text with only dynamic placeholders remaining
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Replace every `%%key%%` occurrence with the parameter's value;
    /// placeholders without a matching parameter are left untouched
    pub fn fill(&self, params: &HashMap<String, String>) -> String {
        let mut filled = self.template.clone();
        for (key, value) in params {
            filled = filled.replace(&format!("%%{}%%", key), value);
        }
        filled
    }

    /// Read-only view for inspection surfaces
    pub fn info(&self) -> TemplateInfo {
        TemplateInfo {
            name: self.name.clone(),
            template: self.template.clone(),
        }
    }
}

/// Read-mostly mapping from template name to header template, replaced
/// atomically as a whole on reconfiguration
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: BTreeMap<String, HeaderTemplate>,
}

impl TemplateStore {
    /// Build the store from configuration, resolving static placeholders
    ///
    /// # Returns
    /// * `Ok(TemplateStore)` with all built-in templates resolved
    /// * `Err(ClientCacheError)` if any template keeps an unresolved
    ///   `##...##` token after substitution
    pub fn from_config(config: &ClientCacheConfig) -> Result<Self> {
        let settings = config.settings();
        let mut templates = BTreeMap::new();
        for (name, text) in [
            (PRIVATE, &config.template_private),
            (PUBLIC, &config.template_public),
            (CUSTOM, &config.template_custom),
            (IMMUTABLE, &config.template_immutable),
        ] {
            let resolved = resolve_static(name, text, &settings)?;
            info!("Cache control header template: [{}] {}", name, resolved);
            templates.insert(name.to_string(), HeaderTemplate::new(name, resolved));
        }
        Ok(TemplateStore { templates })
    }

    pub fn get(&self, name: &str) -> Option<&HeaderTemplate> {
        self.templates.get(name)
    }

    /// Fill the named template with request parameters
    pub fn fill(&self, name: &str, params: &HashMap<String, String>) -> Option<String> {
        self.templates.get(name).map(|t| t.fill(params))
    }

    /// Fill the named template, degrading to the empty template when the
    /// name is unknown (logged, never an error)
    pub fn fill_or_empty(&self, name: &str, params: &HashMap<String, String>) -> String {
        match self.templates.get(name) {
            Some(template) => template.fill(params),
            None => {
                warn!("Unknown header template '{}', resolving to empty value", name);
                HeaderTemplate::empty().fill(params)
            }
        }
    }

    /// Static value of the default template, used when no rule matches;
    /// no per-request parameters are applied
    pub fn default_header(&self) -> String {
        match self.templates.get(DEFAULT_TEMPLATE) {
            Some(template) => template.template().to_string(),
            None => {
                warn!("Default header template missing, using built-in private value");
                FALLBACK_PRIVATE_HEADER.to_string()
            }
        }
    }

    /// Read-only listing for inspection surfaces
    pub fn list(&self) -> Vec<TemplateInfo> {
        self.templates.values().map(HeaderTemplate::info).collect()
    }
}

/// Substitute `##key##` placeholders from the settings map and reject any
/// residual static placeholder
fn resolve_static(
    name: &str,
    text: &str,
    settings: &BTreeMap<String, String>,
) -> Result<String> {
    let mut resolved = text.to_string();
    for (key, value) in settings {
        resolved = resolved.replace(&format!("##{}##", key), value);
    }
    if let Some(start) = resolved.find("##") {
        let text = match resolved[start + 2..].find("##") {
            Some(end) => &resolved[start..start + end + 4],
            None => &resolved[start..],
        };
        return Err(ClientCacheError::UnresolvedPlaceholder {
            template: name.to_string(),
            text: text.to_string(),
        });
    }
    debug!("Resolved template '{}': {}", name, resolved);
    Ok(resolved)
}
