//! Cache control resolution service
//!
//! The service owns the active rule sets, the header template store, and
//! the resolution mode as one immutable snapshot behind an
//! `RwLock<Arc<_>>`. Request threads clone the `Arc` and read without
//! further locking; administrative updates build a complete new snapshot
//! and swap it in, so readers observe either the fully-old or the
//! fully-new state, never an intermediate one.

use crate::config::ClientCacheConfig;
use crate::error::Result;
use crate::models::{CacheMode, RuleInfo, TemplateInfo};
use crate::rule::{CacheRule, RuleAction};
use crate::rule_set::RuleSet;
use crate::template::TemplateStore;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct ServiceState {
    mode: CacheMode,
    templates: TemplateStore,
    rule_sets: BTreeMap<String, RuleSet>,
    /// Flattened active rules, fully sorted; rebuilt on every rule-set change
    rules: Vec<CacheRule>,
}

impl ServiceState {
    fn flatten_and_sort(rule_sets: &BTreeMap<String, RuleSet>) -> Vec<CacheRule> {
        let mut rules: Vec<CacheRule> = rule_sets
            .values()
            .flat_map(|rs| rs.rules().iter().cloned())
            .collect();
        rules.sort();
        info!("Active cache control rules (sorted):");
        for rule in &rules {
            info!("{}", rule);
        }
        rules
    }
}

/// Resolves preset Cache-Control header values for requests and carries
/// the administrative entry points for configuration changes
#[derive(Debug)]
pub struct ClientCacheService {
    state: RwLock<Arc<ServiceState>>,
}

impl ClientCacheService {
    /// Create the service from configuration
    ///
    /// # Returns
    /// * `Ok(ClientCacheService)` with templates resolved and the
    ///   configured rule sets active
    /// * `Err(ClientCacheError)` if the configuration is invalid or a
    ///   template keeps an unresolved static placeholder
    pub fn new(config: &ClientCacheConfig) -> Result<Self> {
        config.validate()?;
        info!("Activating client cache service in {} mode", config.mode);
        let templates = TemplateStore::from_config(config)?;
        let rule_sets: BTreeMap<String, RuleSet> = config
            .rule_sets
            .iter()
            .map(|(key, entry)| (key.clone(), RuleSet::from_config(key, entry)))
            .collect();
        let rules = ServiceState::flatten_and_sort(&rule_sets);
        Ok(ClientCacheService {
            state: RwLock::new(Arc::new(ServiceState {
                mode: config.mode,
                templates,
                rule_sets,
                rules,
            })),
        })
    }

    fn snapshot(&self) -> Arc<ServiceState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn install(&self, next: ServiceState) {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(next);
    }

    /// Current resolution mode
    pub fn mode(&self) -> CacheMode {
        self.snapshot().mode
    }

    /// Apply an updated configuration: mode and templates are replaced,
    /// and the rule sets present in the configuration are upserted by key.
    /// Rule sets added at runtime under other keys stay active; removal is
    /// an explicit `remove_rule_set` call.
    ///
    /// On error the previously-valid snapshot keeps serving.
    pub fn reconfigure(&self, config: &ClientCacheConfig) -> Result<()> {
        config.validate()?;
        let templates = TemplateStore::from_config(config)?;
        info!("Updating client cache service, {} mode", config.mode);
        let current = self.snapshot();
        let mut rule_sets = current.rule_sets.clone();
        for (key, entry) in &config.rule_sets {
            rule_sets.insert(key.clone(), RuleSet::from_config(key, entry));
        }
        let rules = ServiceState::flatten_and_sort(&rule_sets);
        self.install(ServiceState {
            mode: config.mode,
            templates,
            rule_sets,
            rules,
        });
        Ok(())
    }

    /// Deliver a rule-set configuration entry (new or updated). The entry
    /// replaces any previous rule set under the same key and the active
    /// rule list is re-sorted before the new snapshot becomes visible.
    pub fn update_rule_set(&self, key: &str, properties: &BTreeMap<String, String>) {
        info!("Updating rule set '{}', {} properties", key, properties.len());
        let rule_set = RuleSet::from_properties(key, properties);
        let current = self.snapshot();
        let mut rule_sets = current.rule_sets.clone();
        rule_sets.insert(key.to_string(), rule_set);
        let rules = ServiceState::flatten_and_sort(&rule_sets);
        self.install(ServiceState {
            mode: current.mode,
            templates: current.templates.clone(),
            rule_sets,
            rules,
        });
    }

    /// Remove the rule set delivered under the given configuration key
    pub fn remove_rule_set(&self, key: &str) {
        info!("Removing rule set '{}'", key);
        let current = self.snapshot();
        let mut rule_sets = current.rule_sets.clone();
        rule_sets.remove(key);
        let rules = ServiceState::flatten_and_sort(&rule_sets);
        self.install(ServiceState {
            mode: current.mode,
            templates: current.templates.clone(),
            rule_sets,
            rules,
        });
    }

    /// Resolve the preset Cache-Control value for a request
    ///
    /// Returns the first matching rule's literal value, or its template
    /// filled with the request parameters. An unknown template name
    /// resolves to an empty value, never an error. `None` means no rule
    /// matched; the caller is responsible for the default header.
    ///
    /// Pure read over the current snapshot, safe to call concurrently.
    pub fn resolve(
        &self,
        method: &str,
        url: &str,
        params: &HashMap<String, String>,
    ) -> Option<String> {
        let state = self.snapshot();
        let method = method.to_uppercase();
        let rule = state.rules.iter().find(|rule| rule.matches(&method, url))?;
        let value = match rule.action() {
            RuleAction::Literal(value) => value.clone(),
            RuleAction::Template(name) => state.templates.fill_or_empty(name, params),
        };
        debug!(
            "Rule {} matched for method: {} and url: {}, header value: [{}]",
            rule, method, url, value
        );
        Some(value)
    }

    /// Fill a named header template directly, bypassing rule matching.
    /// Used by trusted callers such as the render pipeline that carry
    /// their own cache policy.
    pub fn resolve_template(&self, name: &str, params: &HashMap<String, String>) -> String {
        let value = self.snapshot().templates.fill_or_empty(name, params);
        debug!("Template '{}' resolved to header value: [{}]", name, value);
        value
    }

    /// Static value of the default template, applied when no rule matches
    pub fn default_cache_control(&self) -> String {
        self.snapshot().templates.default_header()
    }

    /// Read-only listing of the active rules in match order
    pub fn list_rules(&self) -> Vec<RuleInfo> {
        self.snapshot().rules.iter().map(CacheRule::info).collect()
    }

    /// Read-only listing of the configured header templates
    pub fn list_templates(&self) -> Vec<TemplateInfo> {
        self.snapshot().templates.list()
    }
}
