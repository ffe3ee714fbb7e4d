//! Rule sets: the rules owned by one configuration entry
//!
//! A rule set is rebuilt wholesale whenever its configuration entry is
//! delivered or updated; individual rules are never patched in place.
//! Invalid rules are rejected per entry with an operator-visible error and
//! never enter the set.

use crate::config::RuleSetConfig;
use crate::rule::CacheRule;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Property keys carrying serialized rules start with this prefix
/// (`rule1`, `rule2`, ... by convention)
pub const RULE_KEY_PREFIX: &str = "rule";

/// The rules contributed by a single configuration entry
#[derive(Debug, Clone)]
pub struct RuleSet {
    key: String,
    name: Option<String>,
    description: Option<String>,
    rules: Vec<CacheRule>,
}

impl RuleSet {
    pub fn new(key: impl Into<String>) -> Self {
        RuleSet {
            key: key.into(),
            name: None,
            description: None,
            rules: Vec::new(),
        }
    }

    /// Build a rule set from a key→string properties map, the shape in
    /// which configuration entries are delivered on load and on update.
    /// `name` and `description` keys are informational; every key starting
    /// with `rule` carries one serialized rule.
    pub fn from_properties(key: &str, properties: &BTreeMap<String, String>) -> Self {
        debug!(
            "Building cache control rule set '{}', {} properties",
            key,
            properties.len()
        );
        let mut rule_set = RuleSet::new(key);
        rule_set.name = properties.get("name").filter(|v| !v.is_empty()).cloned();
        rule_set.description = properties
            .get("description")
            .filter(|v| !v.is_empty())
            .cloned();
        for (prop_key, serialized) in properties {
            if prop_key.starts_with(RULE_KEY_PREFIX) && !serialized.is_empty() {
                rule_set.add_rule(serialized);
            }
        }
        rule_set
    }

    /// Build a rule set from a configuration-file entry
    pub fn from_config(key: &str, config: &RuleSetConfig) -> Self {
        let mut rule_set = RuleSet::new(key);
        rule_set.name = config.name.clone();
        rule_set.description = config.description.clone();
        for serialized in &config.rules {
            rule_set.add_rule(serialized);
        }
        rule_set
    }

    /// Parse and add one serialized rule. A rule failing its validity gate
    /// is reported and excluded; it never corrupts the set.
    pub fn add_rule(&mut self, serialized: &str) {
        match CacheRule::parse(serialized) {
            Ok(mut rule) => {
                rule.set_rule_set_key(&self.key);
                self.rules.push(rule);
            }
            Err(e) => {
                error!("Rejecting invalid rule in rule set '{}': {}", self.key, e);
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn rules(&self) -> &[CacheRule] {
        &self.rules
    }
}
