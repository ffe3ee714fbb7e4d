//! Cache rules: match predicate plus header action
//!
//! A rule is configured as a single serialized string,
//! `METHODS;PATTERN;ACTION`:
//!
//! - `METHODS` is a `|`-separated list of HTTP method names
//! - `PATTERN` is a regular expression matched against the full request
//!   path (anchored, not a substring search)
//! - `ACTION` is either a literal Cache-Control value or `template:<name>`
//!
//! Rules order by specificity: descending path-segment count, then
//! ascending count of literal `.` characters (a proxy for how
//! wildcard-like the pattern is), then ascending pattern length. Remaining
//! ties fall through to the pattern text so that the order is total and
//! reproducible.

use crate::error::{ClientCacheError, Result};
use crate::models::RuleInfo;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Separator between the parts of a serialized rule
pub const RULE_PART_SEPARATOR: char = ';';

/// Separator between method names inside the METHODS part
pub const METHOD_SEPARATOR: char = '|';

/// Action prefix referencing a named header template
pub const TEMPLATE_PREFIX: &str = "template:";

/// Action a matching rule resolves to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleAction {
    /// Header value returned verbatim
    Literal(String),
    /// Name of a header template to fill with request parameters
    Template(String),
}

impl RuleAction {
    /// The configured form of the action (`template:<name>` or the literal)
    pub fn serialized(&self) -> String {
        match self {
            RuleAction::Literal(value) => value.clone(),
            RuleAction::Template(name) => format!("{}{}", TEMPLATE_PREFIX, name),
        }
    }
}

/// An immutable cache rule: method set and URL pattern plus an action
#[derive(Debug, Clone)]
pub struct CacheRule {
    rule_set_key: String,
    methods: BTreeSet<String>,
    pattern_source: String,
    pattern: Regex,
    action: RuleAction,
}

impl CacheRule {
    /// Parse a serialized rule, enforcing the validity gate
    ///
    /// # Returns
    /// * `Ok(CacheRule)` for a well-formed rule
    /// * `Err(ClientCacheError)` for an empty method set, an empty or
    ///   unparsable pattern, or an empty action
    pub fn parse(serialized: &str) -> Result<CacheRule> {
        let parts: Vec<&str> = serialized.split(RULE_PART_SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(ClientCacheError::InvalidRule {
                rule: serialized.to_string(),
                reason: format!("expected 3 parts separated by '{}'", RULE_PART_SEPARATOR),
            });
        }

        let methods: BTreeSet<String> = parts[0]
            .split(METHOD_SEPARATOR)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_uppercase)
            .collect();
        if methods.is_empty() {
            return Err(ClientCacheError::InvalidRule {
                rule: serialized.to_string(),
                reason: "method set is empty".to_string(),
            });
        }

        let pattern_source = parts[1].trim();
        if pattern_source.is_empty() {
            return Err(ClientCacheError::InvalidRule {
                rule: serialized.to_string(),
                reason: "URL pattern is empty".to_string(),
            });
        }
        // Full-string match, like the anchored matches() semantics the
        // configuration format promises.
        let pattern = Regex::new(&format!(r"\A(?:{})\z", pattern_source)).map_err(|e| {
            ClientCacheError::InvalidPattern {
                pattern: pattern_source.to_string(),
                reason: e.to_string(),
            }
        })?;

        let action_part = parts[2].trim();
        if action_part.is_empty() {
            return Err(ClientCacheError::InvalidRule {
                rule: serialized.to_string(),
                reason: "action is empty".to_string(),
            });
        }
        let action = match action_part.strip_prefix(TEMPLATE_PREFIX) {
            Some(name) if name.trim().is_empty() => {
                return Err(ClientCacheError::InvalidRule {
                    rule: serialized.to_string(),
                    reason: "template name is empty".to_string(),
                })
            }
            Some(name) => RuleAction::Template(name.trim().to_string()),
            None => RuleAction::Literal(action_part.to_string()),
        };

        Ok(CacheRule {
            rule_set_key: String::new(),
            methods,
            pattern_source: pattern_source.to_string(),
            pattern,
            action,
        })
    }

    /// Key of the configuration entry owning this rule
    pub fn rule_set_key(&self) -> &str {
        &self.rule_set_key
    }

    pub(crate) fn set_rule_set_key(&mut self, key: &str) {
        self.rule_set_key = key.to_string();
    }

    /// Uppercase HTTP methods the rule applies to
    pub fn methods(&self) -> &BTreeSet<String> {
        &self.methods
    }

    /// URL pattern as configured (without the added anchors)
    pub fn pattern_source(&self) -> &str {
        &self.pattern_source
    }

    pub fn action(&self) -> &RuleAction {
        &self.action
    }

    /// Whether the rule applies to the given uppercase method and full
    /// request path
    pub fn matches(&self, method: &str, url: &str) -> bool {
        self.methods.contains(method) && self.pattern.is_match(url)
    }

    /// Read-only view for inspection surfaces
    pub fn info(&self) -> RuleInfo {
        RuleInfo {
            rule_set_key: self.rule_set_key.clone(),
            methods: self.methods.iter().cloned().collect(),
            url_pattern: self.pattern_source.clone(),
            action: self.action.serialized(),
        }
    }

    fn segment_count(&self) -> usize {
        self.pattern_source.split('/').count()
    }

    fn dot_count(&self) -> usize {
        self.pattern_source.chars().filter(|c| *c == '.').count()
    }
}

impl std::fmt::Display for CacheRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CacheRule{{methods={:?}, urlPattern='{}', action='{}'}}",
            self.methods,
            self.pattern_source,
            self.action.serialized()
        )
    }
}

impl PartialEq for CacheRule {
    fn eq(&self, other: &Self) -> bool {
        self.rule_set_key == other.rule_set_key
            && self.methods == other.methods
            && self.pattern_source == other.pattern_source
            && self.action == other.action
    }
}

impl Eq for CacheRule {}

impl Ord for CacheRule {
    fn cmp(&self, other: &Self) -> Ordering {
        // More path segments first, fewer wildcard dots first, shorter
        // pattern first; the trailing comparisons only keep the order
        // total for otherwise-identical metrics.
        other
            .segment_count()
            .cmp(&self.segment_count())
            .then_with(|| self.dot_count().cmp(&other.dot_count()))
            .then_with(|| self.pattern_source.len().cmp(&other.pattern_source.len()))
            .then_with(|| self.pattern_source.cmp(&other.pattern_source))
            .then_with(|| self.action.cmp(&other.action))
            .then_with(|| self.methods.cmp(&other.methods))
            .then_with(|| self.rule_set_key.cmp(&other.rule_set_key))
    }
}

impl PartialOrd for CacheRule {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template_action() {
        let rule = CacheRule::parse("GET|HEAD;/files/.*;template:public").unwrap();
        assert!(rule.methods().contains("GET"));
        assert!(rule.methods().contains("HEAD"));
        assert_eq!(rule.pattern_source(), "/files/.*");
        assert_eq!(rule.action(), &RuleAction::Template("public".to_string()));
    }

    #[test]
    fn test_parse_literal_action() {
        let rule = CacheRule::parse("GET;/quiche;public, max-age=31536000, no-transform").unwrap();
        assert_eq!(
            rule.action(),
            &RuleAction::Literal("public, max-age=31536000, no-transform".to_string())
        );
    }

    #[test]
    fn test_parse_uppercases_methods() {
        let rule = CacheRule::parse("get|head;/a;x").unwrap();
        assert!(rule.matches("GET", "/a"));
        assert!(!rule.matches("get", "/a"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(CacheRule::parse("").is_err());
        assert!(CacheRule::parse("GET;/a").is_err());
        assert!(CacheRule::parse("1;GET;/a;x").is_err());
        assert!(CacheRule::parse(";/a;x").is_err());
        assert!(CacheRule::parse("GET; ;x").is_err());
        assert!(CacheRule::parse("GET;/a; ").is_err());
        assert!(CacheRule::parse("GET;/a;template:").is_err());
        // Unparsable regex
        assert!(matches!(
            CacheRule::parse("GET;/a(;x"),
            Err(ClientCacheError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_full_match_not_substring() {
        let rule = CacheRule::parse("GET;/files/.*;template:public").unwrap();
        assert!(rule.matches("GET", "/files/x.png"));
        assert!(!rule.matches("GET", "/site/files/x.png"));
        assert!(!rule.matches("POST", "/files/x.png"));

        let exact = CacheRule::parse("GET;/files;x").unwrap();
        assert!(exact.matches("GET", "/files"));
        assert!(!exact.matches("GET", "/files/sub"));
    }

    #[test]
    fn test_ordering_by_specificity() {
        let deep = CacheRule::parse("GET;(?:/[^/]+)?/cms/render/live/.*;template:public").unwrap();
        let shallow = CacheRule::parse("GET;(?:/[^/]+)?/cms/.*;template:private").unwrap();
        assert_eq!(deep.cmp(&shallow), Ordering::Less);

        // Same segment count: fewer dots first
        let literal = CacheRule::parse("GET;/quiche;x").unwrap();
        let wildcard = CacheRule::parse("GET;/.*;x").unwrap();
        assert_eq!(literal.cmp(&wildcard), Ordering::Less);

        // Same segments and dots: shorter pattern first
        let short = CacheRule::parse("GET;(?:/[^/]+)?/cms/.*;x").unwrap();
        let long = CacheRule::parse("GET;(?:/[^/]+)?/repository/.*;x").unwrap();
        assert_eq!(short.cmp(&long), Ordering::Less);
    }

    #[test]
    fn test_ordering_is_total_for_distinct_rules() {
        let a = CacheRule::parse("GET;/aaaaaa;x").unwrap();
        let b = CacheRule::parse("GET;/bbbbbb;x").unwrap();
        // Identical metrics, distinct patterns: never equal
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn test_info_view() {
        let mut rule = CacheRule::parse("HEAD|GET;/files/.*;template:public").unwrap();
        rule.set_rule_set_key("default");
        let info = rule.info();
        assert_eq!(info.rule_set_key, "default");
        assert_eq!(info.methods, vec!["GET".to_string(), "HEAD".to_string()]);
        assert_eq!(info.action, "template:public");
    }
}
