// End-to-end resolution tests: rule ordering against a realistic CMS rule
// set, first-match-wins, and the preset/default scenarios.

use client_cache_control::{
    ClientCacheConfig, ClientCacheService, RuleSetConfig, CUSTOM_TTL_PARAM,
};
use std::collections::HashMap;

fn service_with_rules(rules: &[&str]) -> ClientCacheService {
    let mut config = ClientCacheConfig::default();
    config.rule_sets.insert(
        "default".to_string(),
        RuleSetConfig {
            name: Some("Default rules".to_string()),
            description: None,
            rules: rules.iter().map(|r| r.to_string()).collect(),
        },
    );
    ClientCacheService::new(&config).unwrap()
}

/// The rule set a CMS deployment typically configures, deliberately out
/// of order
fn cms_service() -> ClientCacheService {
    service_with_rules(&[
        "GET|HEAD;(?:/[^/]+)?/files/.*;template:public",
        "GET|HEAD;(?:/[^/]+)?/repository/.*;template:public",
        "GET|HEAD;(?:/[^/]+)?/cms/render/live/.*;template:public",
        "GET|HEAD;(?:/[^/]+)?/cms/.*;template:private",
        "GET|HEAD;(?:/[^/]+)?/generated-resources;template:private",
        "GET|HEAD;/quiche;public, max-age=31536000, no-transform",
        "GET|HEAD;/.*;template:public",
    ])
}

#[test]
fn test_rules_sorted_by_specificity() {
    let service = cms_service();
    let patterns: Vec<String> = service
        .list_rules()
        .into_iter()
        .map(|r| r.url_pattern)
        .collect();
    assert_eq!(
        patterns,
        vec![
            "(?:/[^/]+)?/cms/render/live/.*",
            "(?:/[^/]+)?/cms/.*",
            "(?:/[^/]+)?/files/.*",
            "(?:/[^/]+)?/repository/.*",
            "(?:/[^/]+)?/generated-resources",
            "/quiche",
            "/.*",
        ]
    );
}

#[test]
fn test_added_rule_set_resorts_active_list() {
    let service = cms_service();
    let props = std::collections::BTreeMap::from([(
        "rule1".to_string(),
        "GET|HEAD;/tagada;template:plop".to_string(),
    )]);
    service.update_rule_set("extra", &props);

    let patterns: Vec<String> = service
        .list_rules()
        .into_iter()
        .map(|r| r.url_pattern)
        .collect();
    // Two segments, no wildcard dot: lands with the literal rules, before
    // the catch-all
    assert_eq!(
        patterns,
        vec![
            "(?:/[^/]+)?/cms/render/live/.*",
            "(?:/[^/]+)?/cms/.*",
            "(?:/[^/]+)?/files/.*",
            "(?:/[^/]+)?/repository/.*",
            "(?:/[^/]+)?/generated-resources",
            "/quiche",
            "/tagada",
            "/.*",
        ]
    );
}

#[test]
fn test_cms_logout_hits_private_rule() {
    let service = cms_service();
    // Both the cms catch-all and the site-wide catch-all match; the more
    // specific cms rule wins and resolves to the private template
    let value = service
        .resolve("GET", "/context/cms/logout", &HashMap::new())
        .unwrap();
    assert_eq!(
        value,
        "private, no-cache, no-store, must-revalidate, proxy-revalidate, max-age=0"
    );
}

#[test]
fn test_first_match_wins() {
    let service = service_with_rules(&[
        "GET;/files/.*;shallow",
        "GET;/files/sub/.*;deep",
    ]);
    // "/files/sub/x" matches both rules; the deeper pattern orders first
    assert_eq!(
        service.resolve("GET", "/files/sub/x", &HashMap::new()),
        Some("deep".to_string())
    );
    assert_eq!(
        service.resolve("GET", "/files/x", &HashMap::new()),
        Some("shallow".to_string())
    );
}

#[test]
fn test_match_is_deterministic() {
    let service = cms_service();
    let first = service.resolve("GET", "/site/files/x.png", &HashMap::new());
    for _ in 0..100 {
        assert_eq!(
            service.resolve("GET", "/site/files/x.png", &HashMap::new()),
            first
        );
    }
}

// Scenario: a lone files rule resolves GET /files/x.png to the filled
// public template
#[test]
fn test_public_template_resolution() {
    let service = service_with_rules(&["GET|HEAD;/files/.*;template:public"]);
    assert_eq!(
        service.resolve("GET", "/files/x.png", &HashMap::new()),
        Some(
            "public, must-revalidate, max-age=1, s-maxage=300, stale-while-revalidate=15"
                .to_string()
        )
    );
    assert_eq!(
        service.resolve("HEAD", "/files/x.png", &HashMap::new()),
        Some(
            "public, must-revalidate, max-age=1, s-maxage=300, stale-while-revalidate=15"
                .to_string()
        )
    );
}

// Scenario: nothing matches POST /api/x; the default is the private
// literal
#[test]
fn test_unmatched_request_falls_back_to_private_default() {
    let service = cms_service();
    assert_eq!(service.resolve("POST", "/api/x", &HashMap::new()), None);
    assert_eq!(
        service.default_cache_control(),
        "private, no-cache, no-store, must-revalidate, proxy-revalidate, max-age=0"
    );
}

#[test]
fn test_custom_template_uses_request_ttl() {
    let service = service_with_rules(&["GET;/pages/.*;template:custom"]);
    let params = HashMap::from([(CUSTOM_TTL_PARAM.to_string(), "120".to_string())]);
    assert_eq!(
        service.resolve("GET", "/pages/home.html", &params),
        Some(
            "public, must-revalidate, max-age=1, s-maxage=120, stale-while-revalidate=15"
                .to_string()
        )
    );
    // Missing parameter leaves the placeholder verbatim rather than
    // breaking header delivery
    assert_eq!(
        service.resolve("GET", "/pages/home.html", &HashMap::new()),
        Some(
            "public, must-revalidate, max-age=1, s-maxage=%%customTTL%%, stale-while-revalidate=15"
                .to_string()
        )
    );
}

#[test]
fn test_render_pipeline_template_resolution() {
    let service = cms_service();
    let params = HashMap::from([(CUSTOM_TTL_PARAM.to_string(), "60".to_string())]);
    assert_eq!(
        service.resolve_template("custom", &params),
        "public, must-revalidate, max-age=1, s-maxage=60, stale-while-revalidate=15"
    );
    // Unknown template names degrade to an empty value
    assert_eq!(service.resolve_template("plop", &params), "");
}
