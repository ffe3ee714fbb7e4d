//! Read-only inspection of the active rules and templates
//!
//! Two surfaces over the same data: an aligned text table for operator
//! shells, and JSON for query tooling. Both are pure reads with no side
//! effects.

use crate::models::{RuleInfo, TemplateInfo};

/// Render the active rules as an aligned text table, in match order
pub fn render_rules_table(rules: &[RuleInfo]) -> String {
    let header = ["Rule Set", "Methods", "URL Pattern", "Action"];
    let rows: Vec<[String; 4]> = rules
        .iter()
        .map(|rule| {
            [
                rule.rule_set_key.clone(),
                rule.methods.join("|"),
                rule.url_pattern.clone(),
                rule.action.clone(),
            ]
        })
        .collect();
    render_table(&header, &rows)
}

/// Render the configured header templates as an aligned text table
pub fn render_templates_table(templates: &[TemplateInfo]) -> String {
    let header = ["Name", "Template"];
    let rows: Vec<[String; 2]> = templates
        .iter()
        .map(|t| [t.name.clone(), t.template.clone()])
        .collect();
    render_table(&header, &rows)
}

/// Active rules as pretty-printed JSON, for the query surface
pub fn rules_to_json(rules: &[RuleInfo]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rules)
}

/// Configured templates as pretty-printed JSON
pub fn templates_to_json(templates: &[TemplateInfo]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(templates)
}

fn render_table<const N: usize>(header: &[&str; N], rows: &[[String; N]]) -> String {
    let mut widths: [usize; N] = [0; N];
    for (i, title) in header.iter().enumerate() {
        widths[i] = title.len();
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    for (i, title) in header.iter().enumerate() {
        out.push_str(&format!("{:<width$}  ", title, width = widths[i]));
    }
    out.push('\n');
    for (i, _) in header.iter().enumerate() {
        out.push_str(&"-".repeat(widths[i]));
        out.push_str("  ");
    }
    out.push('\n');
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            out.push_str(&format!("{:<width$}  ", cell, width = widths[i]));
        }
        out.push('\n');
    }
    out
}
