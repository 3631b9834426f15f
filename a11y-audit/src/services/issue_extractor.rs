//! Issue extraction
//!
//! Walks the `audits` mapping of a raw report and emits one normalized issue
//! per offending item:
//!
//! 1. Rules are visited in document order.
//! 2. Rules scoring exactly 1 (fully passing) are skipped.
//! 3. Rules without a `details.items` sequence are skipped.
//! 4. Every item becomes one issue; missing item fields fall back to defaults
//!    and never fail extraction.
//!
//! The only failure is a report without an `audits` mapping at all.

use serde_json::Value;
use thiserror::Error;

use a11y_common::db::NewIssue;
use a11y_common::Impact;

use crate::audit::ReportView;

/// Item fields probed, in order, for the issue description before falling
/// back to the rule's own description
const ITEM_DESCRIPTION_FIELDS: &[&str] = &["helpText", "text"];

/// Extraction precondition failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// Report carries no `audits` object
    #[error("audit report has no audits mapping")]
    MissingAudits,
}

/// Flatten a raw report into issues, in report order
pub fn extract_issues(report: ReportView<'_>) -> Result<Vec<NewIssue>, ExtractError> {
    let audits = report.audits().ok_or(ExtractError::MissingAudits)?;

    let mut issues = Vec::new();
    for (key, audit) in audits {
        if is_passing(audit) {
            continue;
        }

        let Some(items) = audit.pointer("/details/items").and_then(Value::as_array) else {
            continue;
        };

        let rule_id = text_field(audit, "id").unwrap_or(key.as_str());
        let rule_description = text_field(audit, "description").unwrap_or_default();

        issues.extend(
            items
                .iter()
                .map(|item| normalize_item(rule_id, rule_description, item)),
        );
    }

    Ok(issues)
}

fn is_passing(audit: &Value) -> bool {
    audit.get("score").and_then(Value::as_f64) == Some(1.0)
}

fn normalize_item(rule_id: &str, rule_description: &str, item: &Value) -> NewIssue {
    let description = ITEM_DESCRIPTION_FIELDS
        .iter()
        .find_map(|field| text_field(item, field))
        .unwrap_or(rule_description);

    let impact = text_field(item, "impact")
        .map(Impact::from_tag)
        .unwrap_or_default();

    let html_snippet = item
        .pointer("/node/snippet")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    NewIssue {
        rule_id: rule_id.to_string(),
        description: description.to_string(),
        impact,
        html_snippet,
    }
}

/// Non-empty string field of a JSON object
fn text_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
