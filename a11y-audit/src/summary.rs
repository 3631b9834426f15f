//! Report derivations for the analysis detail view
//!
//! Pure functions over persisted issues and the stored raw report:
//! - issues grouped by description (not by rule id + impact)
//! - issue count per impact label
//! - issue count per rule, most affected rules first
//! - headline figures for summary cards

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use a11y_common::db::{AccessibilityIssue, AnalysisDetail};
use a11y_common::Impact;

use crate::audit::ReportView;

/// Prefix trimmed from rule titles for chart labels
const TITLE_PREFIX_TO_STRIP: &str = "Does not have a ";

/// Issues sharing one description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedIssue {
    /// Rule id of the first member encountered
    pub rule_id: String,
    pub description: String,
    /// Impact of the first member encountered
    pub impact: String,
    pub count: usize,
    /// Non-null snippets of all members, in encounter order
    pub snippets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
}

/// Number of issues carrying one impact label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactCount {
    pub name: String,
    pub value: usize,
}

/// Number of issues reported under one rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleCount {
    pub rule_id: String,
    pub name: String,
    pub issues_count: usize,
}

/// Qualitative bucket for the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Good,
    Average,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            ScoreBand::Good
        } else if score >= 50.0 {
            ScoreBand::Average
        } else {
            ScoreBand::Poor
        }
    }
}

/// Everything the detail view renders besides the raw issue table
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOverview {
    pub analysis_id: i64,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub overall_score: f64,
    pub score_band: ScoreBand,
    pub total_issues: usize,
    pub critical_issues: usize,
    pub grouped_issues: Vec<GroupedIssue>,
    pub impact_distribution: Vec<ImpactCount>,
    pub rule_breakdown: Vec<RuleCount>,
}

/// Coalesce issues with identical descriptions, keeping first-seen order
pub fn group_issues(issues: &[AccessibilityIssue], report: ReportView<'_>) -> Vec<GroupedIssue> {
    let mut groups: Vec<GroupedIssue> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for issue in issues {
        let slot = *index.entry(issue.description.as_str()).or_insert_with(|| {
            groups.push(GroupedIssue {
                rule_id: issue.rule_id.clone(),
                description: issue.description.clone(),
                impact: issue.impact.clone(),
                count: 0,
                snippets: Vec::new(),
                help_url: report.help_url(&issue.rule_id).map(str::to_string),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.count += 1;
        if let Some(snippet) = issue.html_snippet.as_ref().filter(|s| !s.is_empty()) {
            group.snippets.push(snippet.clone());
        }
    }

    groups
}

/// Issue count per capitalized impact label, in first-seen order
pub fn impact_distribution(issues: &[AccessibilityIssue]) -> Vec<ImpactCount> {
    let mut counts: Vec<ImpactCount> = Vec::new();

    for issue in issues {
        let name = Impact::from_tag(&issue.impact).label();
        match counts.iter_mut().find(|c| c.name == name) {
            Some(count) => count.value += 1,
            None => counts.push(ImpactCount { name, value: 1 }),
        }
    }

    counts
}

/// Issue count per rule, most issues first (ties keep first-seen order)
pub fn rule_breakdown(grouped: &[GroupedIssue], report: ReportView<'_>) -> Vec<RuleCount> {
    let mut rules: Vec<RuleCount> = Vec::new();

    for group in grouped {
        match rules.iter_mut().find(|r| r.rule_id == group.rule_id) {
            Some(rule) => rule.issues_count += group.count,
            None => rules.push(RuleCount {
                rule_id: group.rule_id.clone(),
                name: display_name(&group.rule_id, report),
                issues_count: group.count,
            }),
        }
    }

    rules.sort_by(|a, b| b.issues_count.cmp(&a.issues_count));
    rules
}

/// Build the full summary for one analysis
pub fn summarize(detail: &AnalysisDetail) -> AnalysisOverview {
    let report = ReportView::new(&detail.analysis.raw_lighthouse_report);
    let grouped_issues = group_issues(&detail.issues, report);
    let rule_breakdown = rule_breakdown(&grouped_issues, report);

    AnalysisOverview {
        analysis_id: detail.analysis.id,
        url: detail.analysis.url.clone(),
        timestamp: detail.analysis.timestamp,
        overall_score: detail.analysis.overall_score,
        score_band: ScoreBand::from_score(detail.analysis.overall_score),
        total_issues: detail.issues.len(),
        critical_issues: detail
            .issues
            .iter()
            .filter(|i| Impact::from_tag(&i.impact) == Impact::Critical)
            .count(),
        impact_distribution: impact_distribution(&detail.issues),
        grouped_issues,
        rule_breakdown,
    }
}

fn display_name(rule_id: &str, report: ReportView<'_>) -> String {
    report
        .audit_title(rule_id)
        .unwrap_or(rule_id)
        .replacen(TITLE_PREFIX_TO_STRIP, "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11y_common::db::Analysis;
    use serde_json::{json, Value};

    fn issue(id: i64, rule_id: &str, description: &str, impact: &str, snippet: Option<&str>) -> AccessibilityIssue {
        AccessibilityIssue {
            id,
            analysis_id: 1,
            rule_id: rule_id.to_string(),
            description: description.to_string(),
            impact: impact.to_string(),
            html_snippet: snippet.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn raw_report() -> Value {
        json!({
            "audits": {
                "image-alt": {
                    "title": "Image elements do not have `[alt]` attributes",
                    "helpUrl": "https://example.org/image-alt"
                },
                "html-has-lang": {
                    "title": "Does not have a `<html>` element with a `[lang]` attribute"
                }
            }
        })
    }

    #[test]
    fn test_same_description_collapses_with_snippets_in_order() {
        let raw = raw_report();
        let issues = vec![
            issue(1, "image-alt", "Images need alt text", "moderate", Some("<img a>")),
            issue(2, "image-alt", "Images need alt text", "moderate", Some("<img b>")),
        ];

        let grouped = group_issues(&issues, ReportView::new(&raw));

        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].count, 2);
        assert_eq!(grouped[0].snippets, vec!["<img a>".to_string(), "<img b>".to_string()]);
        assert_eq!(grouped[0].help_url.as_deref(), Some("https://example.org/image-alt"));
    }

    #[test]
    fn test_grouping_key_is_description_only() {
        let raw = json!({});
        let issues = vec![
            issue(1, "rule-a", "Shared text", "serious", None),
            issue(2, "rule-b", "Shared text", "minor", Some("<div>")),
            issue(3, "rule-a", "Other text", "serious", None),
        ];

        let grouped = group_issues(&issues, ReportView::new(&raw));

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].description, "Shared text");
        assert_eq!(grouped[0].rule_id, "rule-a");
        assert_eq!(grouped[0].impact, "serious");
        assert_eq!(grouped[0].count, 2);
        assert_eq!(grouped[0].snippets, vec!["<div>".to_string()]);
        assert_eq!(grouped[1].description, "Other text");
        assert!(grouped[1].snippets.is_empty());
        assert!(grouped[1].help_url.is_none());
    }

    #[test]
    fn test_impact_distribution_labels() {
        let issues = vec![
            issue(1, "a", "x", "serious", None),
            issue(2, "b", "y", "critical", None),
            issue(3, "c", "z", "serious", None),
        ];

        assert_eq!(
            impact_distribution(&issues),
            vec![
                ImpactCount { name: "Serious".to_string(), value: 2 },
                ImpactCount { name: "Critical".to_string(), value: 1 },
            ]
        );
    }

    #[test]
    fn test_rule_breakdown_sorted_and_named() {
        let raw = raw_report();
        let view = ReportView::new(&raw);
        let issues = vec![
            issue(1, "html-has-lang", "Lang missing", "serious", None),
            issue(2, "image-alt", "Alt missing", "moderate", None),
            issue(3, "image-alt", "Alt missing", "moderate", None),
            issue(4, "image-alt", "Alt empty", "moderate", None),
            issue(5, "label", "Label missing", "critical", None),
        ];

        let grouped = group_issues(&issues, view);
        let rules = rule_breakdown(&grouped, view);

        let summary: Vec<(&str, &str, usize)> = rules
            .iter()
            .map(|r| (r.rule_id.as_str(), r.name.as_str(), r.issues_count))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("image-alt", "Image elements do not have `[alt]` attributes", 3),
                ("html-has-lang", "`<html>` element with a `[lang]` attribute", 1),
                ("label", "label", 1),
            ]
        );
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(90.0), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(89.99), ScoreBand::Average);
        assert_eq!(ScoreBand::from_score(50.0), ScoreBand::Average);
        assert_eq!(ScoreBand::from_score(0.0), ScoreBand::Poor);
    }

    #[test]
    fn test_summarize_counts() {
        let detail = AnalysisDetail {
            analysis: Analysis {
                id: 7,
                url: "https://example.com".to_string(),
                timestamp: Utc::now(),
                overall_score: 72.5,
                raw_lighthouse_report: raw_report(),
            },
            issues: vec![
                issue(1, "label", "Label missing", "critical", None),
                issue(2, "image-alt", "Alt missing", "moderate", Some("<img>")),
                issue(3, "button-name", "Name missing", "Critical", None),
            ],
        };

        let summary = summarize(&detail);

        assert_eq!(summary.analysis_id, 7);
        assert_eq!(summary.score_band, ScoreBand::Average);
        assert_eq!(summary.total_issues, 3);
        assert_eq!(summary.critical_issues, 2);
        assert_eq!(summary.grouped_issues.len(), 3);
        assert_eq!(summary.rule_breakdown.len(), 3);
    }
}
