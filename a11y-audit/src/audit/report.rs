//! Raw audit report access
//!
//! The report is kept as a self-describing JSON document and stored verbatim.
//! Only the handful of fields the service needs are probed, through
//! [`ReportView`] accessors, so unknown or missing fields never fail a read.

use serde_json::{Map, Value};

/// Category whose score becomes the analysis' overall score
pub const ACCESSIBILITY_CATEGORY: &str = "accessibility";

/// Owned raw audit report (Lighthouse result object)
#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    raw: Value,
}

impl AuditReport {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Borrowed accessor view
    pub fn view(&self) -> ReportView<'_> {
        ReportView::new(&self.raw)
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }
}

/// Read-only accessors over a raw report document
#[derive(Debug, Clone, Copy)]
pub struct ReportView<'a> {
    raw: &'a Value,
}

impl<'a> ReportView<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    /// Score fraction of a category; `None` when absent or null
    pub fn category_score(&self, category: &str) -> Option<f64> {
        self.raw
            .get("categories")?
            .get(category)?
            .get("score")?
            .as_f64()
    }

    /// Accessibility category score fraction
    pub fn accessibility_score(&self) -> Option<f64> {
        self.category_score(ACCESSIBILITY_CATEGORY)
    }

    /// Rule id → audit result mapping, in document order
    pub fn audits(&self) -> Option<&'a Map<String, Value>> {
        self.raw.get("audits")?.as_object()
    }

    /// Single audit result by rule id
    pub fn audit(&self, rule_id: &str) -> Option<&'a Value> {
        self.audits()?.get(rule_id)
    }

    /// Documentation link of a rule, if the tool supplied one
    pub fn help_url(&self, rule_id: &str) -> Option<&'a str> {
        self.audit(rule_id)?.get("helpUrl")?.as_str()
    }

    /// Human-readable rule title, if the tool supplied one
    pub fn audit_title(&self, rule_id: &str) -> Option<&'a str> {
        self.audit(rule_id)?.get("title")?.as_str()
    }

    /// Fatal error recorded by the tool (e.g. page failed to load)
    pub fn runtime_error(&self) -> Option<String> {
        let error = self.raw.get("runtimeError")?;
        let code = error.get("code").and_then(Value::as_str);
        let message = error.get("message").and_then(Value::as_str);
        match (code, message) {
            (Some(code), Some(message)) => Some(format!("{}: {}", code, message)),
            (Some(code), None) => Some(code.to_string()),
            (None, Some(message)) => Some(message.to_string()),
            (None, None) => None,
        }
    }
}
