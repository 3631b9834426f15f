//! Audit execution
//!
//! The audit tool is reached through the [`AuditRunner`] / [`BrowserSession`]
//! traits. [`LighthouseRunner`] drives headless Chrome and the Lighthouse CLI;
//! tests substitute scripted runners.

pub mod lighthouse;
pub mod report;
pub mod runner;

pub use lighthouse::LighthouseRunner;
pub use report::{AuditReport, ReportView};
pub use runner::{AuditError, AuditRunner, BrowserSession};
