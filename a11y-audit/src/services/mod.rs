//! Ingestion services
//!
//! - [`issue_extractor`]: raw report → normalized issues
//! - [`ingest`]: audit → extraction → transactional persistence

pub mod ingest;
pub mod issue_extractor;

pub use ingest::{AnalysisOutcome, IngestError, IngestOrchestrator, IngestSettings};
pub use issue_extractor::{extract_issues, ExtractError};
