//! HTTP API handlers for a11y-audit

pub mod analyses;
pub mod analyze;
pub mod buildinfo;
pub mod health;

pub use analyses::analysis_routes;
pub use analyze::analyze_routes;
pub use buildinfo::get_build_info;
pub use health::health_routes;
