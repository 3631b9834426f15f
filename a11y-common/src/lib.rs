//! # a11y-common
//!
//! Shared code for the accessibility audit service:
//! - Error type and result alias
//! - Bootstrap configuration (TOML + environment resolution)
//! - Impact (severity) vocabulary
//! - Database initialization, schema and row models
//! - Score arithmetic

pub mod config;
pub mod db;
pub mod error;
pub mod impact;
pub mod score;

pub use error::{Error, Result};
pub use impact::Impact;
