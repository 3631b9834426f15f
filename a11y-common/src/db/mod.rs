//! Database initialization, models and queries

pub mod analyses;
pub mod init;
pub mod models;

pub use analyses::*;
pub use init::*;
pub use models::*;
