//! Test Helper Utilities
//!
//! Shared utilities for testing a11y-audit

#![allow(dead_code)]

pub mod db_utils;
pub mod mock_runner;
