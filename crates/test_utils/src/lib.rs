//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! quoting test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data (money, dates, sessions, quote forms)
//! - `builders`: Builders for marine and travel quote forms
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
