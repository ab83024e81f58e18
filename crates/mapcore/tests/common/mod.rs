//! Shared test utilities for mapcore integration tests.
//!
//! Builders for store records and bMessages, so tests only spell out the
//! fields they care about.

pub mod builders;

pub use builders::*;
