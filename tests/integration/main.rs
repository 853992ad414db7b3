//! Integration tests for Thread-Trail
//!
//! These tests serve forum markup from wiremock servers and drive the real
//! HTTP page source through assembly and traversal.

mod fixtures;
mod source_tests;
mod traversal_tests;
