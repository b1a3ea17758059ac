//! Integration tests - Tests that go from a YAML model on disk to SQL text
//!
//! These tests verify that model loading, parent resolution and template
//! rendering work together.

mod customer_contact_load_tests;
mod template_override_tests;
