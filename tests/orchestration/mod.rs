//! Orchestration Integration Tests
//!
//! Lifecycle sequencing, processor state changes and template installation driven
//! through the mock FlowApi.

pub mod template_installer_test;
