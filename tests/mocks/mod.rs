//! Test doubles for the NiFi REST boundary

pub mod mock_flow_api;

pub use mock_flow_api::*;
