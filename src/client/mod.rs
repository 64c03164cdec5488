//! # NiFi Client
//!
//! The [`FlowApi`] trait is the boundary between the orchestration core and a running
//! NiFi instance; [`NifiApiClient`] implements it over HTTP.

pub mod nifi_client;
pub mod traits;

pub use nifi_client::NifiApiClient;
pub use traits::FlowApi;
