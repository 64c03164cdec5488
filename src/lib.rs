#![allow(clippy::doc_markdown)] // Allow technical terms like NiFi, FlowFile in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # NiFi Deploy
//!
//! Deployment and lifecycle orchestration for flows running on a remote Apache NiFi
//! instance.
//!
//! ## Overview
//!
//! The deployer installs NiFi templates onto named branches of the process group tree
//! (`root>ingest>orders`) and starts, stops and removes those branches safely. It never
//! moves data itself; it observes and commands a running NiFi through its REST API.
//!
//! ## Architecture
//!
//! - Processors and connections of each group level are split into dependency layers,
//!   so a consumer is never started after its producer and a producer is never stopped
//!   while its queues still hold data.
//! - Processor state changes are retried while NiFi still reports the processor as
//!   transitioning; every other rejection is surfaced with the processor's validation
//!   errors.
//! - Templates exported from one environment can bind to same-named controller services
//!   already present in the target, instead of duplicating them.
//!
//! ## Module Organization
//!
//! - [`client`] - the [`FlowApi`] boundary and its HTTP implementation
//! - [`config`] - configuration loading and branch parsing
//! - [`models`] - NiFi REST entities
//! - [`orchestration`] - layering, lifecycle sequencing, template installation
//! - [`utils`] - template document helpers
//! - [`error`] - structured error handling
//! - [`logging`] - tracing setup and structured operation records
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nifi_deploy::client::{FlowApi, NifiApiClient};
//! use nifi_deploy::config::{parse_branch, ConfigLoader};
//! use nifi_deploy::orchestration::{DeployRequest, TemplateInstaller};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load(None)?;
//! let api: Arc<dyn FlowApi> = Arc::new(NifiApiClient::connect(config.nifi.clone()).await?);
//! let installer = TemplateInstaller::new(api, &config.lifecycle);
//!
//! let request = DeployRequest {
//!     branch: parse_branch("root>ingest>orders")?,
//!     template: "orders.xml".into(),
//!     reuse_services: true,
//!     start: true,
//! };
//! installer.deploy(&request).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod utils;

pub use client::{FlowApi, NifiApiClient};
pub use config::{parse_branch, ConfigLoader, DeployConfig, LifecycleConfig, NifiApiConfig};
pub use error::{DeployError, Result};
pub use orchestration::{
    DeployRequest, Layer, LifecycleSequencer, PlacementAllocator, ProcessorStateController,
    QueueDrainer, TemplateInstaller,
};
