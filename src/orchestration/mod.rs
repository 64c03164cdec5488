//! # Orchestration
//!
//! Dependency-aware lifecycle control of NiFi process group trees and template
//! deployment onto branches of those trees.

pub mod dependency_graph;
pub mod lifecycle;
pub mod placement;
pub mod processor_state;
pub mod queue_drain;
pub mod reference_resolver;
pub mod template_installer;

pub use dependency_graph::{layer, layer_flow, Layer};
pub use lifecycle::LifecycleSequencer;
pub use placement::PlacementAllocator;
pub use processor_state::ProcessorStateController;
pub use queue_drain::QueueDrainer;
pub use reference_resolver::{resolve, rewrite_references};
pub use template_installer::{DeployRequest, TemplateInstaller};
