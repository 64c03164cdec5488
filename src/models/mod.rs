//! # NiFi REST Models
//!
//! Serde representations of the entities exchanged with the NiFi REST API. Every
//! mutable entity travels together with its [`Revision`]; the latest observed revision
//! must be presented on each mutation or NiFi rejects it.

pub mod connection;
pub mod controller_service;
pub mod process_group;
pub mod processor;
pub mod template;

use serde::{Deserialize, Serialize};

pub use connection::{ConnectionEntity, ConnectionStatus, ConnectionStatusSnapshot};
pub use controller_service::{ControllerServiceDto, ControllerServiceEntity, ControllerServicesEntity};
pub use process_group::{
    FlowDto, FlowEntity, PositionedEntity, ProcessGroupDto, ProcessGroupEntity,
    ProcessGroupFlowDto, ProcessGroupFlowEntity, ScheduleComponentsEntity, ScheduledState,
};
pub use processor::{
    ProcessorConfig, ProcessorDto, ProcessorEntity, ProcessorState, ProcessorStateUpdate,
    Relationship,
};
pub use template::{InstantiateTemplateRequest, TemplateDto, TemplateEntity, TemplatesEntity};

/// Optimistic-concurrency token owned by NiFi
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    #[serde(default)]
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl Revision {
    /// Initial revision used when creating a new component
    pub fn initial(client_id: impl Into<String>) -> Self {
        Self {
            version: 0,
            client_id: Some(client_id.into()),
        }
    }
}

/// Canvas coordinate of a component
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
