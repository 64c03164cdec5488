use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ConnectionEntity, Position, ProcessorEntity, Revision};

/// Bulk scheduling state applied to a whole process group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduledState {
    Running,
    Stopped,
}

impl fmt::Display for ScheduledState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Body of `PUT /flow/process-groups/{id}`; no component list means every component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleComponentsEntity {
    pub id: String,
    pub state: ScheduledState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessGroupDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessGroupEntity {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub revision: Revision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default)]
    pub component: ProcessGroupDto,
}

impl ProcessGroupEntity {
    /// Entity body used to create a child group
    pub fn new_child(name: impl Into<String>, position: Position, client_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            revision: Revision::initial(client_id),
            position: None,
            component: ProcessGroupDto {
                id: None,
                name: name.into(),
                position: Some(position),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.component.name
    }

    /// Position from the entity, falling back to the component's copy
    pub fn effective_position(&self) -> Option<Position> {
        self.position.or(self.component.position)
    }
}

/// Any other positioned canvas element (ports, funnels, labels)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedEntity {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Contents of one process group level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDto {
    #[serde(default)]
    pub process_groups: Vec<ProcessGroupEntity>,
    #[serde(default)]
    pub processors: Vec<ProcessorEntity>,
    #[serde(default)]
    pub connections: Vec<ConnectionEntity>,
    #[serde(default)]
    pub input_ports: Vec<PositionedEntity>,
    #[serde(default)]
    pub output_ports: Vec<PositionedEntity>,
    #[serde(default)]
    pub funnels: Vec<PositionedEntity>,
    #[serde(default)]
    pub labels: Vec<PositionedEntity>,
}

impl FlowDto {
    /// Every position currently occupied on this level of the canvas
    pub fn occupied_positions(&self) -> Vec<Position> {
        let processors = self.processors.iter().map(|p| p.position);
        let groups = self.process_groups.iter().map(ProcessGroupEntity::effective_position);
        let connections = self.connections.iter().map(|c| c.position);
        let others = self
            .input_ports
            .iter()
            .chain(&self.output_ports)
            .chain(&self.funnels)
            .chain(&self.labels)
            .map(|e| e.position);

        processors
            .chain(groups)
            .chain(connections)
            .chain(others)
            .flatten()
            .collect()
    }

    /// Child group whose name matches after trimming surrounding whitespace
    pub fn find_group_by_name(&self, name: &str) -> Option<&ProcessGroupEntity> {
        let wanted = name.trim();
        self.process_groups
            .iter()
            .find(|group| group.name().trim() == wanted)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessGroupFlowDto {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group_id: Option<String>,
    #[serde(default)]
    pub flow: FlowDto,
}

/// Snapshot of one process group level as returned by `GET /flow/process-groups/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessGroupFlowEntity {
    pub process_group_flow: ProcessGroupFlowDto,
}

impl ProcessGroupFlowEntity {
    pub fn id(&self) -> &str {
        &self.process_group_flow.id
    }

    pub fn flow(&self) -> &FlowDto {
        &self.process_group_flow.flow
    }
}

/// Result of instantiating a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEntity {
    #[serde(default)]
    pub flow: FlowDto,
}
