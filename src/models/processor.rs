use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{Position, Revision};

/// Operational state reported for a processor.
///
/// `Stopping` and `Starting` are reported by NiFi while a transition is in flight
/// and are never requested directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessorState {
    Running,
    Stopped,
    Disabled,
    Stopping,
    Starting,
}

impl ProcessorState {
    /// Whether NiFi is still moving the processor between states
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Stopping | Self::Starting)
    }
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Stopped => write!(f, "STOPPED"),
            Self::Disabled => write!(f, "DISABLED"),
            Self::Stopping => write!(f, "STOPPING"),
            Self::Starting => write!(f, "STARTING"),
        }
    }
}

impl std::str::FromStr for ProcessorState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(Self::Running),
            "STOPPED" => Ok(Self::Stopped),
            "DISABLED" => Ok(Self::Disabled),
            "STOPPING" => Ok(Self::Stopping),
            "STARTING" => Ok(Self::Starting),
            _ => Err(format!("Invalid processor state: {s}")),
        }
    }
}

/// Named output relationship of a processor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub name: String,
    #[serde(default)]
    pub auto_terminate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorConfig {
    /// Property values; a controller service reference stores the service id
    #[serde(default)]
    pub properties: BTreeMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_terminated_relationships: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub state: ProcessorState,
    #[serde(default)]
    pub config: ProcessorConfig,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorEntity {
    pub id: String,
    #[serde(default)]
    pub revision: Revision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub component: ProcessorDto,
}

impl ProcessorEntity {
    pub fn name(&self) -> &str {
        &self.component.name
    }

    pub fn state(&self) -> ProcessorState {
        self.component.state
    }

    /// Merge every auto-terminated relationship into the configuration so a
    /// configuration update does not drop it.
    pub fn merge_auto_terminated_relationships(&mut self) {
        let auto_terminated: Vec<String> = self
            .component
            .relationships
            .iter()
            .filter(|relationship| relationship.auto_terminate)
            .map(|relationship| relationship.name.clone())
            .collect();

        if auto_terminated.is_empty() {
            return;
        }

        let configured = self
            .component
            .config
            .auto_terminated_relationships
            .get_or_insert_with(Vec::new);
        for name in auto_terminated {
            if !configured.contains(&name) {
                configured.push(name);
            }
        }
    }
}

/// Body of a state-only processor update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorStateUpdate {
    pub revision: Revision,
    pub component: ProcessorStateComponent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorStateComponent {
    pub id: String,
    pub state: ProcessorState,
}

impl ProcessorStateUpdate {
    pub fn new(id: impl Into<String>, revision: Revision, state: ProcessorState) -> Self {
        Self {
            revision,
            component: ProcessorStateComponent {
                id: id.into(),
                state,
            },
        }
    }
}
