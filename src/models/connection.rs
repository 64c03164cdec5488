use serde::{Deserialize, Serialize};

use super::{Position, Revision};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatusSnapshot {
    #[serde(default)]
    pub flow_files_queued: i64,
    #[serde(default)]
    pub bytes_queued: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_snapshot: Option<ConnectionStatusSnapshot>,
}

/// Directed queue between two connectables (processors or ports)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEntity {
    pub id: String,
    #[serde(default)]
    pub revision: Revision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub source_id: String,
    pub destination_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConnectionStatus>,
}

impl ConnectionEntity {
    /// FlowFiles currently queued; a missing status snapshot counts as empty
    pub fn queued_flow_files(&self) -> i64 {
        self.status
            .as_ref()
            .and_then(|status| status.aggregate_snapshot.as_ref())
            .map_or(0, |snapshot| snapshot.flow_files_queued)
    }
}
