//! # Flow API Trait
//!
//! The remote NiFi operations the orchestration core depends on. Everything the
//! lifecycle sequencer, reference resolver and template installer do to a running
//! NiFi instance goes through this trait, so tests can substitute an in-memory
//! implementation for the HTTP client.

use crate::error::Result;
use crate::models::{
    ConnectionEntity, ControllerServiceEntity, FlowEntity, Position, ProcessGroupEntity,
    ProcessGroupFlowEntity, ProcessorEntity, ProcessorState, Revision, ScheduledState,
    TemplateEntity,
};
use async_trait::async_trait;

/// Remote flow-management operations
///
/// Every mutating call takes the most recently observed [`Revision`]; a stale one is
/// rejected by NiFi and surfaces as an error, never as a silent retry.
#[async_trait]
pub trait FlowApi: Send + Sync {
    /// Fetch one process group level with its processors, connections and child groups
    ///
    /// `"root"` is accepted as an alias for the root group id.
    async fn get_flow(&self, group_id: &str) -> Result<ProcessGroupFlowEntity>;

    /// Fetch a process group entity, including its current revision
    async fn get_process_group(&self, group_id: &str) -> Result<ProcessGroupEntity>;

    /// Create a child process group under `parent_id`
    async fn create_process_group(
        &self,
        parent_id: &str,
        name: &str,
        position: Position,
    ) -> Result<ProcessGroupEntity>;

    /// Remove a process group; it must be stopped and empty of queued data
    async fn remove_process_group(&self, group_id: &str, revision: &Revision) -> Result<()>;

    /// Schedule every component of a group at once
    async fn schedule_components(&self, group_id: &str, state: ScheduledState) -> Result<()>;

    /// Fetch a processor, including its validation errors
    async fn get_processor(&self, processor_id: &str) -> Result<ProcessorEntity>;

    /// Request a processor state change
    ///
    /// A body ending with [`crate::constants::TRANSIENT_STATE_MARKER`] means the
    /// processor is still transitioning and the call may be retried.
    async fn update_processor_state(
        &self,
        processor_id: &str,
        revision: &Revision,
        state: ProcessorState,
    ) -> Result<ProcessorEntity>;

    /// Persist a processor's full configuration
    async fn update_processor(&self, processor: &ProcessorEntity) -> Result<ProcessorEntity>;

    /// Controller services visible from a group, ancestors included
    async fn get_controller_services(&self, group_id: &str) -> Result<Vec<ControllerServiceEntity>>;

    /// Upload a template document into a group
    async fn upload_template(
        &self,
        group_id: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<TemplateEntity>;

    /// Instantiate an uploaded template at the given origin
    async fn instantiate_template(
        &self,
        group_id: &str,
        template_id: &str,
        origin: Position,
    ) -> Result<FlowEntity>;

    async fn list_templates(&self) -> Result<Vec<TemplateEntity>>;

    async fn remove_template(&self, template_id: &str) -> Result<()>;

    /// Fetch a connection with its queue status
    async fn get_connection(&self, connection_id: &str) -> Result<ConnectionEntity>;
}
