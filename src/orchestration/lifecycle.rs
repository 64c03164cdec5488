//! # Lifecycle Sequencer
//!
//! Starts and stops a process group tree in dependency order, and resolves branch
//! paths to process groups.
//!
//! ## Ordering
//!
//! Each group level is split into layers by [`layer_flow`]. Starting walks the layers
//! from the last computed one back to the first, so consumers are running before the
//! producers feeding them. Stopping walks them forward: a producer is stopped, then
//! every queue it feeds is drained, then its consumers are stopped. Child groups are
//! fetched fresh from NiFi and handled the same way after their parent level.
//!
//! ## Rollback
//!
//! A failure anywhere in the tree reverts only the top-level group with one bulk
//! schedule call (`STOPPED` after a failed start, `RUNNING` after a failed stop). The
//! original error is returned; a failing rollback is only logged.

use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::client::FlowApi;
use crate::config::LifecycleConfig;
use crate::constants::ROOT_GROUP_ALIAS;
use crate::error::{DeployError, Result};
use crate::logging::{log_error, log_group_operation};
use crate::models::{ProcessGroupFlowEntity, ProcessorState, ScheduledState};

use super::dependency_graph::{layer_flow, Layer};
use super::placement::PlacementAllocator;
use super::processor_state::ProcessorStateController;
use super::queue_drain::QueueDrainer;

pub struct LifecycleSequencer {
    api: Arc<dyn FlowApi>,
    processors: ProcessorStateController,
    drainer: QueueDrainer,
    placement: PlacementAllocator,
}

impl LifecycleSequencer {
    pub fn new(api: Arc<dyn FlowApi>, config: &LifecycleConfig) -> Self {
        Self {
            processors: ProcessorStateController::new(api.clone(), config),
            drainer: QueueDrainer::new(api.clone(), config),
            placement: PlacementAllocator::default(),
            api,
        }
    }

    pub fn with_placement(mut self, placement: PlacementAllocator) -> Self {
        self.placement = placement;
        self
    }

    pub fn processor_controller(&self) -> &ProcessorStateController {
        &self.processors
    }

    /// Start every processor of the group and its descendants
    #[instrument(skip(self, group), fields(group_id = %group.id()))]
    pub async fn start(&self, group: &ProcessGroupFlowEntity) -> Result<()> {
        match self.start_tree(group.clone()).await {
            Ok(()) => {
                log_group_operation("start", group.id(), None, "running", None);
                Ok(())
            }
            Err(e) => {
                self.rollback(group.id(), ScheduledState::Stopped, &e).await;
                Err(e)
            }
        }
    }

    /// Stop every processor of the group and its descendants, draining queues on the way
    #[instrument(skip(self, group), fields(group_id = %group.id()))]
    pub async fn stop(&self, group: &ProcessGroupFlowEntity) -> Result<()> {
        match self.stop_tree(group.clone()).await {
            Ok(()) => {
                log_group_operation("stop", group.id(), None, "stopped", None);
                Ok(())
            }
            Err(e) => {
                self.rollback(group.id(), ScheduledState::Running, &e).await;
                Err(e)
            }
        }
    }

    fn start_tree(&self, group: ProcessGroupFlowEntity) -> BoxFuture<'_, Result<()>> {
        async move {
            let layers = layer_flow(&group)?;
            debug!(group_id = %group.id(), layers = layers.len(), "Starting group level");

            for layer in layers.into_iter().rev() {
                // queues carry no state of their own
                if let Layer::Components(mut processors) = layer {
                    for processor in processors.iter_mut() {
                        self.processors
                            .set_state(processor, ProcessorState::Running)
                            .await?;
                    }
                }
            }

            for child in &group.flow().process_groups {
                let child_flow = self.api.get_flow(&child.id).await?;
                self.start_tree(child_flow).await?;
            }
            Ok(())
        }
        .boxed()
    }

    fn stop_tree(&self, group: ProcessGroupFlowEntity) -> BoxFuture<'_, Result<()>> {
        async move {
            let layers = layer_flow(&group)?;
            debug!(group_id = %group.id(), layers = layers.len(), "Stopping group level");

            for layer in layers {
                match layer {
                    Layer::Components(mut processors) => {
                        for processor in processors.iter_mut() {
                            self.processors
                                .set_state(processor, ProcessorState::Stopped)
                                .await?;
                        }
                    }
                    Layer::Queues(connections) => {
                        for connection in &connections {
                            self.drainer.wait_empty_queue(connection).await?;
                        }
                    }
                }
            }

            for child in &group.flow().process_groups {
                let child_flow = self.api.get_flow(&child.id).await?;
                self.stop_tree(child_flow).await?;
            }
            Ok(())
        }
        .boxed()
    }

    async fn rollback(&self, group_id: &str, state: ScheduledState, cause: &DeployError) {
        warn!(
            group_id = %group_id,
            rollback_state = %state,
            error = %cause,
            "Lifecycle operation failed, rolling back group state"
        );
        if let Err(e) = self.api.schedule_components(group_id, state).await {
            log_error(
                "LifecycleSequencer",
                "rollback",
                &e.to_string(),
                Some(&format!("group {group_id} could not be set to {state}")),
            );
        }
    }

    /// Walk `branch` from the root group, matching child names after trimming.
    ///
    /// The first segment names the root and is not looked up. Returns `None` at the
    /// first segment with no matching child.
    pub async fn change_directory(
        &self,
        branch: &[String],
    ) -> Result<Option<ProcessGroupFlowEntity>> {
        let mut current = self.api.get_flow(ROOT_GROUP_ALIAS).await?;

        for name in branch.iter().skip(1) {
            let next_id = match current.flow().find_group_by_name(name) {
                Some(child) => child.id.clone(),
                None => {
                    debug!(segment = %name, parent_id = %current.id(), "Branch segment not found");
                    return Ok(None);
                }
            };
            current = self.api.get_flow(&next_id).await?;
        }
        Ok(Some(current))
    }

    /// Walk `branch` like [`Self::change_directory`], creating every missing segment on
    /// a free canvas slot of its parent
    pub async fn create_directory(&self, branch: &[String]) -> Result<ProcessGroupFlowEntity> {
        let mut current = self.api.get_flow(ROOT_GROUP_ALIAS).await?;

        for name in branch.iter().skip(1) {
            let next_id = match current.flow().find_group_by_name(name) {
                Some(child) => child.id.clone(),
                None => {
                    let position = self
                        .placement
                        .next_position(&current.flow().occupied_positions());
                    let created = self
                        .api
                        .create_process_group(current.id(), name.trim(), position)
                        .await?;
                    info!(
                        group_id = %created.id,
                        name = %name.trim(),
                        parent_id = %current.id(),
                        x = position.x,
                        y = position.y,
                        "Created process group"
                    );
                    created.id
                }
            };
            current = self.api.get_flow(&next_id).await?;
        }

        log_group_operation("create_directory", current.id(), Some(branch), "ready", None);
        Ok(current)
    }
}
