//! # Processor State Controller
//!
//! Moves a single processor between operational states and persists its
//! configuration.
//!
//! NiFi reports state changes asynchronously: asking a processor that is still
//! `STOPPING` to start is rejected with a body ending in
//! [`TRANSIENT_STATE_MARKER`](crate::constants::TRANSIENT_STATE_MARKER). Those
//! rejections are retried every `interval` until `timeout`; any other rejection is
//! final and becomes a [`DeployError::Configuration`] carrying the remote message and
//! the processor's validation errors.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, instrument};

use crate::client::FlowApi;
use crate::config::LifecycleConfig;
use crate::error::{DeployError, Result};
use crate::logging::log_processor_operation;
use crate::models::{ProcessorEntity, ProcessorState};

pub struct ProcessorStateController {
    api: Arc<dyn FlowApi>,
    interval: Duration,
    timeout: Duration,
}

impl ProcessorStateController {
    pub fn new(api: Arc<dyn FlowApi>, config: &LifecycleConfig) -> Self {
        Self {
            api,
            interval: config.interval(),
            timeout: config.timeout(),
        }
    }

    /// Request `desired` for `processor`.
    ///
    /// No remote call is made when the processor already reports `desired`. On
    /// success the processor's state and revision are replaced with NiFi's answer;
    /// on failure the processor is left untouched.
    #[instrument(skip(self, processor), fields(processor_id = %processor.id, desired = %desired))]
    pub async fn set_state(
        &self,
        processor: &mut ProcessorEntity,
        desired: ProcessorState,
    ) -> Result<()> {
        if processor.state() == desired {
            info!(
                processor_id = %processor.id,
                processor_name = %processor.name(),
                state = %desired,
                "Processor already in desired state"
            );
            return Ok(());
        }

        let deadline = Instant::now() + self.timeout;
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let outcome = self
                .api
                .update_processor_state(&processor.id, &processor.revision, desired)
                .await;

            match outcome {
                Ok(updated) => {
                    processor.revision = updated.revision;
                    processor.component.state = updated.component.state;
                    log_processor_operation(
                        "set_state",
                        &processor.id,
                        Some(processor.name()),
                        &processor.component.state.to_string(),
                        None,
                    );
                    return Ok(());
                }
                Err(e) if e.is_transient_state_conflict() => {
                    if Instant::now() + self.interval > deadline {
                        let diagnostics = self.validation_errors(&processor.id).await;
                        return Err(Self::failure(
                            processor,
                            desired,
                            &format!(
                                "still transitioning after {attempts} attempts over {:?}: {}",
                                self.timeout,
                                e.remote_message()
                            ),
                            &diagnostics,
                        ));
                    }
                    info!(
                        processor_id = %processor.id,
                        attempt = attempts,
                        error = %e.remote_message(),
                        "Processor still transitioning, will retry"
                    );
                    sleep(self.interval).await;
                }
                Err(e) => {
                    let diagnostics = self.validation_errors(&processor.id).await;
                    return Err(Self::failure(
                        processor,
                        desired,
                        &e.remote_message(),
                        &diagnostics,
                    ));
                }
            }
        }
    }

    /// Persist the processor's full configuration, keeping auto-terminated relationships
    pub async fn update_processor(&self, processor: &mut ProcessorEntity) -> Result<()> {
        let mut outgoing = processor.clone();
        outgoing.merge_auto_terminated_relationships();

        let updated = self.api.update_processor(&outgoing).await.map_err(|e| {
            DeployError::Configuration(format!(
                "{} ({}) configuration could not be updated: {}",
                processor.name(),
                processor.id,
                e.remote_message()
            ))
        })?;

        debug!(
            processor_id = %processor.id,
            revision = updated.revision.version,
            "Processor configuration updated"
        );
        *processor = updated;
        Ok(())
    }

    /// Best-effort fetch of validation errors; failures are logged and swallowed
    async fn validation_errors(&self, processor_id: &str) -> Vec<String> {
        match self.api.get_processor(processor_id).await {
            Ok(current) => {
                let errors = current.component.validation_errors.unwrap_or_default();
                for message in &errors {
                    error!(processor_id = %processor_id, validation_error = %message, "Processor validation error");
                }
                errors
            }
            Err(e) => {
                error!(processor_id = %processor_id, error = %e, "Failed to fetch processor validation errors");
                Vec::new()
            }
        }
    }

    fn failure(
        processor: &ProcessorEntity,
        desired: ProcessorState,
        reason: &str,
        diagnostics: &[String],
    ) -> DeployError {
        let mut message = format!(
            "{} ({}) could not be set to {}: {}",
            processor.name(),
            processor.id,
            desired,
            reason
        );
        if !diagnostics.is_empty() {
            message.push_str(&format!(" [validation errors: {}]", diagnostics.join("; ")));
        }
        DeployError::Configuration(message)
    }
}
