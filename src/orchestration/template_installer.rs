//! # Template Installer
//!
//! Deploys a NiFi template onto a branch of the process group tree and tears
//! branches down again.
//!
//! ## Deploy
//!
//! 1. Resolve the branch, creating missing groups ([`LifecycleSequencer::create_directory`])
//! 2. Upload the template, optionally stripped of services the target already has
//! 3. Instantiate it at the origin of the branch group
//! 4. Rebind service references and persist processor configuration (reuse mode only)
//! 5. Optionally start the branch group
//!
//! ## Undeploy
//!
//! A branch that does not exist is a warning, not an error. Otherwise the templates
//! uploaded into the group are removed, the group is stopped (draining its queues) and
//! removed with its latest revision.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::client::FlowApi;
use crate::config::LifecycleConfig;
use crate::error::{DeployError, Result};
use crate::logging::{log_error, log_group_operation};
use crate::models::{ControllerServiceEntity, FlowEntity, Position, ProcessGroupFlowEntity};
use crate::utils::template_xml;

use super::lifecycle::LifecycleSequencer;
use super::reference_resolver;

/// One deployment of a template file onto a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Branch segments, the first naming the root group
    pub branch: Vec<String>,
    pub template: PathBuf,
    /// Bind to same-named controller services already visible from the branch
    pub reuse_services: bool,
    /// Start the branch group once installed
    pub start: bool,
}

pub struct TemplateInstaller {
    api: Arc<dyn FlowApi>,
    sequencer: LifecycleSequencer,
}

impl TemplateInstaller {
    pub fn new(api: Arc<dyn FlowApi>, config: &LifecycleConfig) -> Self {
        Self {
            sequencer: LifecycleSequencer::new(api.clone(), config),
            api,
        }
    }

    pub fn sequencer(&self) -> &LifecycleSequencer {
        &self.sequencer
    }

    /// Install the template and optionally start the branch group
    #[instrument(skip(self, request), fields(branch = %request.branch.join(">"), reuse_services = request.reuse_services))]
    pub async fn deploy(&self, request: &DeployRequest) -> Result<ProcessGroupFlowEntity> {
        let group = if request.reuse_services {
            self.install_on_branch_use_parent_service(&request.branch, &request.template)
                .await?
        } else {
            self.install_on_branch(&request.branch, &request.template)
                .await?
        };

        if request.start {
            self.sequencer.start(&group).await?;
        }

        log_group_operation(
            "deploy",
            group.id(),
            Some(&request.branch),
            if request.start { "running" } else { "installed" },
            Some(&request.template.display().to_string()),
        );
        Ok(group)
    }

    /// Upload the template unchanged and instantiate it; returns the refreshed branch group
    pub async fn install_on_branch(
        &self,
        branch: &[String],
        template: &Path,
    ) -> Result<ProcessGroupFlowEntity> {
        let group = self.sequencer.create_directory(branch).await?;
        let content = tokio::fs::read(template).await?;
        self.upload_and_instantiate(group.id(), template, content)
            .await?;
        self.api.get_flow(group.id()).await
    }

    /// Upload the template without the services already visible from the branch, then
    /// rebind references to those services; returns the refreshed branch group
    pub async fn install_on_branch_use_parent_service(
        &self,
        branch: &[String],
        template: &Path,
    ) -> Result<ProcessGroupFlowEntity> {
        let outcome = self.install_reusing_services(branch, template).await;
        if let Err(e) = &outcome {
            log_error(
                "TemplateInstaller",
                "install_on_branch_use_parent_service",
                &e.to_string(),
                Some(&format!("template {}", template.display())),
            );
        }
        outcome
    }

    async fn install_reusing_services(
        &self,
        branch: &[String],
        template: &Path,
    ) -> Result<ProcessGroupFlowEntity> {
        let group = self.sequencer.create_directory(branch).await?;
        let xml = tokio::fs::read_to_string(template).await?;

        let template_services = template_xml::service_id_to_name(&xml)?;
        let available = self.api.get_controller_services(group.id()).await?;
        let filtered = template_xml::retain_services(&xml, |declared| {
            !available.iter().any(|s| s.matches_name(&declared.name))
        })?;

        let instantiated = self
            .upload_and_instantiate(group.id(), template, filtered.into_bytes())
            .await?;
        self.bind_processors(instantiated, &available, &template_services)
            .await?;

        self.api.get_flow(group.id()).await
    }

    /// Rebind references, then persist every remaining processor so auto-terminated
    /// relationships survive instantiation
    async fn bind_processors(
        &self,
        instantiated: FlowEntity,
        available: &[ControllerServiceEntity],
        template_services: &HashMap<String, String>,
    ) -> Result<()> {
        let controller = self.sequencer.processor_controller();
        let mut processors = instantiated.flow.processors;

        let rebound =
            reference_resolver::resolve(controller, &mut processors, available, template_services)
                .await?;
        for processor in processors.iter_mut().filter(|p| !rebound.contains(&p.id)) {
            controller.update_processor(processor).await?;
        }

        info!(
            processors = processors.len(),
            rebound = rebound.len(),
            "Bound instantiated processors to existing controller services"
        );
        Ok(())
    }

    async fn upload_and_instantiate(
        &self,
        group_id: &str,
        template: &Path,
        content: Vec<u8>,
    ) -> Result<FlowEntity> {
        let file_name = template
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DeployError::config_error(format!(
                    "Template path {} has no file name",
                    template.display()
                ))
            })?;

        let uploaded = self.api.upload_template(group_id, &file_name, content).await?;
        info!(group_id = %group_id, template_id = %uploaded.id, file = %file_name, "Template uploaded");

        self.api
            .instantiate_template(group_id, &uploaded.id, Position::new(0.0, 0.0))
            .await
    }

    /// Remove the branch group and the templates uploaded into it
    #[instrument(skip(self, branch), fields(branch = %branch.join(">")))]
    pub async fn undeploy(&self, branch: &[String]) -> Result<()> {
        if branch.len() < 2 {
            return Err(DeployError::config_error(
                "Refusing to undeploy the root process group",
            ));
        }

        let Some(group) = self.sequencer.change_directory(branch).await? else {
            warn!(branch = %branch.join(">"), "Branch not found, nothing to undeploy");
            return Ok(());
        };
        let group_id = group.id().to_string();

        let templates = self.api.list_templates().await?;
        for template in templates.iter().filter(|t| t.belongs_to_group(&group_id)) {
            self.api.remove_template(&template.id).await?;
            info!(group_id = %group_id, template_id = %template.id, "Removed template");
        }

        self.sequencer.stop(&group).await?;

        let current = self.api.get_process_group(&group_id).await?;
        self.api
            .remove_process_group(&group_id, &current.revision)
            .await?;

        log_group_operation("undeploy", &group_id, Some(branch), "removed", None);
        Ok(())
    }

    /// Start an existing branch; a missing branch is a warning
    pub async fn start_branch(&self, branch: &[String]) -> Result<()> {
        match self.sequencer.change_directory(branch).await? {
            Some(group) => self.sequencer.start(&group).await,
            None => {
                warn!(branch = %branch.join(">"), "Branch not found, nothing to start");
                Ok(())
            }
        }
    }

    /// Stop an existing branch; a missing branch is a warning
    pub async fn stop_branch(&self, branch: &[String]) -> Result<()> {
        match self.sequencer.change_directory(branch).await? {
            Some(group) => self.sequencer.stop(&group).await,
            None => {
                warn!(branch = %branch.join(">"), "Branch not found, nothing to stop");
                Ok(())
            }
        }
    }
}
