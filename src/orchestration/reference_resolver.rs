//! # Reference Resolver
//!
//! Rebinds controller service references of freshly instantiated processors.
//!
//! A template stores service references as the ids the services had where the
//! template was exported. When the target already has services with the same names,
//! those declarations are stripped from the template before upload and each
//! processor property holding an exported id is rewritten to the id of the
//! same-named service in the target.

use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::models::{ControllerServiceEntity, ProcessorEntity};

use super::processor_state::ProcessorStateController;

/// Rewrite every property value that is a cached template service id whose name
/// matches an available service. Returns whether any property matched.
pub fn rewrite_references(
    processor: &mut ProcessorEntity,
    services: &[ControllerServiceEntity],
    template_services: &HashMap<String, String>,
) -> bool {
    let mut matched = false;

    for (property, value) in processor.component.config.properties.iter_mut() {
        let Some(current) = value.as_deref() else {
            continue;
        };
        let Some(name) = template_services.get(current) else {
            continue;
        };
        if let Some(service) = services.iter().find(|s| s.matches_name(name)) {
            debug!(
                processor_id = %processor.id,
                property = %property,
                service_name = %name,
                from = %current,
                to = %service.id,
                "Rebinding controller service reference"
            );
            *value = Some(service.id.clone());
            matched = true;
        }
    }
    matched
}

/// Rewrite and persist each processor whose properties reference a matched service.
///
/// Returns the ids of the persisted processors.
pub async fn resolve(
    controller: &ProcessorStateController,
    processors: &mut [ProcessorEntity],
    services: &[ControllerServiceEntity],
    template_services: &HashMap<String, String>,
) -> Result<Vec<String>> {
    let mut persisted = Vec::new();

    for processor in processors.iter_mut() {
        if rewrite_references(processor, services, template_services) {
            controller.update_processor(processor).await?;
            persisted.push(processor.id.clone());
        }
    }
    Ok(persisted)
}
