//! Mock Flow API Implementation for Testing
//!
//! Provides an in-memory implementation of the FlowApi trait for testing the
//! orchestration core without a running NiFi instance. Every call is recorded as a
//! `"operation:arg:arg"` string so tests can assert on call order.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use nifi_deploy::client::FlowApi;
use nifi_deploy::error::{DeployError, Result};
use nifi_deploy::models::{
    ConnectionEntity, ConnectionStatus, ConnectionStatusSnapshot, ControllerServiceDto,
    ControllerServiceEntity, FlowDto, FlowEntity, Position, ProcessGroupDto, ProcessGroupEntity,
    ProcessGroupFlowDto, ProcessGroupFlowEntity, ProcessorConfig, ProcessorDto, ProcessorEntity,
    ProcessorState, Relationship, Revision, ScheduledState, TemplateDto, TemplateEntity,
};

pub const TRANSIENT_BODY: &str =
    "proc cannot be started because it is not stopped. Current state is STOPPING";

/// Mock NiFi state for tracking calls and simulating behavior
#[derive(Debug, Default)]
pub struct MockFlowApiState {
    /// Every call in order
    pub calls: Vec<String>,
    /// Group flows keyed by id; `"root"` is looked up like any other id
    pub flows: HashMap<String, ProcessGroupFlowEntity>,
    /// Processors returned by `get_processor`
    pub processors: HashMap<String, ProcessorEntity>,
    /// Scripted `(status, body)` failures per processor, consumed one per state update
    pub state_failures: HashMap<String, VecDeque<(u16, String)>>,
    /// Scripted queue depths per connection; the last value repeats
    pub queue_depths: HashMap<String, VecDeque<i64>>,
    pub schedule_failure: Option<(u16, String)>,
    pub services: Vec<ControllerServiceEntity>,
    pub templates: Vec<TemplateEntity>,
    /// Content of every uploaded template
    pub uploads: Vec<Vec<u8>>,
    /// Flow returned by `instantiate_template`; its contents are added to the target group
    pub instantiated: FlowEntity,
    /// Every entity sent to `update_processor`
    pub updated_processors: Vec<ProcessorEntity>,
    created_groups: usize,
}

/// Mock FlowApi implementation for testing
#[derive(Clone, Default)]
pub struct MockFlowApi {
    state: Arc<Mutex<MockFlowApiState>>,
}

impl MockFlowApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flow(self, flow: ProcessGroupFlowEntity) -> Self {
        self.insert_flow(flow.id().to_string(), flow);
        self
    }

    /// Register `flow` as the root group, reachable through the `"root"` alias
    pub fn with_root(self, flow: ProcessGroupFlowEntity) -> Self {
        self.insert_flow("root".to_string(), flow);
        self
    }

    pub fn with_processor(self, processor: ProcessorEntity) -> Self {
        self.lock().processors.insert(processor.id.clone(), processor);
        self
    }

    pub fn with_state_failures(self, processor_id: &str, failures: Vec<(u16, &str)>) -> Self {
        self.lock().state_failures.insert(
            processor_id.to_string(),
            failures
                .into_iter()
                .map(|(status, body)| (status, body.to_string()))
                .collect(),
        );
        self
    }

    pub fn with_queue_depths(self, connection_id: &str, depths: Vec<i64>) -> Self {
        self.lock()
            .queue_depths
            .insert(connection_id.to_string(), depths.into());
        self
    }

    pub fn with_schedule_failure(self, status: u16, body: &str) -> Self {
        self.lock().schedule_failure = Some((status, body.to_string()));
        self
    }

    pub fn with_services(self, services: Vec<ControllerServiceEntity>) -> Self {
        self.lock().services = services;
        self
    }

    pub fn with_templates(self, templates: Vec<TemplateEntity>) -> Self {
        self.lock().templates = templates;
        self
    }

    pub fn with_instantiated(self, flow: FlowDto) -> Self {
        self.lock().instantiated = FlowEntity { flow };
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Calls whose operation name is one of `operations`
    pub fn calls_of(&self, operations: &[&str]) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| {
                let operation = call.split(':').next().unwrap_or_default();
                operations.contains(&operation)
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<Vec<u8>> {
        self.lock().uploads.clone()
    }

    pub fn updated_processors(&self) -> Vec<ProcessorEntity> {
        self.lock().updated_processors.clone()
    }

    pub fn flow(&self, id: &str) -> Option<ProcessGroupFlowEntity> {
        self.lock().flows.get(id).cloned()
    }

    fn insert_flow(&self, key: String, flow: ProcessGroupFlowEntity) {
        let mut state = self.lock();
        let id = flow.id().to_string();
        if key != id {
            state.flows.insert(id, flow.clone());
        }
        state.flows.insert(key, flow);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockFlowApiState> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: String) {
        self.lock().calls.push(call);
    }

    /// Apply `change` to every stored copy of the group flow `id`
    fn update_flow<F>(&self, id: &str, change: F)
    where
        F: Fn(&mut ProcessGroupFlowEntity),
    {
        let mut state = self.lock();
        for flow in state.flows.values_mut().filter(|f| f.id() == id) {
            change(flow);
        }
    }
}

fn not_found(kind: &str, id: &str) -> DeployError {
    DeployError::api_error(404, format!("Unable to find {kind} with id '{id}'."))
}

#[async_trait]
impl FlowApi for MockFlowApi {
    async fn get_flow(&self, group_id: &str) -> Result<ProcessGroupFlowEntity> {
        self.record(format!("get_flow:{group_id}"));
        self.lock()
            .flows
            .get(group_id)
            .cloned()
            .ok_or_else(|| not_found("process group", group_id))
    }

    async fn get_process_group(&self, group_id: &str) -> Result<ProcessGroupEntity> {
        self.record(format!("get_process_group:{group_id}"));
        Ok(ProcessGroupEntity {
            id: group_id.to_string(),
            revision: Revision {
                version: 7,
                client_id: None,
            },
            position: None,
            component: ProcessGroupDto::default(),
        })
    }

    async fn create_process_group(
        &self,
        parent_id: &str,
        name: &str,
        position: Position,
    ) -> Result<ProcessGroupEntity> {
        self.record(format!("create_process_group:{parent_id}:{name}"));
        let id = {
            let mut state = self.lock();
            state.created_groups += 1;
            format!("created-{}", state.created_groups)
        };

        let entity = ProcessGroupEntity {
            id: id.clone(),
            revision: Revision::default(),
            position: Some(position),
            component: ProcessGroupDto {
                id: Some(id.clone()),
                name: name.to_string(),
                position: Some(position),
            },
        };
        self.update_flow(parent_id, |flow| {
            flow.process_group_flow.flow.process_groups.push(entity.clone());
        });
        self.insert_flow(id.clone(), group_flow(&id, vec![], vec![]));
        Ok(entity)
    }

    async fn remove_process_group(&self, group_id: &str, revision: &Revision) -> Result<()> {
        self.record(format!("remove_process_group:{group_id}:{}", revision.version));
        Ok(())
    }

    async fn schedule_components(&self, group_id: &str, state: ScheduledState) -> Result<()> {
        self.record(format!("schedule_components:{group_id}:{state}"));
        match self.lock().schedule_failure.clone() {
            Some((status, body)) => Err(DeployError::api_error(status, body)),
            None => Ok(()),
        }
    }

    async fn get_processor(&self, processor_id: &str) -> Result<ProcessorEntity> {
        self.record(format!("get_processor:{processor_id}"));
        self.lock()
            .processors
            .get(processor_id)
            .cloned()
            .ok_or_else(|| not_found("processor", processor_id))
    }

    async fn update_processor_state(
        &self,
        processor_id: &str,
        revision: &Revision,
        state: ProcessorState,
    ) -> Result<ProcessorEntity> {
        self.record(format!("update_processor_state:{processor_id}:{state}"));
        let failure = self
            .lock()
            .state_failures
            .get_mut(processor_id)
            .and_then(VecDeque::pop_front);
        if let Some((status, body)) = failure {
            return Err(DeployError::api_error(status, body));
        }

        let mut updated = processor(processor_id, state);
        updated.revision = Revision {
            version: revision.version + 1,
            client_id: revision.client_id.clone(),
        };
        Ok(updated)
    }

    async fn update_processor(&self, processor: &ProcessorEntity) -> Result<ProcessorEntity> {
        self.record(format!("update_processor:{}", processor.id));
        self.lock().updated_processors.push(processor.clone());

        let mut updated = processor.clone();
        updated.revision.version += 1;
        Ok(updated)
    }

    async fn get_controller_services(&self, group_id: &str) -> Result<Vec<ControllerServiceEntity>> {
        self.record(format!("get_controller_services:{group_id}"));
        Ok(self.lock().services.clone())
    }

    async fn upload_template(
        &self,
        group_id: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<TemplateEntity> {
        self.record(format!("upload_template:{group_id}:{file_name}"));
        self.lock().uploads.push(content);
        Ok(TemplateEntity {
            id: "uploaded-template".to_string(),
            template: TemplateDto {
                id: "uploaded-template".to_string(),
                group_id: group_id.to_string(),
                name: file_name.to_string(),
            },
        })
    }

    async fn instantiate_template(
        &self,
        group_id: &str,
        template_id: &str,
        origin: Position,
    ) -> Result<FlowEntity> {
        self.record(format!(
            "instantiate_template:{group_id}:{template_id}:{}:{}",
            origin.x, origin.y
        ));
        let instantiated = self.lock().instantiated.clone();
        self.update_flow(group_id, |flow| {
            let contents = &mut flow.process_group_flow.flow;
            contents.processors.extend(instantiated.flow.processors.clone());
            contents.connections.extend(instantiated.flow.connections.clone());
        });
        Ok(instantiated)
    }

    async fn list_templates(&self) -> Result<Vec<TemplateEntity>> {
        self.record("list_templates".to_string());
        Ok(self.lock().templates.clone())
    }

    async fn remove_template(&self, template_id: &str) -> Result<()> {
        self.record(format!("remove_template:{template_id}"));
        Ok(())
    }

    async fn get_connection(&self, connection_id: &str) -> Result<ConnectionEntity> {
        self.record(format!("get_connection:{connection_id}"));
        let depth = {
            let mut state = self.lock();
            match state.queue_depths.get_mut(connection_id) {
                Some(depths) if depths.len() > 1 => depths.pop_front().unwrap_or_default(),
                Some(depths) => depths.front().copied().unwrap_or_default(),
                None => 0,
            }
        };

        Ok(ConnectionEntity {
            id: connection_id.to_string(),
            status: Some(ConnectionStatus {
                aggregate_snapshot: Some(ConnectionStatusSnapshot {
                    flow_files_queued: depth,
                    bytes_queued: depth * 1024,
                }),
            }),
            ..ConnectionEntity::default()
        })
    }
}

// Fixture builders

pub fn processor(id: &str, state: ProcessorState) -> ProcessorEntity {
    ProcessorEntity {
        id: id.to_string(),
        revision: Revision::default(),
        position: None,
        component: ProcessorDto {
            id: id.to_string(),
            name: format!("processor-{id}"),
            state,
            config: ProcessorConfig::default(),
            relationships: Vec::new(),
            validation_errors: None,
        },
    }
}

pub fn processor_with_property(id: &str, property: &str, value: &str) -> ProcessorEntity {
    let mut entity = processor(id, ProcessorState::Stopped);
    entity
        .component
        .config
        .properties
        .insert(property.to_string(), Some(value.to_string()));
    entity.component.relationships = vec![Relationship {
        name: "success".to_string(),
        auto_terminate: true,
    }];
    entity
}

pub fn connection(source: &str, destination: &str) -> ConnectionEntity {
    ConnectionEntity {
        id: format!("{source}->{destination}"),
        source_id: source.to_string(),
        destination_id: destination.to_string(),
        ..ConnectionEntity::default()
    }
}

pub fn child_group(id: &str, name: &str) -> ProcessGroupEntity {
    ProcessGroupEntity {
        id: id.to_string(),
        revision: Revision::default(),
        position: Some(Position::new(0.0, 0.0)),
        component: ProcessGroupDto {
            id: Some(id.to_string()),
            name: name.to_string(),
            position: Some(Position::new(0.0, 0.0)),
        },
    }
}

pub fn group_flow(
    id: &str,
    processors: Vec<ProcessorEntity>,
    connections: Vec<ConnectionEntity>,
) -> ProcessGroupFlowEntity {
    ProcessGroupFlowEntity {
        process_group_flow: ProcessGroupFlowDto {
            id: id.to_string(),
            parent_group_id: None,
            flow: FlowDto {
                processors,
                connections,
                ..FlowDto::default()
            },
        },
    }
}

pub fn with_children(
    mut flow: ProcessGroupFlowEntity,
    children: Vec<ProcessGroupEntity>,
) -> ProcessGroupFlowEntity {
    flow.process_group_flow.flow.process_groups = children;
    flow
}

pub fn service(id: &str, name: &str) -> ControllerServiceEntity {
    ControllerServiceEntity {
        id: id.to_string(),
        component: ControllerServiceDto {
            id: id.to_string(),
            name: name.to_string(),
        },
    }
}
