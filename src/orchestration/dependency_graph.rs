//! # Dependency Graph Layering
//!
//! Partitions the processors and connections of one process group level into ordered
//! layers. Layers grow outward from the sources: a processor only appears once every
//! connection feeding it has appeared in an earlier queue layer.
//!
//! For a diamond `A→B, A→C, B→D, C→D` the result is
//! `{A} [A→B, A→C] {B, C} [B→D, C→D] {D}`.
//!
//! Processors attached to no connection form a leading component layer. Two
//! consecutive rounds that resolve no connection mean the pending connections form a
//! cycle, reported as [`DeployError::DependencyCycle`].

use std::collections::HashSet;
use tracing::debug;

use crate::error::{DeployError, Result};
use crate::models::{ConnectionEntity, ProcessGroupFlowEntity, ProcessorEntity};

/// One homogeneous layer of a process group level
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Components(Vec<ProcessorEntity>),
    Queues(Vec<ConnectionEntity>),
}

impl Layer {
    pub fn len(&self) -> usize {
        match self {
            Layer::Components(processors) => processors.len(),
            Layer::Queues(connections) => connections.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of the members, in layer order
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Layer::Components(processors) => processors.iter().map(|p| p.id.as_str()).collect(),
            Layer::Queues(connections) => connections.iter().map(|c| c.id.as_str()).collect(),
        }
    }
}

/// Layer the direct contents of a fetched process group
pub fn layer_flow(flow: &ProcessGroupFlowEntity) -> Result<Vec<Layer>> {
    let contents = flow.flow();
    layer(flow.id(), &contents.processors, &contents.connections)
}

/// Layer processors and connections; member order within a layer follows input order
pub fn layer(
    group_id: &str,
    processors: &[ProcessorEntity],
    connections: &[ConnectionEntity],
) -> Result<Vec<Layer>> {
    let mut layers = Vec::new();

    let connected: HashSet<&str> = connections
        .iter()
        .flat_map(|c| [c.source_id.as_str(), c.destination_id.as_str()])
        .collect();
    let isolated: Vec<ProcessorEntity> = processors
        .iter()
        .filter(|p| !connected.contains(p.id.as_str()))
        .cloned()
        .collect();
    if !isolated.is_empty() {
        layers.push(Layer::Components(isolated));
    }

    let mut pending: Vec<&ConnectionEntity> = connections.iter().collect();
    let mut frontier: HashSet<&str> = HashSet::new();
    let mut idle_rounds = 0;

    while !pending.is_empty() {
        let (resolved, remaining): (Vec<&ConnectionEntity>, Vec<&ConnectionEntity>) = pending
            .into_iter()
            .partition(|c| frontier.contains(c.source_id.as_str()));

        // A merge point is reached only once no pending connection still feeds it
        let mut candidates: HashSet<&str> =
            resolved.iter().map(|c| c.destination_id.as_str()).collect();
        candidates.extend(remaining.iter().map(|c| c.source_id.as_str()));
        let blocked: HashSet<&str> = remaining.iter().map(|c| c.destination_id.as_str()).collect();

        if resolved.is_empty() {
            idle_rounds += 1;
            if idle_rounds > 1 {
                return Err(DeployError::DependencyCycle {
                    group_id: group_id.to_string(),
                    pending: remaining.iter().map(|c| c.id.clone()).collect(),
                });
            }
        } else {
            idle_rounds = 0;
            layers.push(Layer::Queues(resolved.into_iter().cloned().collect()));
        }

        frontier = candidates.difference(&blocked).copied().collect();
        let reached: Vec<ProcessorEntity> = processors
            .iter()
            .filter(|p| frontier.contains(p.id.as_str()))
            .cloned()
            .collect();
        if !reached.is_empty() {
            layers.push(Layer::Components(reached));
        }

        pending = remaining;
    }

    debug!(
        group_id = %group_id,
        processors = processors.len(),
        connections = connections.len(),
        layers = layers.len(),
        "Computed dependency layers"
    );
    Ok(layers)
}
