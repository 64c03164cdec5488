//! # Queue Drain
//!
//! Blocks until a connection holds no queued FlowFiles. Used by the stop path so a
//! consumer is only stopped once everything its producer already emitted has been
//! processed.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::client::FlowApi;
use crate::config::LifecycleConfig;
use crate::error::{DeployError, Result};
use crate::models::ConnectionEntity;

pub struct QueueDrainer {
    api: Arc<dyn FlowApi>,
    interval: Duration,
    timeout: Duration,
}

impl QueueDrainer {
    pub fn new(api: Arc<dyn FlowApi>, config: &LifecycleConfig) -> Self {
        Self {
            api,
            interval: config.interval(),
            timeout: config.timeout(),
        }
    }

    /// Poll the connection until its queue is empty or the timeout elapses
    pub async fn wait_empty_queue(&self, connection: &ConnectionEntity) -> Result<()> {
        let started = Instant::now();
        let deadline = started + self.timeout;

        loop {
            let current = self.api.get_connection(&connection.id).await?;
            let queued = current.queued_flow_files();
            if queued == 0 {
                debug!(connection_id = %connection.id, "Queue drained");
                return Ok(());
            }

            if Instant::now() + self.interval > deadline {
                warn!(
                    connection_id = %connection.id,
                    queued = queued,
                    "Queue did not drain before timeout"
                );
                return Err(DeployError::Timeout {
                    operation: format!(
                        "draining connection {} ({queued} FlowFiles still queued)",
                        connection.id
                    ),
                    waited: started.elapsed(),
                });
            }

            debug!(connection_id = %connection.id, queued = queued, "Waiting for queue to drain");
            sleep(self.interval).await;
        }
    }
}
