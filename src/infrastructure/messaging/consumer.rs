//! Queue consumer loop

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::messaging::{Delivery, MessageHandler, MessageQueue, RequeuePolicy};
use crate::domain::DomainError;

/// Pause before polling again after the queue itself failed
const RECEIVE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Pulls messages from a queue and feeds them to a handler
///
/// One background task per subscription processes messages one at a time in
/// delivery order. A handler success acks the message; a failure is logged
/// and nacked, requeued or dropped according to the [`RequeuePolicy`]. The
/// loop never stops because of a handler error.
#[derive(Debug)]
pub struct QueueConsumer {
    queue: Arc<dyn MessageQueue>,
    policy: RequeuePolicy,
    shutdown: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl QueueConsumer {
    pub fn new(queue: Arc<dyn MessageQueue>) -> Self {
        let (shutdown, _) = watch::channel(false);

        Self {
            queue,
            policy: RequeuePolicy::default(),
            shutdown,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn with_requeue_policy(mut self, policy: RequeuePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Declares `queue_name` and starts consuming it in the background
    ///
    /// Returns once the subscription is running.
    pub async fn start_consuming(
        &self,
        queue_name: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), DomainError> {
        if *self.shutdown.borrow() {
            return Err(DomainError::queue_unavailable("Consumer has been closed"));
        }

        self.queue.declare(queue_name).await?;

        let worker = Worker {
            queue: self.queue.clone(),
            queue_name: queue_name.to_string(),
            handler,
            policy: self.policy,
        };
        let shutdown = self.shutdown.subscribe();

        let task = tokio::spawn(worker.run(shutdown));
        self.tasks.lock().await.push(task);

        info!(queue = %queue_name, policy = ?self.policy, "Started consuming");
        Ok(())
    }

    /// Stops every subscription and releases the queue
    ///
    /// Waits for in-flight messages to finish before closing the connection.
    /// Both steps always run; the first error is returned.
    pub async fn close(&self) -> Result<(), DomainError> {
        self.shutdown.send_replace(true);

        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().await.drain(..).collect();
        let mut drain_result = Ok(());

        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Consumer task ended abnormally");
                if drain_result.is_ok() {
                    drain_result = Err(DomainError::internal(format!(
                        "Consumer task failed: {}",
                        e
                    )));
                }
            }
        }

        let close_result = self.queue.close().await;
        info!("Consumer closed");

        drain_result.and(close_result)
    }
}

struct Worker {
    queue: Arc<dyn MessageQueue>,
    queue_name: String,
    handler: Arc<dyn MessageHandler>,
    policy: RequeuePolicy,
}

impl Worker {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            let received = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                received = self.queue.receive(&self.queue_name) => received,
            };

            match received {
                Ok(Some(delivery)) => self.process(delivery).await,
                Ok(None) => {}
                Err(e) => {
                    error!(queue = %self.queue_name, error = %e, "Failed to receive message");

                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = tokio::time::sleep(RECEIVE_RETRY_DELAY) => {}
                    }
                }
            }
        }

        debug!(queue = %self.queue_name, "Consumer loop stopped");
    }

    async fn process(&self, delivery: Delivery) {
        match self.handler.handle(&delivery.body).await {
            Ok(()) => {
                if let Err(e) = self.queue.ack(&self.queue_name, &delivery).await {
                    warn!(
                        queue = %self.queue_name,
                        tag = %delivery.tag,
                        error = %e,
                        "Failed to ack message"
                    );
                }
            }
            Err(e) => {
                let requeue = self.policy.should_requeue(&e);

                error!(
                    queue = %self.queue_name,
                    tag = %delivery.tag,
                    redelivered = delivery.redelivered,
                    requeue,
                    error = %e,
                    "Failed to process message"
                );

                if let Err(e) = self.queue.nack(&self.queue_name, &delivery, requeue).await {
                    warn!(
                        queue = %self.queue_name,
                        tag = %delivery.tag,
                        error = %e,
                        "Failed to nack message"
                    );
                }
            }
        }
    }
}
