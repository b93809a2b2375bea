//! Consumer command - applies user events from the queue to the store

use std::sync::Arc;

use tracing::info;

use super::{bootstrap, shutdown_signal, ConsumerArgs};

/// Consume until a shutdown signal arrives, then drain and close
pub async fn run(args: ConsumerArgs) -> anyhow::Result<()> {
    let mut config = bootstrap(args.env.as_deref());

    if let Some(queue) = args.queue {
        config.queue.queue_name = queue;
    }

    let user_service = crate::create_user_service(&config).await?;
    let dispatcher = crate::create_event_dispatcher(user_service);
    let consumer = crate::create_queue_consumer(&config).await?;

    consumer
        .start_consuming(&config.queue.queue_name, Arc::new(dispatcher))
        .await?;

    info!(queue = %config.queue.queue_name, "Consumer running");

    shutdown_signal().await;
    consumer.close().await?;

    info!("Consumer shutdown complete");

    Ok(())
}
