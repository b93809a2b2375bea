//! Cron command - removes inactive users on a schedule

use tracing::info;

use super::{bootstrap, shutdown_signal, CronArgs};
use crate::infrastructure::jobs::CleanupScheduler;

/// Run the cleanup schedule until a shutdown signal arrives
pub async fn run(args: CronArgs) -> anyhow::Result<()> {
    let mut config = bootstrap(args.env.as_deref());

    if let Some(schedule) = args.schedule {
        config.cleanup.schedule = schedule;
    }

    let user_service = crate::create_user_service(&config).await?;
    let job = crate::create_cleanup_job(&config, user_service);

    let scheduler = CleanupScheduler::start(job, &config.cleanup.schedule).await?;
    info!(
        schedule = %config.cleanup.schedule,
        job_id = %scheduler.job_id(),
        "Cleanup scheduler running"
    );

    shutdown_signal().await;
    scheduler.shutdown().await?;

    info!("Cleanup scheduler shutdown complete");

    Ok(())
}
