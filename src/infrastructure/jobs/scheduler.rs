//! Cron scheduling of the cleanup job

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;
use uuid::Uuid;

use crate::domain::DomainError;

use super::cleanup::UserCleanupJob;

/// Running scheduler with the cleanup job registered
pub struct CleanupScheduler {
    scheduler: JobScheduler,
    job_id: Uuid,
}

impl std::fmt::Debug for CleanupScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupScheduler")
            .field("job_id", &self.job_id)
            .finish_non_exhaustive()
    }
}

impl CleanupScheduler {
    /// Registers `job` on the six-field cron `schedule` and starts ticking
    pub async fn start(job: Arc<UserCleanupJob>, schedule: &str) -> Result<Self, DomainError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to create scheduler: {}", e)))?;

        let cron_job = Job::new_async(schedule, move |_uuid, _lock| {
            let job = job.clone();

            Box::pin(async move {
                info!("Running inactive user cleanup");
                job.execute().await;
            })
        })
        .map_err(|e| {
            DomainError::configuration(format!("Invalid cron schedule '{}': {}", schedule, e))
        })?;

        let job_id = scheduler
            .add(cron_job)
            .await
            .map_err(|e| DomainError::internal(format!("Failed to add cleanup job: {}", e)))?;

        scheduler
            .start()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to start scheduler: {}", e)))?;

        info!(schedule = %schedule, "Cleanup scheduler started");
        Ok(Self { scheduler, job_id })
    }

    /// Identifier the scheduler assigned to the cleanup job
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub async fn shutdown(mut self) -> Result<(), DomainError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to stop scheduler: {}", e)))?;

        info!("Cleanup scheduler stopped");
        Ok(())
    }
}
