//! Inactive user cleanup

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::infrastructure::user::UserService;

/// Outcome of one cleanup sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub found: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Deletes users that have been inactive for longer than a threshold
#[derive(Debug, Clone)]
pub struct UserCleanupJob {
    user_service: Arc<UserService>,
    inactivity_threshold: Duration,
}

impl UserCleanupJob {
    pub fn new(user_service: Arc<UserService>, inactivity_threshold: Duration) -> Self {
        Self {
            user_service,
            inactivity_threshold,
        }
    }

    /// Runs one sweep relative to the current time
    pub async fn execute(&self) -> CleanupReport {
        self.execute_at(Utc::now()).await
    }

    /// Runs one sweep as if the current time were `now`
    ///
    /// Failures are logged and counted; a failed delete does not stop the
    /// sweep.
    pub async fn execute_at(&self, now: DateTime<Utc>) -> CleanupReport {
        let threshold = match chrono::Duration::from_std(self.inactivity_threshold) {
            Ok(threshold) => now - threshold,
            Err(e) => {
                error!(error = %e, "Inactivity threshold out of range, skipping cleanup");
                return CleanupReport::default();
            }
        };

        let users = match self.user_service.find_inactive_users(threshold).await {
            Ok(users) => users,
            Err(e) => {
                error!(error = %e, "Failed to find inactive users");
                return CleanupReport::default();
            }
        };

        let mut report = CleanupReport {
            found: users.len(),
            ..Default::default()
        };

        for user in &users {
            match self.user_service.delete_user(user.id()).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    warn!(user_id = %user.id(), error = %e, "Failed to delete inactive user");
                    report.failed += 1;
                }
            }
        }

        info!(
            threshold = %threshold,
            found = report.found,
            deleted = report.deleted,
            failed = report.failed,
            "Inactive user cleanup finished"
        );

        report
    }
}
