//! Scheduled jobs

mod cleanup;
mod scheduler;

pub use cleanup::{CleanupReport, UserCleanupJob};
pub use scheduler::CleanupScheduler;
