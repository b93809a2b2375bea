//! Infrastructure layer - External service implementations

pub mod cache;
pub mod jobs;
pub mod logging;
pub mod messaging;
pub mod storage;
pub mod user;
