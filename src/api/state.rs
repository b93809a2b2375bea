//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::user::UserService;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
}

impl AppState {
    pub fn new(user_service: Arc<UserService>) -> Self {
        Self { user_service }
    }
}
