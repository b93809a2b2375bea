//! Routes user events to the user service

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::event::UserEvent;
use crate::domain::messaging::MessageHandler;
use crate::domain::DomainError;
use crate::infrastructure::user::UserService;

/// Applies queued user events
///
/// Each recognized event results in exactly one service call whose outcome
/// is returned as is. There is no deduplication: a redelivered
/// `user_created` fails with the store's `Conflict`.
#[derive(Debug, Clone)]
pub struct UserEventDispatcher {
    user_service: Arc<UserService>,
}

impl UserEventDispatcher {
    pub fn new(user_service: Arc<UserService>) -> Self {
        Self { user_service }
    }

    pub async fn dispatch(&self, body: &[u8]) -> Result<(), DomainError> {
        let event = UserEvent::parse(body)?;

        debug!(kind = %event.kind(), user_id = %event.user_id(), "Dispatching user event");

        match event {
            UserEvent::Created(user) => self.user_service.create_user(&user).await,
            UserEvent::Updated(user) => self.user_service.update_user(&user).await,
            UserEvent::Deleted(id) => self.user_service.delete_user(&id).await,
        }
    }
}

#[async_trait]
impl MessageHandler for UserEventDispatcher {
    async fn handle(&self, body: &[u8]) -> Result<(), DomainError> {
        self.dispatch(body).await
    }
}
