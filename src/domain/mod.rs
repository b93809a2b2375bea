//! Domain layer - Core entities, contracts and errors

pub mod cache;
pub mod error;
pub mod event;
pub mod messaging;
pub mod user;

pub use cache::{Cache, CacheExt};
pub use error::DomainError;
pub use event::{UserEvent, UserEventKind};
pub use messaging::{Delivery, MessageHandler, MessageQueue, RequeuePolicy};
pub use user::{User, UserId, UserRepository};
