//! User domain
//!
//! Domain types and the store contract for users.

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId};
pub use repository::UserRepository;
pub use validation::{validate_user_id, UserValidationError};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
