//! User infrastructure module
//!
//! Store backends for users, the cache-aside decorator and the user service.

mod cached_repository;
mod postgres_repository;
mod repository;
mod service;

pub use cached_repository::CachedUserRepository;
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::UserService;
