//! Storage infrastructure - Connection pools and schema migrations

pub mod migrations;
mod postgres;

pub use migrations::{run_user_migrations, Migration, PostgresMigrator};
pub use postgres::{DatabasePools, PostgresConfig};
