//! Database migrations

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Applies versioned migrations, recording them in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| migration_error("create migrations table", e))?;

        Ok(())
    }

    /// Runs a single migration unless it has already been applied
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
                .bind(migration.version)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| migration_error("check migration status", e))?;

        if applied {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| migration_error("begin migration", e))?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|e| migration_error(&format!("run migration {}", migration.version), e))?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| migration_error(&format!("record migration {}", migration.version), e))?;

        tx.commit()
            .await
            .map_err(|e| migration_error("commit migration", e))?;

        Ok(true)
    }

    /// Latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| migration_error("get migration version", e))
    }
}

fn migration_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::store_unavailable(format!("Failed to {}: {}", action, err))
}

/// A forward-only schema migration
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
}

/// Schema of the user store
pub fn user_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Create users table",
            up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(255) PRIMARY KEY,
                name TEXT NOT NULL,
                email VARCHAR(255) NOT NULL,
                password TEXT NOT NULL,
                last_active_at TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                CONSTRAINT users_email_key UNIQUE (email)
            );
            "#,
        },
        Migration {
            version: 2,
            description: "Index users by last activity",
            up: r#"
            CREATE INDEX IF NOT EXISTS idx_users_last_active_at ON users(last_active_at);
            "#,
        },
    ]
}

/// Runs all pending user store migrations against the primary
pub async fn run_user_migrations(pool: &PgPool) -> Result<(), DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());

    for migration in user_migrations() {
        if migrator.run_migration(&migration).await? {
            info!(
                version = migration.version,
                description = migration.description,
                "Applied migration"
            );
        }
    }

    Ok(())
}
