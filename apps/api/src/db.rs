use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// SQLSTATE for `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";
/// SQLSTATE for `undefined_column`.
const UNDEFINED_COLUMN: &str = "42703";
/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Applies the embedded migrations in `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to apply migrations to the database")?;
    info!("Database migrations applied");
    Ok(())
}

/// True when the error means the schema is behind the code: a missing table
/// or column rather than a bad query or an outage.
pub fn is_schema_drift(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            looks_like_schema_drift(db_err.code().as_deref(), db_err.message())
        }
        sqlx::Error::ColumnNotFound(_) => true,
        _ => false,
    }
}

/// True when an INSERT lost a race against a unique constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => is_unique_violation_code(db_err.code().as_deref()),
        _ => false,
    }
}

fn is_unique_violation_code(code: Option<&str>) -> bool {
    code == Some(UNIQUE_VIOLATION)
}

fn looks_like_schema_drift(code: Option<&str>, message: &str) -> bool {
    if matches!(code, Some(UNDEFINED_TABLE) | Some(UNDEFINED_COLUMN)) {
        return true;
    }
    message.contains("does not exist")
        || message.contains("relation")
        || message.contains(UNDEFINED_TABLE)
}
