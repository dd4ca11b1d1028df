use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use sea_orm_migration::MigratorTrait;
use std::{future::Future, time::Duration};

use crate::{
    config::{AppConfig, CoreSettings},
    error::{AppError, AppResult},
    migration::Migrator,
};

pub type OrmConn = DatabaseConnection;

/// Create a SeaORM connection pool sized from the app config.
pub async fn create_orm_conn(config: &AppConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Open a private in-memory SQLite database. A single pooled connection keeps
/// every caller on the same memory database.
pub async fn create_memory_conn() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Apply every pending schema migration.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}

/// Close a unit of work: commit on success, roll back on any error.
///
/// A failed rollback is logged; the error that aborted the work is the one
/// returned to the caller.
pub async fn finish<T>(txn: DatabaseTransaction, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

/// Begin a transaction on `conn`, hand it to `work`, then [`finish`] it.
pub async fn unit_of_work<T, F, Fut>(conn: &DatabaseConnection, work: F) -> AppResult<T>
where
    F: FnOnce(DatabaseTransaction) -> Fut,
    Fut: Future<Output = (DatabaseTransaction, AppResult<T>)>,
{
    let txn = conn.begin().await?;
    let (txn, result) = work(txn).await;
    finish(txn, result).await
}

/// [`unit_of_work`] bounded by `budget`. A unit cut off by the timeout is
/// dropped before commit and its transaction rolled back.
pub async fn in_transaction<T, F, Fut>(
    conn: &DatabaseConnection,
    budget: Duration,
    work: F,
) -> AppResult<T>
where
    F: FnOnce(DatabaseTransaction) -> Fut,
    Fut: Future<Output = (DatabaseTransaction, AppResult<T>)>,
{
    tokio::time::timeout(budget, unit_of_work(conn, work))
        .await
        .map_err(|_| AppError::Timeout)?
}

/// Run `work` as a unit of work, re-running it from scratch on transient
/// store conflicts. After `max_retries` attempts the conflict surfaces as
/// [`AppError::Conflict`]; the timeout covers all attempts together.
pub async fn with_retries<T, F, Fut>(
    conn: &DatabaseConnection,
    settings: CoreSettings,
    operation: &'static str,
    mut work: F,
) -> AppResult<T>
where
    F: FnMut(DatabaseTransaction) -> Fut,
    Fut: Future<Output = (DatabaseTransaction, AppResult<T>)>,
{
    let attempts = async {
        let mut attempt = 1;
        loop {
            match unit_of_work(conn, &mut work).await {
                Err(err) if err.is_transient() && attempt < settings.max_retries => {
                    tracing::warn!(operation, attempt, error = %err, "conflict, retrying");
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    tracing::warn!(operation, attempt, error = %err, "retries exhausted");
                    return Err(AppError::Conflict);
                }
                other => return other,
            }
        }
    };
    tokio::time::timeout(settings.operation_timeout, attempts)
        .await
        .map_err(|_| AppError::Timeout)?
}
