//! # Transactional Wrapper
//!
//! Commit-on-success / rollback-on-failure execution of write operations.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    with_transaction(pool, op)                       │
//! │                                                                     │
//! │  1. BEGIN one transaction (the unit of work)                        │
//! │  2. Invoke op with the transaction's connection                     │
//! │  3. op returns Ok(value)  → COMMIT, return Ok(value)                │
//! │     op returns Err(e)     → ROLLBACK, log with context,             │
//! │                             re-raise e unchanged                    │
//! │                                                                     │
//! │  Exactly one COMMIT or one ROLLBACK per invocation.                 │
//! │  Never both. Never neither. No partial commits.                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let category = with_transaction(&pool, move |conn| {
//!     Box::pin(async move {
//!         // All queries here share one transaction
//!         insert_category(conn, &data).await
//!     })
//! })
//! .await?;
//! ```

use std::future::Future;
use std::pin::Pin;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, error};

use crate::error::DbResult;

/// Boxed future with a borrow on the transaction connection.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs `op` inside a single transaction.
///
/// The operation receives the transaction's connection; every query it
/// issues through that connection is part of the same unit of work. On
/// `Ok` the transaction is committed and the value returned; on `Err` it
/// is rolled back, the failure is logged with full context, and the error
/// is re-raised unchanged. No retry happens here.
pub async fn with_transaction<T, F>(pool: &SqlitePool, op: F) -> DbResult<T>
where
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, DbResult<T>>,
{
    let mut tx = pool.begin().await?;

    match op(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            error!(error = %err, "Operation failed, rolling back transaction");
            // The original failure is what the caller must see; a broken
            // rollback is only logged.
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
