//! # Category Repository
//!
//! Database operations for product categories.
//!
//! ## Key Operations
//! - Idempotent-by-name creation (reuse existing row instead of erroring)
//! - CRUD operations
//! - Delete-with-detach: dependent products lose their category reference,
//!   the products themselves survive
//!
//! ## Name Reuse Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              create(CategoryCreate { name: "Electronics" })         │
//! │                                                                     │
//! │  SELECT ... WHERE name = 'Electronics'                              │
//! │       │                                                             │
//! │       ├── row exists → return it (warn), no insert                  │
//! │       │                                                             │
//! │       └── no row → INSERT, return new row with generated id         │
//! │                                                                     │
//! │  The check and the insert share one transaction, but no UNIQUE      │
//! │  constraint backs them: two concurrent creators can still both      │
//! │  insert. Accepted for this single-writer catalog.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::transaction::with_transaction;
use emporium_core::{validation, Category, CategoryCreate};

/// Repository for category database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CategoryRepository::new(pool);
///
/// let cat = repo.create(CategoryCreate { name: "Electronics".into() }).await?;
/// let all = repo.get_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a category, reusing an existing one with the same name.
    ///
    /// ## Returns
    /// * `Ok(Category)` - The new row, or the pre-existing row when the
    ///   name was already taken (idempotent-by-name, not an error)
    pub async fn create(&self, data: CategoryCreate) -> DbResult<Category> {
        validation::validate_name(&data.name)?;

        with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                if let Some(existing) = find_by_name(conn, &data.name).await? {
                    warn!(name = %existing.name, id = existing.id, "Category already exists, reusing");
                    return Ok(existing);
                }

                let result = sqlx::query("INSERT INTO categories (name) VALUES (?1)")
                    .bind(&data.name)
                    .execute(&mut *conn)
                    .await?;

                let category = Category {
                    id: result.last_insert_rowid(),
                    name: data.name,
                };

                info!(id = category.id, name = %category.name, "Category created");
                Ok(category)
            })
        })
        .await
    }

    /// Gets a category by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Category))` - Category found
    /// * `Ok(None)` - Category not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if category.is_none() {
            warn!(id, "Category not found");
        }

        Ok(category)
    }

    /// Lists all categories in storage order.
    pub async fn get_all(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories")
            .fetch_all(&self.pool)
            .await?;

        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    /// Renames a category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - Updated row
    /// * `Err(DbError::NotFound)` - Id doesn't resolve
    pub async fn update(&self, id: i64, new_name: &str) -> DbResult<Category> {
        validation::validate_name(new_name)?;
        let name = new_name.to_string();

        with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let result = sqlx::query("UPDATE categories SET name = ?2 WHERE id = ?1")
                    .bind(id)
                    .bind(&name)
                    .execute(&mut *conn)
                    .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("Category", id));
                }

                info!(id, name = %name, "Category updated");
                Ok(Category { id, name })
            })
        })
        .await
    }

    /// Deletes a category, detaching dependent products.
    ///
    /// Dependent products are kept; their category reference is set to NULL
    /// and the affected count is logged.
    ///
    /// ## Returns
    /// * `Ok(Some(id))` - Deleted
    /// * `Ok(None)` - Id doesn't resolve (sentinel, not an error)
    pub async fn delete(&self, id: i64) -> DbResult<Option<i64>> {
        with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let existing = sqlx::query_as::<_, Category>(
                    "SELECT id, name FROM categories WHERE id = ?1",
                )
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

                let Some(category) = existing else {
                    warn!(id, "Category not found for delete");
                    return Ok(None);
                };

                // Detach before delete so the count is observable, rather
                // than relying on the FK's ON DELETE SET NULL
                let detached =
                    sqlx::query("UPDATE products SET category_id = NULL WHERE category_id = ?1")
                        .bind(id)
                        .execute(&mut *conn)
                        .await?
                        .rows_affected();

                if detached > 0 {
                    warn!(id, detached, "Dependent products detached from category");
                }

                sqlx::query("DELETE FROM categories WHERE id = ?1")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;

                info!(id, name = %category.name, detached, "Category deleted");
                Ok(Some(id))
            })
        })
        .await
    }

    /// Counts categories (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Looks up a category by exact name within the current unit of work.
pub(crate) async fn find_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = ?1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(category)
}

// =============================================================================
// Unit Tests
// =============================================================================
