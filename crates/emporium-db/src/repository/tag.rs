//! # Tag Repository
//!
//! Database operations for product tags.
//!
//! ## Key Operations
//! - Idempotent-by-name creation (same policy as categories)
//! - CRUD operations
//! - Delete removes only association rows; the tagged products survive
//!   untouched

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::transaction::with_transaction;
use emporium_core::{validation, Tag, TagCreate};

/// Repository for tag database operations.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    /// Creates a new TagRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TagRepository { pool }
    }

    /// Creates a tag, reusing an existing one with the same name.
    ///
    /// Same check-then-insert policy as categories: the existence check and
    /// the insert share one transaction, with no UNIQUE constraint behind
    /// them.
    pub async fn create(&self, data: TagCreate) -> DbResult<Tag> {
        validation::validate_name(&data.name)?;

        with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                if let Some(existing) = find_by_name(conn, &data.name).await? {
                    warn!(name = %existing.name, id = existing.id, "Tag already exists, reusing");
                    return Ok(existing);
                }

                let result = sqlx::query("INSERT INTO tags (name) VALUES (?1)")
                    .bind(&data.name)
                    .execute(&mut *conn)
                    .await?;

                let tag = Tag {
                    id: result.last_insert_rowid(),
                    name: data.name,
                };

                info!(id = tag.id, name = %tag.name, "Tag created");
                Ok(tag)
            })
        })
        .await
    }

    /// Gets a tag by its id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        if tag.is_none() {
            warn!(id, "Tag not found");
        }

        Ok(tag)
    }

    /// Lists all tags in storage order.
    pub async fn get_all(&self) -> DbResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags")
            .fetch_all(&self.pool)
            .await?;

        debug!(count = tags.len(), "Fetched tags");
        Ok(tags)
    }

    /// Renames a tag.
    ///
    /// ## Returns
    /// * `Ok(Tag)` - Updated row
    /// * `Err(DbError::NotFound)` - Id doesn't resolve
    pub async fn update(&self, id: i64, new_name: &str) -> DbResult<Tag> {
        validation::validate_name(new_name)?;
        let name = new_name.to_string();

        with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let result = sqlx::query("UPDATE tags SET name = ?2 WHERE id = ?1")
                    .bind(id)
                    .bind(&name)
                    .execute(&mut *conn)
                    .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("Tag", id));
                }

                info!(id, name = %name, "Tag updated");
                Ok(Tag { id, name })
            })
        })
        .await
    }

    /// Deletes a tag, removing only its association rows.
    ///
    /// Tagged products are otherwise unaffected; the number of removed
    /// associations is logged.
    ///
    /// ## Returns
    /// * `Ok(Some(id))` - Deleted
    /// * `Ok(None)` - Id doesn't resolve (sentinel, not an error)
    pub async fn delete(&self, id: i64) -> DbResult<Option<i64>> {
        with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let existing = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&mut *conn)
                    .await?;

                let Some(tag) = existing else {
                    warn!(id, "Tag not found for delete");
                    return Ok(None);
                };

                // Drop association rows before the tag itself so the count
                // is observable, rather than relying on ON DELETE CASCADE
                let associations = sqlx::query("DELETE FROM product_tags WHERE tag_id = ?1")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected();

                sqlx::query("DELETE FROM tags WHERE id = ?1")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;

                info!(id, name = %tag.name, associations, "Tag deleted");
                Ok(Some(id))
            })
        })
        .await
    }

    /// Counts tags (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Looks up a tag by exact name within the current unit of work.
pub(crate) async fn find_by_name(conn: &mut SqliteConnection, name: &str) -> DbResult<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = ?1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(tag)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;

    #[tokio::test]
    async fn test_create_is_idempotent_by_name() {
        let db = test_db().await;
        let repo = db.tags();

        let first = repo
            .create(TagCreate {
                name: "sale".to_string(),
            })
            .await
            .unwrap();
        let second = repo
            .create(TagCreate {
                name: "sale".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_and_get_all() {
        let db = test_db().await;
        let repo = db.tags();

        let tag = repo
            .create(TagCreate {
                name: "new".to_string(),
            })
            .await
            .unwrap();

        repo.update(tag.id, "featured").await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "featured");
    }

    #[tokio::test]
    async fn test_update_missing_fails() {
        let db = test_db().await;

        let result = db.tags().update(404, "nope").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_returns_sentinel() {
        let db = test_db().await;
        assert_eq!(db.tags().delete(404).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_removes_associations_only() {
        use emporium_core::{ProductCreate, ValidationMode};

        let db = test_db().await;
        let tags = db.tags();
        let products = db.products();

        let keep = tags
            .create(TagCreate {
                name: "keep".to_string(),
            })
            .await
            .unwrap();
        let doomed = tags
            .create(TagCreate {
                name: "doomed".to_string(),
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for name in ["Plumbus", "Fleeb", "Gromflomite Trap"] {
            let product = products
                .create(
                    ProductCreate {
                        name: name.to_string(),
                        description: None,
                        image_url: None,
                        price_shmeckles: 1.0,
                        price_flurbos: 2.0,
                        category_id: None,
                        tag_ids: vec![keep.id, doomed.id],
                    },
                    ValidationMode::Strict,
                )
                .await
                .unwrap();
            ids.push(product.id);
        }

        assert_eq!(tags.delete(doomed.id).await.unwrap(), Some(doomed.id));

        // Products survive with only the remaining tag
        for id in ids {
            let product = products.get_by_id(id).await.unwrap().unwrap();
            assert!(product.has_tag(keep.id));
            assert!(!product.has_tag(doomed.id));
        }
    }
}
