//! # Product Repository
//!
//! Relation-aware database operations for products.
//!
//! ## Key Operations
//! - Create/update with category and tag resolution (strict or lenient)
//! - Eagerly loaded reads (category + tags always populated)
//! - Substring search and advanced search across name, category and tags
//!
//! ## Eager Loading
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                How a page of products is loaded                     │
//! │                                                                     │
//! │  1. SELECT ... FROM products WHERE id IN (page ids)                 │
//! │  2. SELECT ... FROM categories WHERE id IN (their category ids)     │
//! │  3. SELECT ... FROM product_tags JOIN tags WHERE product_id IN (…)  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Assemble: Product { category: Option<Category>, tags: Vec<Tag> }   │
//! │                                                                     │
//! │  Three batched queries per page, never one query per row, and       │
//! │  never a lazy "fetch on first access" relation: a returned          │
//! │  Product is self-contained beyond its unit of work.                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeSet, HashMap};

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::transaction::with_transaction;
use emporium_core::{
    validation, Category, Product, ProductCreate, ProductUpdate, Tag, ValidationMode,
};

/// Scalar columns of the products table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
    price_shmeckles: f64,
    price_flurbos: f64,
    category_id: Option<i64>,
}

/// One tag attached to one product, from the association join.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductTagRow {
    product_id: i64,
    id: i64,
    name: String,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Strict create: unresolved category/tag ids abort the whole write
/// let product = repo.create(data, ValidationMode::Strict).await?;
///
/// // Search across name, category name and tag names
/// let results = repo.search_advanced("portal", 0, 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product with its relations resolved at write time.
    ///
    /// ## Relation Resolution
    /// - `category_id`: resolved against the categories table. Strict mode
    ///   fails the whole write with [`DbError::CategoryNotFound`]; lenient
    ///   mode persists the product without a category and logs a warning.
    /// - `tag_ids`: batch-resolved in one query. Strict mode fails with
    ///   [`DbError::TagsNotFound`] listing every unresolved id; lenient mode
    ///   attaches the resolved subset and logs the dropped ids.
    ///
    /// One mode governs the whole call; the policies are never mixed.
    /// Nothing is persisted on failure (transaction atomicity).
    ///
    /// The result is reloaded with category and tags eagerly populated.
    pub async fn create(&self, data: ProductCreate, mode: ValidationMode) -> DbResult<Product> {
        validation::validate_product_create(&data)?;

        with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let category_id =
                    resolve_category_id(conn, data.category_id, mode).await?;
                let tag_ids = resolve_tag_ids(conn, &data.tag_ids, mode).await?;

                let result = sqlx::query(
                    "INSERT INTO products \
                     (name, description, image_url, price_shmeckles, price_flurbos, category_id) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .bind(&data.name)
                .bind(&data.description)
                .bind(&data.image_url)
                .bind(data.price_shmeckles)
                .bind(data.price_flurbos)
                .bind(category_id)
                .execute(&mut *conn)
                .await?;

                let id = result.last_insert_rowid();
                attach_tags(conn, id, &tag_ids).await?;

                // Reload with relations eagerly populated
                let product = load_one(conn, id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Product", id))?;

                info!(
                    id,
                    name = %product.name,
                    category = product.category.as_ref().map(|c| c.name.as_str()),
                    tags = product.tags.len(),
                    "Product created"
                );
                Ok(product)
            })
        })
        .await
    }

    /// Gets a product by its id, with category and tags populated.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;

        let product = load_one(&mut conn, id).await?;
        if product.is_none() {
            warn!(id, "Product not found");
        }

        Ok(product)
    }

    /// Lists products with pagination, relations populated.
    ///
    /// ## Arguments
    /// * `skip` - Number of rows to skip (offset)
    /// * `limit` - Maximum number of rows to return
    pub async fn get_all(&self, skip: i64, limit: i64) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;

        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM products ORDER BY id LIMIT ?1 OFFSET ?2")
                .bind(limit)
                .bind(skip)
                .fetch_all(&mut *conn)
                .await?;

        let products = load_products(&mut conn, &ids).await?;
        debug!(count = products.len(), skip, limit, "Fetched products");
        Ok(products)
    }

    /// Overwrites a product and its relations.
    ///
    /// ## Semantics
    /// - Every scalar field replaces the stored value unconditionally
    ///   (full overwrite, not a sparse patch).
    /// - `category_id: Some` is re-resolved strictly and replaces the
    ///   current reference; `None` clears it.
    /// - `tag_ids: Some(list)` fully replaces the tag set after strict
    ///   batch resolution (even an empty list); `None` clears the set.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product id doesn't resolve
    /// * `Err(DbError::CategoryNotFound | TagsNotFound)` - An unresolved
    ///   reference; the product is left completely unchanged
    pub async fn update(&self, data: ProductUpdate) -> DbResult<Product> {
        validation::validate_product_update(&data)?;

        with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let exists: Option<i64> =
                    sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
                        .bind(data.id)
                        .fetch_optional(&mut *conn)
                        .await?;
                if exists.is_none() {
                    return Err(DbError::not_found("Product", data.id));
                }

                // Updates are always strict; the lenient policy exists for
                // creation only
                let category_id =
                    resolve_category_id(conn, data.category_id, ValidationMode::Strict).await?;
                let tag_ids = match &data.tag_ids {
                    Some(ids) => resolve_tag_ids(conn, ids, ValidationMode::Strict).await?,
                    // Omitted list clears the tag set
                    None => Vec::new(),
                };

                sqlx::query(
                    "UPDATE products SET \
                     name = ?2, description = ?3, image_url = ?4, \
                     price_shmeckles = ?5, price_flurbos = ?6, category_id = ?7 \
                     WHERE id = ?1",
                )
                .bind(data.id)
                .bind(&data.name)
                .bind(&data.description)
                .bind(&data.image_url)
                .bind(data.price_shmeckles)
                .bind(data.price_flurbos)
                .bind(category_id)
                .execute(&mut *conn)
                .await?;

                // Full replacement of the tag set
                sqlx::query("DELETE FROM product_tags WHERE product_id = ?1")
                    .bind(data.id)
                    .execute(&mut *conn)
                    .await?;
                attach_tags(conn, data.id, &tag_ids).await?;

                let product = load_one(conn, data.id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Product", data.id))?;

                info!(
                    id = product.id,
                    name = %product.name,
                    category = product.category.as_ref().map(|c| c.name.as_str()),
                    tags = product.tags.len(),
                    "Product updated"
                );
                Ok(product)
            })
        })
        .await
    }

    /// Deletes a product, clearing its tag associations first.
    ///
    /// The category row (if any) is left untouched.
    ///
    /// ## Returns
    /// * `Ok(Some(id))` - Deleted
    /// * `Ok(None)` - Id doesn't resolve (sentinel, not an error)
    pub async fn delete(&self, id: i64) -> DbResult<Option<i64>> {
        with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let existing: Option<String> =
                    sqlx::query_scalar("SELECT name FROM products WHERE id = ?1")
                        .bind(id)
                        .fetch_optional(&mut *conn)
                        .await?;

                let Some(name) = existing else {
                    warn!(id, "Product not found for delete");
                    return Ok(None);
                };

                let associations = sqlx::query("DELETE FROM product_tags WHERE product_id = ?1")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected();

                sqlx::query("DELETE FROM products WHERE id = ?1")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;

                info!(id, name = %name, associations, "Product deleted");
                Ok(Some(id))
            })
        })
        .await
    }

    /// Searches products by case-insensitive substring of the name only.
    pub async fn search_by_name(&self, text: &str) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        let pattern = like_pattern(text);

        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT id FROM products WHERE lower(name) LIKE lower(?1) ORDER BY id",
        )
        .bind(&pattern)
        .fetch_all(&mut *conn)
        .await?;

        let products = load_products(&mut conn, &ids).await?;
        debug!(text, count = products.len(), "Name search");
        Ok(products)
    }

    /// Searches products by name, category name OR any tag name.
    ///
    /// ## How It Works
    /// Outer joins keep categoryless/tagless products matchable on their
    /// own name; `DISTINCT` de-duplicates the rows multiplied by the tag
    /// join by product id *before* pagination is applied.
    pub async fn search_advanced(
        &self,
        text: &str,
        skip: i64,
        limit: i64,
    ) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        let pattern = like_pattern(text);

        debug!(text, skip, limit, "Advanced search");

        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT DISTINCT p.id \
             FROM products p \
             LEFT JOIN categories c ON c.id = p.category_id \
             LEFT JOIN product_tags pt ON pt.product_id = p.id \
             LEFT JOIN tags t ON t.id = pt.tag_id \
             WHERE lower(p.name) LIKE lower(?1) \
                OR lower(c.name) LIKE lower(?1) \
                OR lower(t.name) LIKE lower(?1) \
             ORDER BY p.id \
             LIMIT ?2 OFFSET ?3",
        )
        .bind(&pattern)
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut *conn)
        .await?;

        let products = load_products(&mut conn, &ids).await?;
        debug!(text, count = products.len(), "Advanced search returned products");
        Ok(products)
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Relation Resolution
// =============================================================================

/// Resolves an optional category reference according to the mode.
async fn resolve_category_id(
    conn: &mut SqliteConnection,
    category_id: Option<i64>,
    mode: ValidationMode,
) -> DbResult<Option<i64>> {
    let Some(id) = category_id else {
        return Ok(None);
    };

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    if exists.is_some() {
        return Ok(Some(id));
    }

    match mode {
        ValidationMode::Strict => Err(DbError::CategoryNotFound { id }),
        ValidationMode::Lenient => {
            warn!(category_id = id, "Unknown category id dropped from product write");
            Ok(None)
        }
    }
}

/// Batch-resolves tag references according to the mode.
///
/// Returns the resolved ids (deduplicated, ascending). Strict mode fails
/// with every unresolved id listed; lenient mode drops them with a warning.
async fn resolve_tag_ids(
    conn: &mut SqliteConnection,
    requested: &[i64],
    mode: ValidationMode,
) -> DbResult<Vec<i64>> {
    if requested.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT id FROM tags WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in requested {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let found: Vec<i64> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    let found: BTreeSet<i64> = found.into_iter().collect();

    let missing: Vec<i64> = requested
        .iter()
        .copied()
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .filter(|id| !found.contains(id))
        .collect();

    if missing.is_empty() {
        return Ok(found.into_iter().collect());
    }

    match mode {
        ValidationMode::Strict => Err(DbError::TagsNotFound { ids: missing }),
        ValidationMode::Lenient => {
            warn!(?missing, "Unknown tag ids dropped from product write");
            Ok(found.into_iter().collect())
        }
    }
}

/// Inserts association rows for the given (already resolved) tag ids.
async fn attach_tags(conn: &mut SqliteConnection, product_id: i64, tag_ids: &[i64]) -> DbResult<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO product_tags (product_id, tag_id) ");
    qb.push_values(tag_ids, |mut row, tag_id| {
        row.push_bind(product_id).push_bind(*tag_id);
    });
    qb.build().execute(&mut *conn).await?;

    Ok(())
}

// =============================================================================
// Eager Loading
// =============================================================================

/// Loads one product with relations populated.
async fn load_one(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
    let mut products = load_products(conn, &[id]).await?;
    Ok(products.pop())
}

/// Loads the given products (in the given id order) with category and tags
/// populated via batched secondary queries.
async fn load_products(conn: &mut SqliteConnection, ids: &[i64]) -> DbResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    // 1. Scalar rows
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, name, description, image_url, price_shmeckles, price_flurbos, category_id \
         FROM products WHERE id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(&mut *conn).await?;

    // 2. Their categories, one batched query
    let category_ids: BTreeSet<i64> = rows.iter().filter_map(|row| row.category_id).collect();
    let mut categories: HashMap<i64, Category> = HashMap::new();
    if !category_ids.is_empty() {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, name FROM categories WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in &category_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let found: Vec<Category> = qb.build_query_as().fetch_all(&mut *conn).await?;
        categories = found.into_iter().map(|c| (c.id, c)).collect();
    }

    // 3. Their tags, one batched query over the association table
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT pt.product_id AS product_id, t.id AS id, t.name AS name \
         FROM product_tags pt \
         JOIN tags t ON t.id = pt.tag_id \
         WHERE pt.product_id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    qb.push(" ORDER BY t.id");

    let tag_rows: Vec<ProductTagRow> = qb.build_query_as().fetch_all(&mut *conn).await?;
    let mut tags_by_product: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in tag_rows {
        tags_by_product.entry(row.product_id).or_default().push(Tag {
            id: row.id,
            name: row.name,
        });
    }

    // 4. Assemble, preserving the caller's id order
    let mut rows_by_id: HashMap<i64, ProductRow> =
        rows.into_iter().map(|row| (row.id, row)).collect();

    let mut products = Vec::with_capacity(rows_by_id.len());
    for id in ids {
        let Some(row) = rows_by_id.remove(id) else {
            continue;
        };
        let category = row.category_id.and_then(|cid| categories.get(&cid).cloned());
        let tags = tags_by_product.remove(&row.id).unwrap_or_default();

        products.push(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            price_shmeckles: row.price_shmeckles,
            price_flurbos: row.price_flurbos,
            category,
            tags,
        });
    }

    Ok(products)
}

/// Wraps the search text in `%` wildcards for LIKE matching.
fn like_pattern(text: &str) -> String {
    format!("%{}%", text)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;
    use emporium_core::{CategoryCreate, TagCreate};

    fn plain_create(name: &str) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            description: Some("demo".to_string()),
            image_url: None,
            price_shmeckles: 9.5,
            price_flurbos: 3.25,
            category_id: None,
            tag_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_then_get_scalars_only() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo
            .create(plain_create("Portal Gun"), ValidationMode::Strict)
            .await
            .unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Portal Gun");
        assert_eq!(fetched.description.as_deref(), Some("demo"));
        assert_eq!(fetched.price_shmeckles, 9.5);
        assert_eq!(fetched.price_flurbos, 3.25);
        assert!(fetched.category.is_none());
        assert!(fetched.tags.is_empty());
    }

    #[tokio::test]
    async fn test_strict_create_with_missing_category_persists_nothing() {
        let db = test_db().await;
        let repo = db.products();

        let mut data = plain_create("Doomed");
        data.category_id = Some(404);

        let result = repo.create(data, ValidationMode::Strict).await;
        assert!(matches!(result, Err(DbError::CategoryNotFound { id: 404 })));

        // Atomicity: no partial product row
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_strict_create_with_missing_tag_persists_nothing() {
        let db = test_db().await;
        let repo = db.products();

        let real = db
            .tags()
            .create(TagCreate {
                name: "real".to_string(),
            })
            .await
            .unwrap();

        let mut data = plain_create("Doomed");
        data.tag_ids = vec![real.id, 404];

        let result = repo.create(data, ValidationMode::Strict).await;
        match result {
            Err(DbError::TagsNotFound { ids }) => assert_eq!(ids, vec![404]),
            other => panic!("expected TagsNotFound, got {:?}", other.map(|p| p.id)),
        }
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lenient_create_degrades_and_continues() {
        let db = test_db().await;
        let repo = db.products();

        let real = db
            .tags()
            .create(TagCreate {
                name: "real".to_string(),
            })
            .await
            .unwrap();

        let mut data = plain_create("Survivor");
        data.category_id = Some(404);
        data.tag_ids = vec![real.id, 405];

        let product = repo.create(data, ValidationMode::Lenient).await.unwrap();
        assert!(product.category.is_none());
        assert_eq!(product.tag_ids(), vec![real.id]);
    }

    #[tokio::test]
    async fn test_create_with_tags_is_order_independent() {
        let db = test_db().await;
        let repo = db.products();

        let a = db
            .tags()
            .create(TagCreate {
                name: "alpha".to_string(),
            })
            .await
            .unwrap();
        let b = db
            .tags()
            .create(TagCreate {
                name: "beta".to_string(),
            })
            .await
            .unwrap();

        let mut data = plain_create("Tagged");
        data.tag_ids = vec![b.id, a.id]; // reversed input order

        let created = repo.create(data, ValidationMode::Strict).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();

        let mut got = fetched.tag_ids();
        got.sort_unstable();
        assert_eq!(got, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_create_resolves_category() {
        let db = test_db().await;

        let category = db
            .categories()
            .create(CategoryCreate {
                name: "Gadgets".to_string(),
            })
            .await
            .unwrap();

        let mut data = plain_create("Meeseeks Box");
        data.category_id = Some(category.id);

        let product = db
            .products()
            .create(data, ValidationMode::Strict)
            .await
            .unwrap();
        assert_eq!(product.category, Some(category));
    }

    #[tokio::test]
    async fn test_get_all_pagination() {
        let db = test_db().await;
        let repo = db.products();

        for i in 0..5 {
            repo.create(plain_create(&format!("Item {i}")), ValidationMode::Strict)
                .await
                .unwrap();
        }

        let page = repo.get_all(1, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "Item 1");
        assert_eq!(page[1].name, "Item 2");

        let tail = repo.get_all(4, 10).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].name, "Item 4");
    }

    #[tokio::test]
    async fn test_update_missing_fails_and_store_unchanged() {
        let db = test_db().await;
        let repo = db.products();

        let result = repo
            .update(ProductUpdate {
                id: 404,
                name: "Ghost".to_string(),
                description: None,
                image_url: None,
                price_shmeckles: 1.0,
                price_flurbos: 1.0,
                category_id: None,
                tag_ids: None,
            })
            .await;

        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_overwrites_scalars_and_replaces_tags() {
        let db = test_db().await;
        let repo = db.products();

        let a = db
            .tags()
            .create(TagCreate {
                name: "alpha".to_string(),
            })
            .await
            .unwrap();
        let b = db
            .tags()
            .create(TagCreate {
                name: "beta".to_string(),
            })
            .await
            .unwrap();
        let category = db
            .categories()
            .create(CategoryCreate {
                name: "Gadgets".to_string(),
            })
            .await
            .unwrap();

        let mut data = plain_create("Before");
        data.tag_ids = vec![a.id];
        let created = repo.create(data, ValidationMode::Strict).await.unwrap();

        let updated = repo
            .update(ProductUpdate {
                id: created.id,
                name: "After".to_string(),
                description: None,
                image_url: Some("https://example.com/after.png".to_string()),
                price_shmeckles: 100.0,
                price_flurbos: 200.0,
                category_id: Some(category.id),
                tag_ids: Some(vec![b.id]),
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "After");
        assert_eq!(updated.description, None);
        assert_eq!(updated.price_shmeckles, 100.0);
        assert_eq!(updated.category, Some(category));
        assert_eq!(updated.tag_ids(), vec![b.id]);
    }

    #[tokio::test]
    async fn test_update_omitted_relations_are_cleared() {
        let db = test_db().await;
        let repo = db.products();

        let tag = db
            .tags()
            .create(TagCreate {
                name: "alpha".to_string(),
            })
            .await
            .unwrap();
        let category = db
            .categories()
            .create(CategoryCreate {
                name: "Gadgets".to_string(),
            })
            .await
            .unwrap();

        let mut data = plain_create("Loaded");
        data.category_id = Some(category.id);
        data.tag_ids = vec![tag.id];
        let created = repo.create(data, ValidationMode::Strict).await.unwrap();

        let updated = repo
            .update(ProductUpdate {
                id: created.id,
                name: "Loaded".to_string(),
                description: Some("demo".to_string()),
                image_url: None,
                price_shmeckles: 9.5,
                price_flurbos: 3.25,
                category_id: None,
                tag_ids: None,
            })
            .await
            .unwrap();

        // Omitted ⇒ cleared, for both relations
        assert!(updated.category.is_none());
        assert!(updated.tags.is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_leaves_product_untouched() {
        let db = test_db().await;
        let repo = db.products();

        let tag = db
            .tags()
            .create(TagCreate {
                name: "alpha".to_string(),
            })
            .await
            .unwrap();
        let category = db
            .categories()
            .create(CategoryCreate {
                name: "Gadgets".to_string(),
            })
            .await
            .unwrap();

        let mut data = plain_create("Stable");
        data.category_id = Some(category.id);
        data.tag_ids = vec![tag.id];
        let created = repo.create(data, ValidationMode::Strict).await.unwrap();

        // Unresolvable tag id mid-update: whole write must roll back
        let result = repo
            .update(ProductUpdate {
                id: created.id,
                name: "Mutated".to_string(),
                description: None,
                image_url: None,
                price_shmeckles: 0.0,
                price_flurbos: 0.0,
                category_id: None,
                tag_ids: Some(vec![404]),
            })
            .await;
        assert!(matches!(result, Err(DbError::TagsNotFound { .. })));

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_delete_clears_associations_and_keeps_category() {
        let db = test_db().await;
        let repo = db.products();

        let tag = db
            .tags()
            .create(TagCreate {
                name: "alpha".to_string(),
            })
            .await
            .unwrap();
        let category = db
            .categories()
            .create(CategoryCreate {
                name: "Gadgets".to_string(),
            })
            .await
            .unwrap();

        let mut data = plain_create("Doomed");
        data.category_id = Some(category.id);
        data.tag_ids = vec![tag.id];
        let created = repo.create(data, ValidationMode::Strict).await.unwrap();

        assert_eq!(repo.delete(created.id).await.unwrap(), Some(created.id));
        assert_eq!(repo.delete(created.id).await.unwrap(), None);

        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        // Tag and category rows survive the product
        assert!(db.tags().get_by_id(tag.id).await.unwrap().is_some());
        assert!(db.categories().get_by_id(category.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_search_by_name_is_case_insensitive() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(plain_create("Portal Gun"), ValidationMode::Strict)
            .await
            .unwrap();
        repo.create(plain_create("Plumbus"), ValidationMode::Strict)
            .await
            .unwrap();

        let results = repo.search_by_name("pORTAL").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Portal Gun");
    }

    #[tokio::test]
    async fn test_search_advanced_matches_name_category_and_tags() {
        let db = test_db().await;
        let repo = db.products();

        // 1. Matches on its own name, no category/tags
        repo.create(plain_create("Portal Gun"), ValidationMode::Strict)
            .await
            .unwrap();

        // 2. Matches via its category name
        let category = db
            .categories()
            .create(CategoryCreate {
                name: "Portal Accessories".to_string(),
            })
            .await
            .unwrap();
        let mut accessory = plain_create("Green Fluid Refill");
        accessory.category_id = Some(category.id);
        repo.create(accessory, ValidationMode::Strict).await.unwrap();

        // 3. Unrelated
        repo.create(plain_create("Plumbus"), ValidationMode::Strict)
            .await
            .unwrap();

        let results = repo.search_advanced("portal", 0, 100).await.unwrap();
        let names: Vec<_> = results.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Portal Gun", "Green Fluid Refill"]);

        // Tag-name match as well
        let tag = db
            .tags()
            .create(TagCreate {
                name: "interdimensional".to_string(),
            })
            .await
            .unwrap();
        let mut tagged = plain_create("Cable Box");
        tagged.tag_ids = vec![tag.id];
        repo.create(tagged, ValidationMode::Strict).await.unwrap();

        let results = repo.search_advanced("interdimensional", 0, 100).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Cable Box");
    }

    #[tokio::test]
    async fn test_search_advanced_deduplicates_before_pagination() {
        let db = test_db().await;
        let repo = db.products();

        // One product with two matching tags would produce two join rows
        let a = db
            .tags()
            .create(TagCreate {
                name: "portal-a".to_string(),
            })
            .await
            .unwrap();
        let b = db
            .tags()
            .create(TagCreate {
                name: "portal-b".to_string(),
            })
            .await
            .unwrap();

        let mut doubled = plain_create("Gun Case");
        doubled.tag_ids = vec![a.id, b.id];
        repo.create(doubled, ValidationMode::Strict).await.unwrap();

        repo.create(plain_create("Portal Gun"), ValidationMode::Strict)
            .await
            .unwrap();

        // limit 2 must yield both distinct products, each exactly once
        let results = repo.search_advanced("portal", 0, 2).await.unwrap();
        let names: Vec<_> = results.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Gun Case", "Portal Gun"]);
    }
}
