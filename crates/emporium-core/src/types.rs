//! # Schema Types
//!
//! Boundary types exchanged between callers and the catalog CRUD layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Schema Types                                │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │    Product      │   │    Category     │   │      Tag        │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │   │
//! │  │  name           │   │  name           │   │  name           │   │
//! │  │  prices (x2)    │   └─────────────────┘   └─────────────────┘   │
//! │  │  category?      │                                               │
//! │  │  tags []        │   Create-shapes: ProductCreate,               │
//! │  └─────────────────┘   CategoryCreate, TagCreate (no id)           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Create vs Read Shapes
//! Every entity has:
//! - a create shape (`*Create`) without an id, referencing relations by id
//! - a read shape with the generated id and relations eagerly populated

use serde::{Deserialize, Serialize};

// =============================================================================
// Category
// =============================================================================

/// Data required to create a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    /// Category name, unique by convention (see repository docs).
    pub name: String,
}

/// A product category as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    /// Generated identifier.
    pub id: i64,

    /// Category name.
    pub name: String,
}

// =============================================================================
// Tag
// =============================================================================

/// Data required to create a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCreate {
    /// Tag name, unique by convention (see repository docs).
    pub name: String,
}

/// A product tag as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Tag {
    /// Generated identifier.
    pub id: i64,

    /// Tag name.
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// Data required to create a product.
///
/// Relations are referenced by id; the repository resolves them at write
/// time according to the chosen [`ValidationMode`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    /// Display name (required, at most 100 characters).
    pub name: String,

    /// Optional description (at most 500 characters).
    pub description: Option<String>,

    /// Optional image URL (at most 255 characters).
    pub image_url: Option<String>,

    /// Price in shmeckles. Independent currency, no conversion.
    pub price_shmeckles: f64,

    /// Price in flurbos. Independent currency, no conversion.
    pub price_flurbos: f64,

    /// Optional category reference, resolved at write time.
    pub category_id: Option<i64>,

    /// Tag references, batch-resolved at write time.
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Data for a full product overwrite.
///
/// This is not a sparse patch: every scalar field replaces the stored value
/// unconditionally. Relation fields follow the omitted⇒cleared convention:
///
/// - `category_id: None` clears the category reference
/// - `tag_ids: None` clears the tag set; `Some(vec![])` clears it as well,
///   `Some(ids)` fully replaces it after strict resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    /// Identifier of the product to overwrite. Must exist.
    pub id: i64,

    /// Display name (required, at most 100 characters).
    pub name: String,

    /// Optional description (at most 500 characters).
    pub description: Option<String>,

    /// Optional image URL (at most 255 characters).
    pub image_url: Option<String>,

    /// Price in shmeckles.
    pub price_shmeckles: f64,

    /// Price in flurbos.
    pub price_flurbos: f64,

    /// New category reference; `None` detaches the current one.
    pub category_id: Option<i64>,

    /// Replacement tag set; `None` clears all tags.
    pub tag_ids: Option<Vec<i64>>,
}

/// A product as stored, with relations eagerly populated.
///
/// ## Eager Loading
/// `category` and `tags` are always fetched together with the row. There is
/// no lazy relation access: once a repository call returns, the value is
/// self-contained and valid beyond the unit of work that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Generated identifier.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Optional image URL.
    pub image_url: Option<String>,

    /// Price in shmeckles.
    pub price_shmeckles: f64,

    /// Price in flurbos.
    pub price_flurbos: f64,

    /// Category, if one is attached.
    pub category: Option<Category>,

    /// Attached tags, in storage order.
    pub tags: Vec<Tag>,
}

impl Product {
    /// Returns the ids of the attached tags.
    pub fn tag_ids(&self) -> Vec<i64> {
        self.tags.iter().map(|tag| tag.id).collect()
    }

    /// Checks whether the given tag is attached.
    pub fn has_tag(&self, tag_id: i64) -> bool {
        self.tags.iter().any(|tag| tag.id == tag_id)
    }
}

// =============================================================================
// Validation Mode
// =============================================================================

/// Relation-resolution policy for product creation.
///
/// ## Strict vs Lenient
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  create(product with category_id=99, tag_ids=[1, 42])              │
/// │                                                                     │
/// │  Strict:   99 or 42 missing → whole write aborts, nothing persists │
/// │  Lenient:  99 missing → product persists without category (warn)   │
/// │            42 missing → tag 42 dropped, tag 1 attached (warn)      │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
///
/// One mode applies to the whole call; category and tag policies are never
/// mixed. Updates are always strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Any unresolved reference aborts the whole write.
    Strict,
    /// Unresolved references are dropped with a warning.
    Lenient,
}

impl Default for ValidationMode {
    fn default() -> Self {
        ValidationMode::Strict
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_mode_default_is_strict() {
        assert_eq!(ValidationMode::default(), ValidationMode::Strict);
    }

    #[test]
    fn test_product_tag_helpers() {
        let product = Product {
            id: 1,
            name: "Portal Gun".to_string(),
            description: None,
            image_url: None,
            price_shmeckles: 9000.0,
            price_flurbos: 12.5,
            category: None,
            tags: vec![
                Tag {
                    id: 3,
                    name: "sci-fi".to_string(),
                },
                Tag {
                    id: 7,
                    name: "gadget".to_string(),
                },
            ],
        };

        assert_eq!(product.tag_ids(), vec![3, 7]);
        assert!(product.has_tag(7));
        assert!(!product.has_tag(4));
    }

    #[test]
    fn test_product_create_tag_ids_default_empty() {
        let json = r#"{
            "name": "Plumbus",
            "description": null,
            "image_url": null,
            "price_shmeckles": 6.5,
            "price_flurbos": 2.0,
            "category_id": null
        }"#;

        let data: ProductCreate = serde_json::from_str(json).unwrap();
        assert!(data.tag_ids.is_empty());
    }
}
