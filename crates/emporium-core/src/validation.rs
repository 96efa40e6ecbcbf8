//! # Validation Module
//!
//! Field-level validation for the catalog schema types.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: THIS MODULE (Rust)                                        │
//! │  ├── Field presence and length rules                                │
//! │  └── Price sanity (finite, non-negative)                            │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: Repository (emporium-db)                                  │
//! │  ├── Relation existence (category id, tag ids)                      │
//! │  └── Name-reuse policy for categories/tags                          │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL constraints                                           │
//! │  └── Foreign key constraints                                        │
//! │                                                                     │
//! │  Defense in depth: multiple layers catch different errors           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use emporium_core::validation::validate_name;
//!
//! assert!(validate_name("Portal Gun").is_ok());
//! assert!(validate_name("").is_err());
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{ProductCreate, ProductUpdate};
use crate::{MAX_DESCRIPTION_LEN, MAX_IMAGE_URL_LEN, MAX_NAME_LEN};

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity name (product, category or tag).
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 100 characters as given; the value is stored verbatim,
///   so the length check runs on the untrimmed input to match the column
///   constraint
pub fn validate_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional product description.
///
/// ## Rules
/// - May be absent
/// - Must be at most 500 characters when present
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    if let Some(description) = description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: MAX_DESCRIPTION_LEN,
            });
        }
    }

    Ok(())
}

/// Validates an optional product image URL.
///
/// ## Rules
/// - May be absent
/// - Must be at most 255 characters when present
pub fn validate_image_url(image_url: Option<&str>) -> ValidationResult<()> {
    if let Some(image_url) = image_url {
        if image_url.chars().count() > MAX_IMAGE_URL_LEN {
            return Err(ValidationError::TooLong {
                field: "image_url".to_string(),
                max: MAX_IMAGE_URL_LEN,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price value.
///
/// ## Rules
/// - Must be a finite number (no NaN/infinity)
/// - Must not be negative; zero is allowed (free items)
///
/// Shmeckles and flurbos are independent currencies; both price fields go
/// through the same rule.
pub fn validate_price(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Shape Validators
// =============================================================================

/// Validates a full `ProductCreate` shape.
pub fn validate_product_create(data: &ProductCreate) -> ValidationResult<()> {
    validate_name(&data.name)?;
    validate_description(data.description.as_deref())?;
    validate_image_url(data.image_url.as_deref())?;
    validate_price("price_shmeckles", data.price_shmeckles)?;
    validate_price("price_flurbos", data.price_flurbos)?;
    Ok(())
}

/// Validates a full `ProductUpdate` shape.
pub fn validate_product_update(data: &ProductUpdate) -> ValidationResult<()> {
    validate_name(&data.name)?;
    validate_description(data.description.as_deref())?;
    validate_image_url(data.image_url.as_deref())?;
    validate_price("price_shmeckles", data.price_shmeckles)?;
    validate_price("price_flurbos", data.price_flurbos)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
