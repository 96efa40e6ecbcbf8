//! # emporium-core: Pure Schema Types for Emporium
//!
//! This crate holds the boundary types of the Emporium catalog with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Emporium Architecture                          │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │               ★ emporium-core (THIS CRATE) ★                  │ │
//! │  │                                                               │ │
//! │  │   ┌─────────────┐  ┌─────────────┐  ┌─────────────┐          │ │
//! │  │   │   types     │  │ validation  │  │   error     │          │ │
//! │  │   │  Product    │  │   rules     │  │ Validation  │          │ │
//! │  │   │  Category   │  │   checks    │  │   Error     │          │ │
//! │  │   │  Tag        │  └─────────────┘  └─────────────┘          │ │
//! │  │   └─────────────┘                                            │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                  │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │                   emporium-db (Database Layer)                │ │
//! │  │            SQLite queries, migrations, repositories           │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Boundary schema types (Product, Category, Tag, ...)
//! - [`error`] - Validation error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use emporium_core::Product` instead of
// `use emporium_core::types::Product`

pub use error::ValidationError;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================
// Field length limits match the column lengths of the catalog schema, so a
// value that passes validation is guaranteed to fit the storage layer.

/// Maximum length of a product, category or tag name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a product description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum length of a product image URL.
pub const MAX_IMAGE_URL_LEN: usize = 255;
