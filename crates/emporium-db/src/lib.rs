//! # emporium-db: Database Layer for Emporium
//!
//! This crate provides database access for the Emporium catalog.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Emporium Data Flow                            │
//! │                                                                     │
//! │  Caller (service, CLI, test)                                        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                   emporium-db (THIS CRATE)                    │ │
//! │  │                                                               │ │
//! │  │  ┌─────────────┐  ┌───────────────┐  ┌──────────────┐        │ │
//! │  │  │  Database   │  │ Repositories  │  │  Migrations  │        │ │
//! │  │  │  (pool.rs)  │  │ category.rs   │  │  (embedded)  │        │ │
//! │  │  │             │  │ tag.rs        │  │              │        │ │
//! │  │  │ SqlitePool  │◄─│ product.rs    │  │ 001_init.sql │        │ │
//! │  │  └─────────────┘  └───────┬───────┘  └──────────────┘        │ │
//! │  │                          │                                   │ │
//! │  │                  ┌───────▼────────┐                          │ │
//! │  │                  │ transaction.rs │  commit / rollback       │ │
//! │  │                  └────────────────┘                          │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (single file, WAL mode)                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`transaction`] - Commit-on-success / rollback-on-failure wrapper
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (category, tag, product)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use emporium_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/catalog.db");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let products = db.products().search_by_name("portal").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod transaction;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use transaction::with_transaction;

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::tag::TagRepository;
