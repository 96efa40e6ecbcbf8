//! # Repository Module
//!
//! Database repository implementations for the Emporium catalog.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                     │
//! │                                                                     │
//! │  The Repository pattern abstracts database access behind a clean    │
//! │  API.                                                               │
//! │                                                                     │
//! │  Caller                                                             │
//! │       │                                                             │
//! │       │  db.products().search_advanced("portal", 0, 20)             │
//! │       ▼                                                             │
//! │  ProductRepository                                                  │
//! │  ├── create(&self, data, mode)      ─┐                              │
//! │  ├── update(&self, data)             ├─ writes run inside           │
//! │  ├── delete(&self, id)              ─┘  with_transaction            │
//! │  ├── get_by_id(&self, id)           ─┐                              │
//! │  └── get_all(&self, skip, limit)    ─┴─ reads use their own         │
//! │       │                                 pooled connection           │
//! │       ▼                                                             │
//! │  SQLite Database                                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Category CRUD with detach-on-delete
//! - [`tag::TagRepository`] - Tag CRUD with association cleanup
//! - [`product::ProductRepository`] - Relation-aware product CRUD and search

pub mod category;
pub mod product;
pub mod tag;
