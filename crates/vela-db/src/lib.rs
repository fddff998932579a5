//! # vela-db: Discount Catalog Access
//!
//! This crate reads the discount catalog for the Vela discount engine.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vela Discount Data Flow                            │
//! │                                                                         │
//! │  discount-api handler (POST /discounts/validate)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vela-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (discount.rs)  │   │  (embedded)  │  │   │
//! │  │   │               │    │                │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ DiscountRepo   │   │ 001_disc.sql │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │                     $VELA_DB_PATH (./vela.db)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Discount catalog repository
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vela_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./vela.db")).await?;
//!
//! let sale10 = db.discounts().find_by_code("SALE10").await?;
//! let automatic = db.discounts().list_automatic_candidates(Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::discount::{DiscountRecord, DiscountRepository, NewDiscount};
