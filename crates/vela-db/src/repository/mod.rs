//! # Repository Module
//!
//! Database repository implementations for the discount catalog.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DiscountService (discount-api)                                        │
//! │       │                                                                 │
//! │       │  db.discounts().find_by_code("SALE10")                         │
//! │       ▼                                                                 │
//! │  DiscountRepository                                                    │
//! │  ├── find_by_code(&self, code)                                         │
//! │  ├── list_automatic_candidates(&self, now)                             │
//! │  ├── insert(&self, new_discount)                                       │
//! │  └── count(&self)                                                      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`DiscountRepository`](discount::DiscountRepository) - Discount lookups and inserts

pub mod discount;
