//! # Repository Module
//!
//! Database repository implementations for Shopkeep.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().create(body)                                    │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── normalize input (shopkeep-core rules)                             │
//! │  ├── fast-path duplicate checks (friendly messages)                    │
//! │  ├── SQL                                                                │
//! │  └── UNIQUE violation → CoreError::Duplicate                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD, stock reads
//! - [`supplier::SupplierRepository`] - Supplier CRUD
//! - [`sale::SaleRepository`] - Sale ledger reads and expansion
//! - [`report::ReportRepository`] - Monthly report and dashboard stats
//!
//! Writes that touch stock go through [`crate::processor::SaleProcessor`].

pub mod product;
pub mod report;
pub mod sale;
pub mod supplier;
