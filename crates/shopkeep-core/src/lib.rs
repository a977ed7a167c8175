//! # shopkeep-core: Pure Business Logic for Shopkeep
//!
//! Everything about inventory, suppliers and sales that can be decided
//! without touching a database lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopkeep Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client (out of tree)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP/JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopkeep-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   sale    │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │ SaleDraft │  │ month     │  │   │
//! │  │   │  Supplier │  │           │  │ TxnState  │  │ ranges    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  shopkeep-db (Database Layer)                   │   │
//! │  │       SQLite queries, migrations, repositories, processor       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Supplier, Sale, views, request bodies)
//! - [`money`] - Money type with integer arithmetic
//! - [`sale`] - Sale draft normalization, totals, transaction state machine
//! - [`report`] - Month/day ranges and summaries
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules
//!
//! ## Example Usage
//!
//! ```rust
//! use shopkeep_core::{DraftLine, Money, SaleDraft};
//!
//! let draft = SaleDraft {
//!     voucher_number: "  V-001 ".to_string(),
//!     products: vec![DraftLine {
//!         product: "b9f1c2d4-0000-4000-8000-000000000001".to_string(),
//!         quantity: 3,
//!         sale_price: Money::from_minor(50_000),
//!     }],
//!     date: None,
//! }
//! .normalize()
//! .unwrap();
//!
//! assert_eq!(draft.voucher_number, "V-001");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use shopkeep_core::Money` instead of
// `use shopkeep_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{DateRange, MonthlyReport, MonthlySummary};
pub use sale::{DraftLine, SaleDraft, SaleTotals, SaleTxnState};
pub use types::*;
