//! # Error Types
//!
//! Domain-specific error types for shopkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopkeep-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopkeep-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP errors (apps/server)                                             │
//! │  └── ApiError         - What the client sees: status + {message}       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::sale::SaleTxnState;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant maps to exactly one HTTP status in the server crate:
/// not-found variants to 404, everything else here to 400 except
/// `InvalidTransition`, which is an internal fault.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not exist. The id is kept for logs, not the message.
    #[error("Product not found")]
    ProductNotFound(String),

    /// Supplier id does not exist.
    #[error("Supplier not found")]
    SupplierNotFound(String),

    /// Sale id does not exist.
    #[error("Sale not found")]
    SaleNotFound(String),

    /// A business key is already taken.
    ///
    /// ## When This Occurs
    /// - Product code or product name already used by another product
    /// - Supplier name or contact already used by another supplier
    /// - Voucher number already recorded in the sale ledger
    #[error("{entity} with {field} \"{value}\" already exists. Please use a different {alternative}.")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
        /// What the caller should change, e.g. "Product ID" for a code clash.
        alternative: String,
    },

    /// Insufficient stock to complete a sale.
    ///
    /// ## User Workflow
    /// ```text
    /// POST /api/sales  { products: [{ product: P, quantity: 5, ... }] }
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "PX3 CHINA 30 BORE", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// 400 { message: "Insufficient stock for product \"PX3 CHINA 30 BORE\". Available: 3, Requested: 5" }
    /// ```
    #[error("Insufficient stock for product \"{product}\". Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// One line item of a sale request is malformed (1-based line number).
    #[error("Invalid line item {line}: {reason}")]
    InvalidLineItem {
        line: usize,
        reason: ValidationError,
    },

    /// The sale transaction state machine was driven along an illegal edge.
    #[error("Illegal sale transaction transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: SaleTxnState,
        to: SaleTxnState,
    },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a Duplicate error whose hint repeats the field name.
    pub fn duplicate(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let field = field.into();
        CoreError::Duplicate {
            entity: entity.into(),
            alternative: field.clone(),
            field,
            value: value.into(),
        }
    }

    /// Product code clash: `Product with ID "A001" ... different Product ID.`
    pub fn duplicate_product_code(code: impl Into<String>) -> Self {
        CoreError::Duplicate {
            entity: "Product".to_string(),
            field: "ID".to_string(),
            value: code.into(),
            alternative: "Product ID".to_string(),
        }
    }

    /// Returns true for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ProductNotFound(_) | CoreError::SupplierNotFound(_) | CoreError::SaleNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A list must contain at least one entry.
    #[error("{field} must contain at least one item")]
    Empty { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters long")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed JSON body, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A referenced record (e.g. a product's supplier) does not exist.
    #[error("{field} \"{id}\" does not exist")]
    UnknownReference { field: String, id: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
