//! # Validation Module
//!
//! Input validation utilities for Shopkeep.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (serde)                                       │
//! │  ├── Field types, required keys, Category enum                         │
//! │  └── Malformed body → 400                                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Trimming, minimum lengths                                         │
//! │  └── Sign rules for quantities and prices                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (quantity >= 0, cost_price > 0)                 │
//! │  └── UNIQUE constraints (the authoritative duplicate guard)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Text validators return the trimmed value so callers store what was checked.
//!
//! ## Usage
//! ```rust
//! use shopkeep_core::validation::{validate_supplier_contact, validate_stock_quantity};
//!
//! assert_eq!(validate_supplier_contact(" 03001234567 ").unwrap(), "03001234567");
//! assert!(validate_stock_quantity(-1).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product code.
pub const MAX_PRODUCT_CODE_LEN: usize = 50;

/// Longest accepted product or supplier name.
pub const MAX_NAME_LEN: usize = 200;

/// Shortest accepted supplier name (after trimming).
pub const MIN_SUPPLIER_NAME_LEN: usize = 2;

/// Shortest accepted supplier contact (after trimming).
pub const MIN_SUPPLIER_CONTACT_LEN: usize = 5;

// =============================================================================
// String Validators
// =============================================================================

fn required_trimmed(value: &str, field: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a product code ("productId" on the wire).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 50 characters
///
/// ## Example
/// ```rust
/// use shopkeep_core::validation::validate_product_code;
///
/// assert_eq!(validate_product_code(" A001 ").unwrap(), "A001");
/// assert!(validate_product_code("   ").is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<String> {
    required_trimmed(code, "productId", MAX_PRODUCT_CODE_LEN)
}

/// Validates a product display name.
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    required_trimmed(name, "name", MAX_NAME_LEN)
}

/// Validates a supplier name: at least 2 characters once trimmed.
pub fn validate_supplier_name(name: &str) -> ValidationResult<String> {
    let name = required_trimmed(name, "Supplier name", MAX_NAME_LEN)?;
    if name.chars().count() < MIN_SUPPLIER_NAME_LEN {
        return Err(ValidationError::TooShort {
            field: "Supplier name".to_string(),
            min: MIN_SUPPLIER_NAME_LEN,
        });
    }
    Ok(name)
}

/// Validates a supplier contact: at least 5 characters once trimmed.
pub fn validate_supplier_contact(contact: &str) -> ValidationResult<String> {
    let contact = required_trimmed(contact, "Contact", MAX_NAME_LEN)?;
    if contact.chars().count() < MIN_SUPPLIER_CONTACT_LEN {
        return Err(ValidationError::TooShort {
            field: "Contact".to_string(),
            min: MIN_SUPPLIER_CONTACT_LEN,
        });
    }
    Ok(contact)
}

/// Validates a voucher number. Comparison elsewhere is exact after trimming.
pub fn validate_voucher_number(voucher: &str) -> ValidationResult<String> {
    required_trimmed(voucher, "voucherNumber", MAX_PRODUCT_CODE_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock level. Zero is allowed (sold out).
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "Quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a product's unit cost. Must be strictly positive.
pub fn validate_cost_price(cost: Money) -> ValidationResult<()> {
    if !cost.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "Cost price".to_string(),
        });
    }
    Ok(())
}

/// Validates the quantity on a sale line.
///
/// ## User Workflow
/// ```text
/// POST /api/sales  line { quantity: 0 }
///      │
///      ▼
/// validate_sale_quantity(0) ← THIS FUNCTION
///      │
///      ├── qty <= 0? → "Quantity must be greater than 0"
///      │
///      └── OK → stock check
/// ```
pub fn validate_sale_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates the unit sale price on a sale line.
pub fn validate_sale_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "Sale price".to_string(),
        });
    }
    Ok(())
}

/// Validates a reporting month (1-based).
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
