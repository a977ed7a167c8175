//! # Sale Module
//!
//! The pure half of sale processing: request normalization, stock checks,
//! totals, and the transaction state machine. The database half lives in
//! `shopkeep_db::processor`.
//!
//! ## Create Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SaleDraft (request body)                                               │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  normalize()          trim voucher, ≥1 line, qty > 0, price > 0        │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ┌──────────────┐   requested_by_product() + check_stock()             │
//! │  │  Validating  │──────────────────────────────────┐                   │
//! │  └──────┬───────┘                                  │ any failure       │
//! │         │ all lines pass                           ▼                   │
//! │  ┌──────▼───────┐   conditional decrement   ┌──────────────┐          │
//! │  │  Committing  │──────────────────────────►│  RolledBack  │          │
//! │  └──────┬───────┘   fails on some line      └──────────────┘          │
//! │         │ every decrement + ledger insert ok                           │
//! │  ┌──────▼───────┐                                                      │
//! │  │  Committed   │   SaleTotals → totalAmount, profit                   │
//! │  └──────────────┘                                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, SaleLine};
use crate::validation;

// =============================================================================
// Sale Draft
// =============================================================================

/// One requested line of a new sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DraftLine {
    /// Product id (UUID).
    pub product: String,
    #[ts(type = "number")]
    pub quantity: i64,
    #[ts(type = "number")]
    pub sale_price: Money,
}

/// Body of `POST /api/sales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDraft {
    pub voucher_number: String,
    pub products: Vec<DraftLine>,
    /// Overrides the sale timestamp. Defaults to now.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
}

impl SaleDraft {
    /// Trims the voucher and checks every line, in list order.
    ///
    /// Fails on the first problem found; line numbers in errors are 1-based.
    pub fn normalize(self) -> CoreResult<Self> {
        let voucher_number = validation::validate_voucher_number(&self.voucher_number)?;

        if self.products.is_empty() {
            return Err(ValidationError::Empty {
                field: "products".to_string(),
            }
            .into());
        }

        let mut products = Vec::with_capacity(self.products.len());
        let mut running_total = Money::zero();
        for (index, line) in self.products.into_iter().enumerate() {
            let line_no = index + 1;
            let invalid = |reason| CoreError::InvalidLineItem {
                line: line_no,
                reason,
            };

            let product = line.product.trim().to_string();
            if product.is_empty() {
                return Err(invalid(ValidationError::Required {
                    field: "product".to_string(),
                }));
            }
            validation::validate_sale_quantity(line.quantity).map_err(invalid)?;
            validation::validate_sale_price(line.sale_price).map_err(invalid)?;

            running_total = line
                .sale_price
                .checked_multiply_quantity(line.quantity)
                .and_then(|line_total| running_total.checked_add(line_total))
                .ok_or_else(|| invalid(amount_overflow("salePrice")))?;

            products.push(DraftLine {
                product,
                quantity: line.quantity,
                sale_price: line.sale_price,
            });
        }

        Ok(SaleDraft {
            voucher_number,
            products,
            date: self.date,
        })
    }

    /// Sums requested quantities per product, in order of first appearance.
    ///
    /// Two lines for the same product must be covered by its stock together.
    pub fn requested_by_product(&self) -> Vec<(String, i64)> {
        let mut totals: Vec<(String, i64)> = Vec::new();
        for line in &self.products {
            match totals.iter_mut().find(|(id, _)| *id == line.product) {
                Some((_, qty)) => *qty = qty.saturating_add(line.quantity),
                None => totals.push((line.product.clone(), line.quantity)),
            }
        }
        totals
    }
}

fn amount_overflow(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 1,
        max: i64::MAX,
    }
}

/// Checks that `product` has at least `requested` units.
///
/// ## Example
/// ```rust,ignore
/// check_stock(&product, 5)?; // product.quantity == 3
/// // Err: Insufficient stock for product "PX3 CHINA 30 BORE". Available: 3, Requested: 5
/// ```
pub fn check_stock(product: &Product, requested: i64) -> CoreResult<()> {
    if product.can_sell(requested) {
        Ok(())
    } else {
        Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.quantity,
            requested,
        })
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Running totals for a sale being committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaleTotals {
    pub total_amount: Money,
    pub profit: Money,
}

impl SaleTotals {
    /// Adds one committed line. Fails only on arithmetic overflow.
    pub fn push(&mut self, line: &SaleLine) -> CoreResult<()> {
        let line_total = line
            .sale_price
            .checked_multiply_quantity(line.quantity)
            .ok_or_else(|| amount_overflow("totalAmount"))?;
        let margin = line
            .sale_price
            .minor()
            .checked_sub(line.unit_cost.minor())
            .and_then(|m| m.checked_mul(line.quantity))
            .map(Money::from_minor)
            .ok_or_else(|| amount_overflow("profit"))?;

        self.total_amount = self
            .total_amount
            .checked_add(line_total)
            .ok_or_else(|| amount_overflow("totalAmount"))?;
        self.profit = self
            .profit
            .checked_add(margin)
            .ok_or_else(|| amount_overflow("profit"))?;
        Ok(())
    }

    /// Totals for a complete list of lines.
    pub fn from_lines(lines: &[SaleLine]) -> CoreResult<Self> {
        let mut totals = SaleTotals::default();
        for line in lines {
            totals.push(line)?;
        }
        Ok(totals)
    }
}

// =============================================================================
// Transaction State
// =============================================================================

/// Progress of one create-sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaleTxnState {
    /// Checking the request against current stock. Nothing written yet.
    Validating,
    /// Inside the database transaction, decrementing stock line by line.
    Committing,
    /// Stock and ledger written.
    Committed,
    /// Nothing written, or every write undone.
    RolledBack,
}

impl SaleTxnState {
    /// Whether the machine has stopped.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, SaleTxnState::Committed | SaleTxnState::RolledBack)
    }

    /// Whether `self → to` is a legal edge.
    pub const fn can_transition(&self, to: SaleTxnState) -> bool {
        matches!(
            (self, to),
            (SaleTxnState::Validating, SaleTxnState::Committing)
                | (SaleTxnState::Validating, SaleTxnState::RolledBack)
                | (SaleTxnState::Committing, SaleTxnState::Committed)
                | (SaleTxnState::Committing, SaleTxnState::RolledBack)
        )
    }

    /// Moves to `to`, or reports the illegal edge without moving.
    pub fn advance(&mut self, to: SaleTxnState) -> CoreResult<()> {
        if !self.can_transition(to) {
            return Err(CoreError::InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }
}

impl Default for SaleTxnState {
    fn default() -> Self {
        SaleTxnState::Validating
    }
}

impl fmt::Display for SaleTxnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaleTxnState::Validating => "validating",
            SaleTxnState::Committing => "committing",
            SaleTxnState::Committed => "committed",
            SaleTxnState::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
