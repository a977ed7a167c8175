//! # Sale Transaction Processor
//!
//! Creates and deletes sales together with their stock effects.
//!
//! ## Create Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleDraft                                                              │
//! │      │ normalize()                      (pure, shopkeep-core)           │
//! │      ▼                                                                  │
//! │  voucher already used? ──► Duplicate    (fast path, friendly message)   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Validating: every product exists, stock covers Σ qty per product      │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  BEGIN                                                                  │
//! │  Committing: per line                                                   │
//! │      UPDATE products SET quantity = quantity - q                        │
//! │      WHERE id = ? AND quantity >= q RETURNING cost_price                │
//! │      no row? ──► ROLLBACK (earlier decrements undone) ──► RolledBack    │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  INSERT sales + sale_items                                              │
//! │      UNIQUE(voucher_number)? ──► ROLLBACK ──► Duplicate                 │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  COMMIT ──► Committed                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional UPDATE is the correctness boundary for stock: two sales
//! racing for the last units both pass validation, but only one decrement
//! matches `quantity >= q`.
//!
//! ## Delete Sale
//! One transaction removes the lines, removes the header and puts every sold
//! quantity back. Lines whose product was deleted are skipped.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use shopkeep_core::sale::check_stock;
use shopkeep_core::{
    CoreError, Money, Sale, SaleDraft, SaleLine, SaleTotals, SaleTxnState,
};

/// Runs create-sale and delete-sale transactions.
#[derive(Debug, Clone)]
pub struct SaleProcessor {
    pool: SqlitePool,
}

impl SaleProcessor {
    /// Creates a new SaleProcessor.
    pub fn new(pool: SqlitePool) -> Self {
        SaleProcessor { pool }
    }

    /// Records a sale and takes its quantities out of stock.
    ///
    /// Either the sale and every decrement are written, or nothing is.
    ///
    /// ## Errors
    /// - `Validation` / `InvalidLineItem`: malformed request
    /// - `Duplicate`: voucher number already used
    /// - `ProductNotFound`: a line references an unknown product
    /// - `InsufficientStock`: not enough units (names product, available, requested)
    pub async fn create_sale(&self, draft: SaleDraft) -> DbResult<Sale> {
        let mut state = SaleTxnState::Validating;
        let draft = draft.normalize()?;

        debug!(
            voucher = %draft.voucher_number,
            lines = draft.products.len(),
            "Validating sale"
        );

        if let Err(err) = self.validate(&draft).await {
            state.advance(SaleTxnState::RolledBack)?;
            debug!(voucher = %draft.voucher_number, error = %err, state = %state, "Sale rejected");
            return Err(err);
        }

        state.advance(SaleTxnState::Committing)?;
        let mut tx = self.pool.begin().await?;

        match commit(&mut tx, &draft).await {
            Ok(sale) => {
                tx.commit().await?;
                state.advance(SaleTxnState::Committed)?;
                info!(
                    id = %sale.id,
                    voucher = %sale.voucher_number,
                    total_amount = %sale.total_amount,
                    profit = %sale.profit,
                    state = %state,
                    "Sale recorded"
                );
                Ok(sale)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed; connection will be discarded");
                }
                state.advance(SaleTxnState::RolledBack)?;
                warn!(
                    voucher = %draft.voucher_number,
                    error = %err,
                    state = %state,
                    "Sale rolled back"
                );
                Err(err)
            }
        }
    }

    /// Deletes a sale and returns its quantities to stock.
    ///
    /// ## Errors
    /// - `SaleNotFound`: no sale with this ID (nothing changes)
    pub async fn delete_sale(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let lines: Vec<(String, i64)> = sqlx::query_as(
            "DELETE FROM sale_items WHERE sale_id = ?1 RETURNING product_id, quantity",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let removed = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            tx.rollback().await?;
            return Err(CoreError::SaleNotFound(id.to_string()).into());
        }

        let now = Utc::now();
        let mut restored = 0usize;
        for (product_id, quantity) in &lines {
            let updated = sqlx::query(
                "UPDATE products SET quantity = quantity + ?1, updated_at = ?2 WHERE id = ?3",
            )
            .bind(quantity)
            .bind(now)
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if updated == 0 {
                warn!(
                    sale_id = %id,
                    product_id = %product_id,
                    quantity = quantity,
                    "Product no longer exists; stock not restored"
                );
            } else {
                restored += 1;
            }
        }

        tx.commit().await?;

        info!(id = %id, lines = lines.len(), restored, "Sale deleted and stock restored");
        Ok(())
    }

    /// Checks the draft against current stock without writing anything.
    async fn validate(&self, draft: &SaleDraft) -> DbResult<()> {
        let sales = SaleRepository::new(self.pool.clone());
        if sales.voucher_exists(&draft.voucher_number).await? {
            return Err(duplicate_voucher(&draft.voucher_number));
        }

        let products = ProductRepository::new(self.pool.clone());
        for (product_id, requested) in draft.requested_by_product() {
            let product = products.get(&product_id).await?;
            check_stock(&product, requested)?;
        }
        Ok(())
    }
}

/// The write half of create-sale. Runs inside `tx`; the caller commits or
/// rolls back.
async fn commit(tx: &mut Transaction<'_, Sqlite>, draft: &SaleDraft) -> DbResult<Sale> {
    let now = Utc::now();
    let mut lines = Vec::with_capacity(draft.products.len());

    for (index, requested) in draft.products.iter().enumerate() {
        let cost_price: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET quantity = quantity - ?1, updated_at = ?2
            WHERE id = ?3 AND quantity >= ?1
            RETURNING cost_price
            "#,
        )
        .bind(requested.quantity)
        .bind(now)
        .bind(&requested.product)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(cost_price) = cost_price else {
            return Err(stock_conflict(tx, &requested.product, requested.quantity).await);
        };

        debug!(
            line = index + 1,
            product_id = %requested.product,
            quantity = requested.quantity,
            "Stock decremented"
        );

        lines.push(SaleLine {
            product: requested.product.clone(),
            quantity: requested.quantity,
            sale_price: requested.sale_price,
            unit_cost: Money::from_minor(cost_price),
        });
    }

    let totals = SaleTotals::from_lines(&lines)?;

    let sale = Sale {
        id: Uuid::new_v4().to_string(),
        voucher_number: draft.voucher_number.clone(),
        products: lines,
        total_amount: totals.total_amount,
        profit: totals.profit,
        date: draft.date.unwrap_or(now),
    };

    sqlx::query(
        r#"
        INSERT INTO sales (id, voucher_number, total_amount, profit, sold_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.voucher_number)
    .bind(sale.total_amount)
    .bind(sale.profit)
    .bind(sale.date)
    .execute(&mut **tx)
    .await
    .map_err(|e| match DbError::from(e) {
        err if err.unique_field() == Some("sales.voucher_number") => {
            duplicate_voucher(&sale.voucher_number)
        }
        err => err,
    })?;

    for (index, line) in sale.products.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sale_items (sale_id, line_no, product_id, quantity, sale_price, unit_cost)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&sale.id)
        .bind(index as i64 + 1)
        .bind(&line.product)
        .bind(line.quantity)
        .bind(line.sale_price)
        .bind(line.unit_cost)
        .execute(&mut **tx)
        .await?;
    }

    Ok(sale)
}

/// Explains why a conditional decrement matched no row.
async fn stock_conflict(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    requested: i64,
) -> DbError {
    let current: Result<Option<(String, i64)>, sqlx::Error> =
        sqlx::query_as("SELECT name, quantity FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await;

    match current {
        Ok(Some((name, available))) => CoreError::InsufficientStock {
            product: name,
            available,
            requested,
        }
        .into(),
        Ok(None) => CoreError::ProductNotFound(product_id.to_string()).into(),
        Err(err) => err.into(),
    }
}

fn duplicate_voucher(voucher_number: &str) -> DbError {
    CoreError::duplicate("Sale", "voucher number", voucher_number).into()
}

// =============================================================================
// Unit Tests
// =============================================================================
