//! # Sale Repository
//!
//! Read side of the sale ledger. Writes (create / delete, with their stock
//! effects) live in [`crate::processor::SaleProcessor`].
//!
//! ## Storage Layout
//! ```text
//! sales                          sale_items
//! ┌──────────────────────┐       ┌──────────────────────────────────┐
//! │ id (PK)              │◄──────│ sale_id (FK, ON DELETE CASCADE)  │
//! │ voucher_number (UQ)  │   1:N │ line_no                          │
//! │ total_amount         │       │ product_id (no FK)               │
//! │ profit               │       │ quantity, sale_price, unit_cost  │
//! │ sold_at              │       └──────────────────────────────────┘
//! └──────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use shopkeep_core::{DateRange, Money, Sale, SaleLine, SaleView};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    voucher_number: String,
    total_amount: Money,
    profit: Money,
    sold_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    sale_id: String,
    product_id: String,
    quantity: i64,
    sale_price: Money,
    unit_cost: Money,
}

impl From<SaleItemRow> for SaleLine {
    fn from(row: SaleItemRow) -> Self {
        SaleLine {
            product: row.product_id,
            quantity: row.quantity,
            sale_price: row.sale_price,
            unit_cost: row.unit_cost,
        }
    }
}

const SELECT_SALE: &str = "SELECT id, voucher_number, total_amount, profit, sold_at FROM sales";

// =============================================================================
// Repository
// =============================================================================

/// Repository for reading the sale ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Every sale, newest first, with products expanded.
    pub async fn list(&self) -> DbResult<Vec<SaleView>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "{SELECT_SALE} ORDER BY sold_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed sales");
        let sales = self.attach_lines(rows).await?;
        self.expand(sales).await
    }

    /// Sales dated inside `range`, oldest first, with products expanded.
    pub async fn list_between(&self, range: DateRange) -> DbResult<Vec<SaleView>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "{SELECT_SALE} WHERE sold_at >= ?1 AND sold_at < ?2 ORDER BY sold_at, rowid"
        ))
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            count = rows.len(),
            start = %range.start,
            end = %range.end,
            "Listed sales in range"
        );
        let sales = self.attach_lines(rows).await?;
        self.expand(sales).await
    }

    /// Gets a sale by its ID, lines included, products not expanded.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.attach_lines(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Whether a sale with this exact voucher number exists.
    pub async fn voucher_exists(&self, voucher_number: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM sales WHERE voucher_number = ?1")
            .bind(voucher_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// `(count, Σ total_amount)` of sales dated inside `range`.
    pub async fn totals_between(&self, range: DateRange) -> DbResult<(i64, Money)> {
        let (count, total): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM sales
            WHERE sold_at >= ?1 AND sold_at < ?2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        Ok((count, Money::from_minor(total)))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Loads the lines of every given sale in one query, keeping line order.
    async fn attach_lines(&self, rows: Vec<SaleRow>) -> DbResult<Vec<Sale>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT sale_id, product_id, quantity, sale_price, unit_cost FROM sale_items WHERE sale_id IN (",
        );
        let mut separated = query.separated(", ");
        for row in &rows {
            separated.push_bind(row.id.as_str());
        }
        separated.push_unseparated(") ORDER BY sale_id, line_no");

        let items = query
            .build_query_as::<SaleItemRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut lines: HashMap<String, Vec<SaleLine>> = HashMap::new();
        for item in items {
            lines.entry(item.sale_id.clone()).or_default().push(item.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| Sale {
                products: lines.remove(&row.id).unwrap_or_default(),
                id: row.id,
                voucher_number: row.voucher_number,
                total_amount: row.total_amount,
                profit: row.profit,
                date: row.sold_at,
            })
            .collect())
    }

    /// Expands product references. Deleted products become `null`.
    async fn expand(&self, sales: Vec<Sale>) -> DbResult<Vec<SaleView>> {
        let mut ids: Vec<String> = sales
            .iter()
            .flat_map(|s| s.products.iter().map(|l| l.product.clone()))
            .collect();
        ids.sort();
        ids.dedup();

        let products = ProductRepository::new(self.pool.clone())
            .get_many(&ids)
            .await?;

        Ok(sales
            .into_iter()
            .map(|sale| SaleView::expand(sale, |id| products.get(id).cloned()))
            .collect())
    }
}
