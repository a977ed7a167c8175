//! # Report Repository
//!
//! Read-only aggregates over the sale ledger: the monthly report and the
//! dashboard headline numbers. Nothing here takes a lock; a report running
//! next to a committing sale sees it either whole or not at all.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::supplier::SupplierRepository;
use shopkeep_core::report::{current_month_range, day_range, month_range};
use shopkeep_core::{DashboardStats, MonthlyReport};

/// Repository for reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales dated in `month` of `year` (UTC), oldest first, with totals.
    ///
    /// A month without sales is an empty report, not an error.
    pub async fn monthly(&self, year: i32, month: u32) -> DbResult<MonthlyReport> {
        let range = month_range(year, month)?;
        let sales = SaleRepository::new(self.pool.clone())
            .list_between(range)
            .await?;

        let report = MonthlyReport::new(sales);
        debug!(
            year,
            month,
            number_of_sales = report.summary.number_of_sales,
            total_sales = %report.summary.total_sales,
            "Built monthly report"
        );
        Ok(report)
    }

    /// Dashboard numbers as of `now`.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> DbResult<DashboardStats> {
        let sales = SaleRepository::new(self.pool.clone());

        let total_products = ProductRepository::new(self.pool.clone()).count().await?;
        let (_, today_sales) = sales.totals_between(day_range(now)).await?;
        let (monthly_orders, _) = sales.totals_between(current_month_range(now)?).await?;
        let active_suppliers = SupplierRepository::new(self.pool.clone()).count().await?;

        Ok(DashboardStats {
            total_products,
            today_sales,
            monthly_orders,
            active_suppliers,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use shopkeep_core::{
        Category, CoreError, DraftLine, Money, NewProduct, NewSupplier, Product, SaleDraft,
        ValidationError,
    };

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .create(NewProduct {
                product_code: "A001".to_string(),
                name: "PX3 CHINA 30 BORE".to_string(),
                quantity: 100,
                cost_price: Money::from_minor(35_000),
                category: Category::Pistol,
                supplier: None,
            })
            .await
            .unwrap();
        (db, product)
    }

    async fn sell_at(db: &Database, product: &Product, voucher: &str, qty: i64, at: DateTime<Utc>) {
        db.processor()
            .create_sale(SaleDraft {
                voucher_number: voucher.to_string(),
                products: vec![DraftLine {
                    product: product.id.clone(),
                    quantity: qty,
                    sale_price: Money::from_minor(50_000),
                }],
                date: Some(at),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_month_is_zero_report() {
        let (db, _) = setup().await;
        let report = db.reports().monthly(2024, 6).await.unwrap();

        assert!(report.sales.is_empty());
        assert_eq!(report.summary.total_sales, Money::zero());
        assert_eq!(report.summary.total_profit, Money::zero());
        assert_eq!(report.summary.number_of_sales, 0);
    }

    #[tokio::test]
    async fn test_month_boundaries() {
        let (db, p) = setup().await;
        let feb = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let last_of_jan = feb - Duration::milliseconds(1);

        sell_at(&db, &p, "JAN-LAST", 1, last_of_jan).await;
        sell_at(&db, &p, "FEB-FIRST", 2, feb).await;
        sell_at(&db, &p, "JAN-FIRST", 1, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()).await;

        let jan = db.reports().monthly(2024, 1).await.unwrap();
        let vouchers: Vec<_> = jan.sales.iter().map(|s| s.voucher_number.as_str()).collect();
        assert_eq!(vouchers, ["JAN-FIRST", "JAN-LAST"]);
        assert_eq!(jan.summary.number_of_sales, 2);
        assert_eq!(jan.summary.total_sales, Money::from_minor(100_000));
        assert_eq!(jan.summary.total_profit, Money::from_minor(30_000));

        let feb_report = db.reports().monthly(2024, 2).await.unwrap();
        assert_eq!(feb_report.sales.len(), 1);
        assert_eq!(feb_report.sales[0].voucher_number, "FEB-FIRST");
        assert!(feb_report.sales[0].products[0].product.is_some());
    }

    #[tokio::test]
    async fn test_december_rolls_into_next_year() {
        let (db, p) = setup().await;
        sell_at(&db, &p, "NYE", 1, Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()).await;

        assert_eq!(db.reports().monthly(2024, 12).await.unwrap().sales.len(), 1);
        assert!(db.reports().monthly(2025, 1).await.unwrap().sales.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_month_is_validation_error() {
        let (db, _) = setup().await;
        let err = db.reports().monthly(2024, 13).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let (db, p) = setup().await;
        db.suppliers()
            .create(NewSupplier {
                name: "ABC Arms Supplier".to_string(),
                contact: "03001234567".to_string(),
                address: None,
                payment_terms: None,
            })
            .await
            .unwrap();

        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        sell_at(&db, &p, "TODAY-1", 1, now - Duration::hours(2)).await;
        sell_at(&db, &p, "TODAY-2", 2, now).await;
        sell_at(&db, &p, "EARLIER", 1, Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap()).await;
        sell_at(&db, &p, "LAST-MONTH", 1, Utc.with_ymd_and_hms(2024, 2, 20, 9, 0, 0).unwrap()).await;

        let stats = db.reports().dashboard(now).await.unwrap();
        assert_eq!(stats.total_products, 1);
        assert_eq!(stats.today_sales, Money::from_minor(150_000));
        assert_eq!(stats.monthly_orders, 3);
        assert_eq!(stats.active_suppliers, 1);
    }
}
