//! # Report Module
//!
//! Date ranges and summaries for monthly reports and the dashboard.
//!
//! ## Month Boundaries
//! ```text
//!   month_range(2025, 1)
//!
//!   2025-01-01T00:00:00Z                     2025-02-01T00:00:00Z
//!   [────────────── January ─────────────────)
//!   ▲ included                               ▲ excluded
//!
//!   A sale at 2025-01-31T23:59:59.999Z is in January.
//!   A sale at 2025-02-01T00:00:00Z is in February.
//! ```
//!
//! All boundaries are UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::SaleView;
use crate::validation;

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The calendar month `month` (1-based) of `year`.
///
/// ## Example
/// ```rust
/// use shopkeep_core::report::month_range;
///
/// let range = month_range(2024, 12).unwrap();
/// assert_eq!(range.start.to_rfc3339(), "2024-12-01T00:00:00+00:00");
/// assert_eq!(range.end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
/// assert!(month_range(2024, 13).is_err());
/// ```
pub fn month_range(year: i32, month: u32) -> CoreResult<DateRange> {
    validation::validate_month(month)?;

    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1), 1)
    } else {
        (Some(year), month + 1)
    };

    let start = first_instant(year, month);
    let end = next_year.and_then(|y| first_instant(y, next_month));
    match (start, end) {
        (Some(start), Some(end)) => Ok(DateRange { start, end }),
        _ => Err(ValidationError::InvalidFormat {
            field: "year".to_string(),
            reason: format!("{year} is outside the supported calendar"),
        }
        .into()),
    }
}

/// The UTC day containing `at`.
pub fn day_range(at: DateTime<Utc>) -> DateRange {
    let start = at
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or(at);
    DateRange {
        start,
        end: start + Duration::days(1),
    }
}

/// The UTC calendar month containing `at`.
pub fn current_month_range(at: DateTime<Utc>) -> CoreResult<DateRange> {
    month_range(at.year(), at.month())
}

fn first_instant(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// =============================================================================
// Summaries
// =============================================================================

/// Totals for a set of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MonthlySummary {
    /// Σ totalAmount.
    #[ts(type = "number")]
    pub total_sales: Money,
    /// Σ profit.
    #[ts(type = "number")]
    pub total_profit: Money,
    #[ts(type = "number")]
    pub number_of_sales: i64,
}

impl MonthlySummary {
    /// Sums a month's sales. An empty slice yields all zeros.
    pub fn from_sales(sales: &[SaleView]) -> Self {
        MonthlySummary {
            total_sales: sales.iter().map(|s| s.total_amount).sum(),
            total_profit: sales.iter().map(|s| s.profit).sum(),
            number_of_sales: sales.len() as i64,
        }
    }
}

/// Response of `GET /api/sales/monthly/:year/:month`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyReport {
    /// Sales in the month, oldest first.
    pub sales: Vec<SaleView>,
    pub summary: MonthlySummary,
}

impl MonthlyReport {
    pub fn new(sales: Vec<SaleView>) -> Self {
        let summary = MonthlySummary::from_sales(&sales);
        MonthlyReport { sales, summary }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn within(range: &DateRange, at: DateTime<Utc>) -> bool {
        range.start <= at && at < range.end
    }

    fn sale(total: i64, profit: i64) -> SaleView {
        SaleView {
            id: uuid::Uuid::new_v4().to_string(),
            voucher_number: "V".to_string(),
            products: vec![],
            total_amount: Money::from_minor(total),
            profit: Money::from_minor(profit),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_month_range_boundaries() {
        let jan = month_range(2025, 1).unwrap();
        let last_instant = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap()
            + Duration::milliseconds(999);
        let first_of_feb = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        assert!(within(&jan, jan.start));
        assert!(within(&jan, last_instant));
        assert!(!within(&jan, first_of_feb));

        let feb = month_range(2025, 2).unwrap();
        assert!(within(&feb, first_of_feb));
        assert!(!within(&feb, last_instant));
    }

    #[test]
    fn test_month_range_leap_february() {
        let feb = month_range(2024, 2).unwrap();
        assert!(within(&feb, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()));
        assert_eq!(feb.end, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_month_range_rejects_bad_input() {
        assert!(month_range(2025, 0).is_err());
        assert!(month_range(2025, 13).is_err());
        assert!(month_range(i32::MAX, 12).is_err());
    }

    #[test]
    fn test_day_range() {
        let at = Utc.with_ymd_and_hms(2025, 6, 15, 18, 30, 0).unwrap();
        let day = day_range(at);
        assert_eq!(day.start, Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap());
        assert_eq!(day.end, Utc.with_ymd_and_hms(2025, 6, 16, 0, 0, 0).unwrap());
        assert!(within(&day, at));
    }

    #[test]
    fn test_summary_of_empty_month_is_zero() {
        let report = MonthlyReport::new(vec![]);
        assert_eq!(report.summary, MonthlySummary::default());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sales": [],
                "summary": { "totalSales": 0, "totalProfit": 0, "numberOfSales": 0 }
            })
        );
    }

    #[test]
    fn test_summary_sums_totals() {
        let summary = MonthlySummary::from_sales(&[sale(150_000, 45_000), sale(20_000, -1_000)]);
        assert_eq!(summary.total_sales, Money::from_minor(170_000));
        assert_eq!(summary.total_profit, Money::from_minor(44_000));
        assert_eq!(summary.number_of_sales, 2);
    }
}
