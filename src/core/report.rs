//! Sales reporting business logic.
//!
//! Builds the admin sales history: every purchased line joined with its order, product
//! and buyer, filtered to a calendar period. It reads `order_lines` rather than the
//! append-only `sales` audit table because only orders carry a tracking number and
//! status. Rendering is left to callers; the text helpers here produce one line per sale
//! for plain-text exports.

use crate::{
    core::order::load_line_details,
    entities::{Order, User, order, user},
    errors::Result,
};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Calendar window of a sales report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SalesPeriod {
    /// Today
    Day,
    /// The current ISO week, Monday to Sunday
    Week,
    /// The current calendar month
    Month,
    /// The current calendar year
    Year,
    /// No date filter
    #[default]
    All,
}

impl SalesPeriod {
    /// Parses a period filter. Spanish names are accepted too; anything unknown means
    /// [`SalesPeriod::All`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "day" | "today" | "dia" | "día" => Self::Day,
            "week" | "semana" => Self::Week,
            "month" | "mes" => Self::Month,
            "year" | "anio" | "año" => Self::Year,
            _ => Self::All,
        }
    }

    /// First day of the period and the first day after it, or `None` for
    /// [`SalesPeriod::All`].
    #[must_use]
    pub fn date_range(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = match self {
            Self::Day => today,
            Self::Week => today.checked_sub_days(Days::new(u64::from(
                today.weekday().num_days_from_monday(),
            )))?,
            Self::Month => today.with_day(1)?,
            Self::Year => today.with_ordinal(1)?,
            Self::All => return None,
        };
        let end = match self {
            Self::Day => start.checked_add_days(Days::new(1))?,
            Self::Week => start.checked_add_days(Days::new(7))?,
            Self::Month => start.checked_add_months(Months::new(1))?,
            Self::Year => start.checked_add_months(Months::new(12))?,
            Self::All => return None,
        };
        Some((start, end))
    }

    /// Like [`SalesPeriod::date_range`], as UTC instants from midnight to midnight.
    #[must_use]
    pub fn range(self, today: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.date_range(today).map(|(start, end)| {
            (
                start.and_time(NaiveTime::MIN).and_utc(),
                end.and_time(NaiveTime::MIN).and_utc(),
            )
        })
    }
}

/// One purchased line in the sales history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesHistoryRow {
    /// Order the line belongs to
    pub order_id: i64,
    /// Order tracking number
    pub tracking_number: String,
    /// When the order was placed
    pub placed_at: DateTime<Utc>,
    /// Current order status
    pub status: String,
    /// Buyer's full name
    pub customer_name: String,
    /// Buyer's email
    pub email: String,
    /// Purchased product
    pub product_id: i64,
    /// Product name, empty if the product row is gone
    pub product_name: String,
    /// Units purchased
    pub quantity: i32,
    /// Price per unit at checkout
    pub unit_price: f64,
    /// `quantity * unit_price`
    pub subtotal: f64,
}

/// Totals over a set of sales rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SalesSummary {
    /// Distinct orders
    pub orders: usize,
    /// Units sold
    pub units: i64,
    /// Sum of subtotals
    pub revenue: f64,
}

/// Loads the sales history of `period`, newest order first.
///
/// `today` anchors the period so reports are reproducible.
#[instrument(skip(db))]
pub async fn sales_history(
    db: &DatabaseConnection,
    period: SalesPeriod,
    today: NaiveDate,
) -> Result<Vec<SalesHistoryRow>> {
    let mut query = Order::find();
    if let Some((start, end)) = period.range(today) {
        query = query
            .filter(order::Column::PlacedAt.gte(start))
            .filter(order::Column::PlacedAt.lt(end));
    }
    let orders = query
        .order_by_desc(order::Column::PlacedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;

    let user_ids: Vec<i64> = orders.iter().map(|o| o.user_id).collect();
    let users: HashMap<i64, user::Model> = User::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let mut lines = load_line_details(db, &orders).await?;

    let mut rows = Vec::new();
    for order in orders {
        let (customer_name, email) = users
            .get(&order.user_id)
            .map(|u| (format!("{} {}", u.first_name, u.last_name), u.email.clone()))
            .unwrap_or_default();
        for line in lines.remove(&order.id).unwrap_or_default() {
            rows.push(SalesHistoryRow {
                order_id: order.id,
                tracking_number: order.tracking_number.clone(),
                placed_at: order.placed_at,
                status: order.status.clone(),
                customer_name: customer_name.clone(),
                email: email.clone(),
                product_id: line.product_id,
                product_name: line.product_name,
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal: line.subtotal,
            });
        }
    }

    debug!("Sales history for {:?}: {} rows", period, rows.len());
    Ok(rows)
}

/// Totals units and revenue over `rows`.
#[must_use]
pub fn summarize_sales(rows: &[SalesHistoryRow]) -> SalesSummary {
    let mut order_ids: Vec<i64> = rows.iter().map(|r| r.order_id).collect();
    order_ids.sort_unstable();
    order_ids.dedup();

    SalesSummary {
        orders: order_ids.len(),
        units: rows.iter().map(|r| i64::from(r.quantity)).sum(),
        revenue: rows.iter().map(|r| r.subtotal).sum(),
    }
}

/// Formats a money amount with two decimals.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${amount:.2}")
    }
}

/// Formats a sales row as a single text line.
#[must_use]
pub fn format_sales_row(row: &SalesHistoryRow) -> String {
    format!(
        "{} | {} | {} | {} x{} @ {} = {}",
        row.placed_at.format("%Y-%m-%d"),
        row.tracking_number,
        row.customer_name,
        row.product_name,
        row.quantity,
        format_currency(row.unit_price),
        format_currency(row.subtotal)
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::checkout::{CheckoutOptions, place_order};
    use crate::entities::Sale;
    use crate::test_utils::*;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(SalesPeriod::parse("day"), SalesPeriod::Day);
        assert_eq!(SalesPeriod::parse("Semana"), SalesPeriod::Week);
        assert_eq!(SalesPeriod::parse("mes"), SalesPeriod::Month);
        assert_eq!(SalesPeriod::parse(" year "), SalesPeriod::Year);
        assert_eq!(SalesPeriod::parse("anio"), SalesPeriod::Year);
        assert_eq!(SalesPeriod::parse("fortnight"), SalesPeriod::All);
        assert_eq!(SalesPeriod::parse(""), SalesPeriod::All);
    }

    #[test]
    fn test_period_ranges() {
        // 2025-05-15 is a Thursday
        let today = date(2025, 5, 15);
        assert_eq!(
            SalesPeriod::Day.date_range(today),
            Some((today, date(2025, 5, 16)))
        );
        assert_eq!(
            SalesPeriod::Week.date_range(today),
            Some((date(2025, 5, 12), date(2025, 5, 19)))
        );
        assert_eq!(
            SalesPeriod::Month.date_range(today),
            Some((date(2025, 5, 1), date(2025, 6, 1)))
        );
        assert_eq!(
            SalesPeriod::Year.date_range(today),
            Some((date(2025, 1, 1), date(2026, 1, 1)))
        );
        assert_eq!(SalesPeriod::All.date_range(today), None);

        assert_eq!(
            SalesPeriod::Month.date_range(date(2024, 12, 31)),
            Some((date(2024, 12, 1), date(2025, 1, 1)))
        );
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_currency(20.0), "$20.00");
        assert_eq!(format_currency(-3.5), "-$3.50");

        let row = SalesHistoryRow {
            order_id: 1,
            tracking_number: "S01".to_string(),
            placed_at: Utc.with_ymd_and_hms(2025, 5, 15, 10, 0, 0).unwrap(),
            status: "pending".to_string(),
            customer_name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            product_id: 7,
            product_name: "Straw Hat".to_string(),
            quantity: 2,
            unit_price: 10.0,
            subtotal: 20.0,
        };
        assert_eq!(
            format_sales_row(&row),
            "2025-05-15 | S01 | Test User | Straw Hat x2 @ $10.00 = $20.00"
        );
    }

    #[tokio::test]
    async fn test_sales_history_filters_by_period() -> Result<()> {
        let (db, user, product) = setup_with_product().await?;
        let old = CheckoutOptions {
            payment_method: "PayPal".to_string(),
            placed_at: Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap(),
        };
        let recent = CheckoutOptions {
            payment_method: "PayPal".to_string(),
            placed_at: Utc.with_ymd_and_hms(2025, 5, 14, 12, 0, 0).unwrap(),
        };
        place_order(&db, user.id, &[cart_line(&product, 1)], &old).await?;
        place_order(&db, user.id, &[cart_line(&product, 2)], &recent).await?;

        let today = date(2025, 5, 15);
        let all = sales_history(&db, SalesPeriod::All, today).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].tracking_number, "S02");
        assert_eq!(all[0].customer_name, "Test User");
        assert_eq!(all[0].subtotal, product.price * 2.0);

        let week = sales_history(&db, SalesPeriod::Week, today).await?;
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].quantity, 2);

        assert!(sales_history(&db, SalesPeriod::Day, today).await?.is_empty());
        assert_eq!(sales_history(&db, SalesPeriod::Year, today).await?.len(), 2);

        let summary = summarize_sales(&all);
        assert_eq!(summary.orders, 2);
        assert_eq!(summary.units, 3);
        assert_eq!(summary.revenue, product.price * 3.0);

        // The audit ledger agrees with the report built from order lines
        let ledger = Sale::find().all(&db).await?;
        let ledger_units: i64 = ledger.iter().map(|s| i64::from(s.quantity)).sum();
        let ledger_revenue: f64 = ledger
            .iter()
            .map(|s| s.unit_price * f64::from(s.quantity))
            .sum();
        assert_eq!(ledger_units, summary.units);
        assert_eq!(ledger_revenue, summary.revenue);

        Ok(())
    }
}
