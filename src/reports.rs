//! Profit/loss and sales analytics (`/reports/profit-loss*`).

use chrono::{Datelike, Duration, NaiveDate};
use tracing::warn;

use crate::api::ApiClient;
use crate::error::{AdminError, AdminResult};
use crate::models::{CustomerSales, ItemSales, ProfitLossReport};

/// Longest period a single report request may cover.
const MAX_REPORT_DAYS: i64 = 366;

/// Inclusive date range of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportPeriod {
    pub fn new(from: NaiveDate, to: NaiveDate) -> AdminResult<Self> {
        if to < from {
            return Err(AdminError::field("to", "End date must not be before start date"));
        }
        if (to - from).num_days() >= MAX_REPORT_DAYS {
            return Err(AdminError::field(
                "to",
                format!("Reports can cover at most {MAX_REPORT_DAYS} days"),
            ));
        }
        Ok(Self { from, to })
    }

    /// From the first day of `today`'s month through `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        let from = today.with_day(1).unwrap_or(today);
        Self { from, to: today }
    }

    /// The `days` days ending with `today`.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            from: today - Duration::days(span),
            to: today,
        }
    }

    fn to_pairs(self) -> Vec<(&'static str, String)> {
        vec![
            ("from", self.from.format("%Y-%m-%d").to_string()),
            ("to", self.to.format("%Y-%m-%d").to_string()),
        ]
    }
}

pub async fn profit_loss(api: &ApiClient, period: ReportPeriod) -> AdminResult<ProfitLossReport> {
    let report: ProfitLossReport = api.get("/reports/profit-loss", &period.to_pairs()).await?;
    if !report.is_consistent() {
        warn!(
            revenue = report.revenue,
            total_expenses = report.total_expenses,
            net_profit = report.net_profit,
            "profit/loss report does not add up"
        );
    }
    Ok(report)
}

pub async fn item_wise(api: &ApiClient, period: ReportPeriod) -> AdminResult<Vec<ItemSales>> {
    api.get("/reports/profit-loss/item-wise", &period.to_pairs())
        .await
}

pub async fn customer_wise(api: &ApiClient, period: ReportPeriod) -> AdminResult<Vec<CustomerSales>> {
    api.get("/reports/profit-loss/customer-wise", &period.to_pairs())
        .await
}

/// Net margin as a percentage of revenue; `None` when there was no revenue.
pub fn margin_percent(report: &ProfitLossReport) -> Option<f64> {
    if report.revenue <= 0.0 {
        return None;
    }
    Some(report.net_profit / report.revenue * 100.0)
}
