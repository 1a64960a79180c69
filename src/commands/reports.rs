use chrono::NaiveDate;

use super::{respond, Outcome};
use crate::app::AdminApp;
use crate::models::{CustomerSales, ItemSales, ProfitLossReport};
use crate::reports::{self, ReportPeriod};

pub async fn profit_loss(app: &AdminApp, period: ReportPeriod) -> Outcome<ProfitLossReport> {
    respond(app, reports::profit_loss(&app.api, period).await)
}

/// Dashboard headline: profit/loss for the current month so far.
pub async fn dashboard(app: &AdminApp, today: NaiveDate) -> Outcome<ProfitLossReport> {
    profit_loss(app, ReportPeriod::month_to_date(today)).await
}

pub async fn item_wise(app: &AdminApp, period: ReportPeriod) -> Outcome<Vec<ItemSales>> {
    respond(app, reports::item_wise(&app.api, period).await)
}

pub async fn customer_wise(app: &AdminApp, period: ReportPeriod) -> Outcome<Vec<CustomerSales>> {
    respond(app, reports::customer_wise(&app.api, period).await)
}
