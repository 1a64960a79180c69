use std::collections::BTreeMap;

use super::{finish, Outcome};
use crate::app::AdminApp;
use crate::expenses;
use crate::models::{Expense, ExpenseType, ListQuery, Page};
use crate::store::Action;

pub async fn load_expenses(app: &AdminApp, query: &ListQuery) -> Outcome<Page<Expense>> {
    let result = expenses::list_expenses(&app.api, query).await;
    finish(app, result, |page| Action::ExpensesLoaded(page.clone()))
}

pub async fn save_expense(app: &AdminApp, expense: &Expense) -> Outcome<Expense> {
    let result = if expense.id.is_empty() {
        expenses::create_expense(&app.api, expense).await
    } else {
        expenses::update_expense(&app.api, expense).await
    };
    finish(app, result, |saved| Action::ExpenseSaved(saved.clone()))
}

pub async fn remove_expense(app: &AdminApp, id: &str) -> Outcome<()> {
    let result = expenses::delete_expense(&app.api, id).await;
    finish(app, result, |_| Action::ExpenseRemoved(id.to_string()))
}

/// Per-type totals of the loaded page.
pub fn summary(app: &AdminApp) -> BTreeMap<ExpenseType, f64> {
    app.read(|s| expenses::totals_by_type(&s.expenses.items))
}
