//! Expenses (`/expenses`).

use std::collections::BTreeMap;

use crate::api::{encode_segment, ApiClient};
use crate::error::{AdminError, AdminResult, FieldErrors};
use crate::models::{Expense, ExpenseType, ListQuery, Page};

pub fn validate_expense(expense: &Expense) -> AdminResult<()> {
    let mut errors = FieldErrors::new();
    if !expense.amount.is_finite() || expense.amount <= 0.0 {
        errors.insert("amount".into(), "Amount must be greater than zero".into());
    }
    if let Some(url) = expense.attachment_url.as_deref() {
        let url = url.trim();
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            errors.insert(
                "attachmentUrl".into(),
                "Attachment must be an http(s) link".into(),
            );
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AdminError::Validation(errors))
    }
}

/// Sum of amounts per expense type, for the expense page summary.
pub fn totals_by_type(expenses: &[Expense]) -> BTreeMap<ExpenseType, f64> {
    let mut totals = BTreeMap::new();
    for expense in expenses {
        *totals.entry(expense.expense_type).or_insert(0.0) += expense.amount;
    }
    totals
}

pub async fn list_expenses(api: &ApiClient, query: &ListQuery) -> AdminResult<Page<Expense>> {
    api.get("/expenses", &query.to_pairs()).await
}

pub async fn create_expense(api: &ApiClient, expense: &Expense) -> AdminResult<Expense> {
    validate_expense(expense)?;
    api.post("/expenses", expense).await
}

pub async fn update_expense(api: &ApiClient, expense: &Expense) -> AdminResult<Expense> {
    validate_expense(expense)?;
    api.put(&format!("/expenses/{}", encode_segment(&expense.id)), expense)
        .await
}

pub async fn delete_expense(api: &ApiClient, id: &str) -> AdminResult<()> {
    api.delete(&format!("/expenses/{}", encode_segment(id)))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expense(expense_type: ExpenseType, amount: f64) -> Expense {
        Expense {
            id: String::new(),
            expense_type,
            amount,
            date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
            description: None,
            attachment_url: None,
        }
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_expense(&expense(ExpenseType::Rent, 0.0)).is_err());
        assert!(validate_expense(&expense(ExpenseType::Rent, 10.0)).is_ok());
    }

    #[test]
    fn attachment_must_be_a_link() {
        let mut e = expense(ExpenseType::Utilities, 45.0);
        e.attachment_url = Some("C:\\bills\\power.pdf".into());
        let Err(AdminError::Validation(fields)) = validate_expense(&e) else {
            panic!("expected validation error");
        };
        assert!(fields.contains_key("attachmentUrl"));
    }

    #[test]
    fn groups_amounts_by_type() {
        let totals = totals_by_type(&[
            expense(ExpenseType::Salary, 100.0),
            expense(ExpenseType::Salary, 50.0),
            expense(ExpenseType::Other, 5.0),
        ]);
        assert_eq!(totals[&ExpenseType::Salary], 150.0);
        assert_eq!(totals[&ExpenseType::Other], 5.0);
        assert!(!totals.contains_key(&ExpenseType::Rent));
    }
}
