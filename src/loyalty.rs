//! Loyalty programs (`/restaurent/loyalty-programs`).
//!
//! A program awards `points_per_unit` points per currency unit spent and
//! redeems each point for `redemption_value` currency units once the
//! customer holds at least `min_redeem_points`.

use crate::api::{encode_segment, ApiClient};
use crate::error::{AdminError, AdminResult, FieldErrors};
use crate::models::{ListQuery, LoyaltyProgram, Page};

pub fn validate_program(program: &LoyaltyProgram) -> AdminResult<()> {
    let mut errors = FieldErrors::new();
    if program.name.trim().is_empty() {
        errors.insert("name".into(), "Program name is required".into());
    }
    if !program.points_per_unit.is_finite() || program.points_per_unit <= 0.0 {
        errors.insert(
            "pointsPerUnit".into(),
            "Points per unit must be greater than zero".into(),
        );
    }
    if !program.redemption_value.is_finite() || program.redemption_value <= 0.0 {
        errors.insert(
            "redemptionValue".into(),
            "Redemption value must be greater than zero".into(),
        );
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AdminError::Validation(errors))
    }
}

/// Whole points earned for an order of `amount`.
pub fn points_for(program: &LoyaltyProgram, amount: f64) -> u64 {
    if !program.is_active || amount <= 0.0 {
        return 0;
    }
    (amount * program.points_per_unit).floor() as u64
}

/// Currency value of redeeming `points`, or `None` below the minimum.
pub fn redemption_amount(program: &LoyaltyProgram, points: u64) -> Option<f64> {
    if !program.is_active || points < u64::from(program.min_redeem_points) || points == 0 {
        return None;
    }
    Some(points as f64 * program.redemption_value)
}

pub async fn list_programs(api: &ApiClient, query: &ListQuery) -> AdminResult<Page<LoyaltyProgram>> {
    api.get("/restaurent/loyalty-programs", &query.to_pairs())
        .await
}

pub async fn create_program(api: &ApiClient, program: &LoyaltyProgram) -> AdminResult<LoyaltyProgram> {
    validate_program(program)?;
    api.post("/restaurent/loyalty-programs", program).await
}

pub async fn update_program(api: &ApiClient, program: &LoyaltyProgram) -> AdminResult<LoyaltyProgram> {
    validate_program(program)?;
    api.put(
        &format!(
            "/restaurent/loyalty-programs/{}",
            encode_segment(&program.id)
        ),
        program,
    )
    .await
}

pub async fn delete_program(api: &ApiClient, id: &str) -> AdminResult<()> {
    api.delete(&format!(
        "/restaurent/loyalty-programs/{}",
        encode_segment(id)
    ))
    .await
}

// ===========================================================================
// Tests
// ===========================================================================
