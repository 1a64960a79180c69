use serde::Serialize;

use super::{finish, Outcome};
use crate::app::AdminApp;
use crate::loyalty;
use crate::models::{ListQuery, LoyaltyProgram, Page};
use crate::store::Action;

/// Points a customer would earn on one order under a program.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnPreview {
    pub program_id: String,
    pub program: String,
    pub points: u64,
    /// `None` while the points stay below the program's redemption minimum.
    pub redeemable_value: Option<f64>,
}

pub async fn load_programs(app: &AdminApp, query: &ListQuery) -> Outcome<Page<LoyaltyProgram>> {
    let result = loyalty::list_programs(&app.api, query).await;
    finish(app, result, |page| Action::LoyaltyProgramsLoaded(page.clone()))
}

pub async fn save_program(app: &AdminApp, program: &LoyaltyProgram) -> Outcome<LoyaltyProgram> {
    let result = if program.id.is_empty() {
        loyalty::create_program(&app.api, program).await
    } else {
        loyalty::update_program(&app.api, program).await
    };
    finish(app, result, |saved| Action::LoyaltyProgramSaved(saved.clone()))
}

pub async fn remove_program(app: &AdminApp, id: &str) -> Outcome<()> {
    let result = loyalty::delete_program(&app.api, id).await;
    finish(app, result, |_| Action::LoyaltyProgramRemoved(id.to_string()))
}

/// Earn preview for an order of `amount` across the loaded active programs.
pub fn preview(app: &AdminApp, amount: f64) -> Vec<EarnPreview> {
    app.read(|s| {
        s.loyalty_programs
            .items
            .iter()
            .filter(|p| p.is_active)
            .map(|p| {
                let points = loyalty::points_for(p, amount);
                EarnPreview {
                    program_id: p.id.clone(),
                    program: p.name.clone(),
                    points,
                    redeemable_value: loyalty::redemption_amount(p, points),
                }
            })
            .collect()
    })
}
