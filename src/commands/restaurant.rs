use super::{finish, Outcome};
use crate::app::AdminApp;
use crate::models::{ListQuery, Page, Restaurant, Table};
use crate::restaurant;
use crate::store::Action;

pub async fn load_profile(app: &AdminApp) -> Outcome<Restaurant> {
    let result = restaurant::get_profile(&app.api).await;
    finish(app, result, |profile| Action::RestaurantLoaded(profile.clone()))
}

pub async fn save_profile(app: &AdminApp, profile: &Restaurant) -> Outcome<Restaurant> {
    let result = restaurant::update_profile(&app.api, profile).await;
    finish(app, result, |saved| Action::RestaurantLoaded(saved.clone()))
}

pub async fn load_tables(app: &AdminApp, query: &ListQuery) -> Outcome<Page<Table>> {
    let result = restaurant::list_tables(&app.api, query).await;
    finish(app, result, |page| Action::TablesLoaded(page.clone()))
}

pub async fn save_table(app: &AdminApp, table: &Table) -> Outcome<Table> {
    let result = if table.id.is_empty() {
        restaurant::create_table(&app.api, table).await
    } else {
        restaurant::update_table(&app.api, table).await
    };
    finish(app, result, |saved| Action::TableSaved(saved.clone()))
}

pub async fn remove_table(app: &AdminApp, id: &str) -> Outcome<()> {
    let result = restaurant::delete_table(&app.api, id).await;
    finish(app, result, |_| Action::TableRemoved(id.to_string()))
}

/// Tables that have a QR code link, for the QR codes page.
pub fn qr_codes(app: &AdminApp) -> Vec<(String, String)> {
    app.read(|s| {
        s.tables
            .items
            .iter()
            .filter(|t| t.is_active)
            .filter_map(|t| Some((t.name.clone(), t.qr_code_url.clone()?)))
            .collect()
    })
}
