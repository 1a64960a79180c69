//! Restaurant profile and tables (`/restaurent/*`).

use crate::api::{encode_segment, ApiClient};
use crate::error::{AdminError, AdminResult, FieldErrors};
use crate::models::{ListQuery, Page, Restaurant, Table};

pub fn validate_profile(profile: &Restaurant) -> AdminResult<()> {
    let mut errors = FieldErrors::new();
    if profile.name.trim().is_empty() {
        errors.insert("name".into(), "Restaurant name is required".into());
    }
    if let Some(email) = profile.email.as_deref().map(str::trim) {
        if !email.is_empty() && !email.contains('@') {
            errors.insert("email".into(), "Enter a valid email address".into());
        }
    }
    if profile
        .tax_rate
        .is_some_and(|rate| !rate.is_finite() || rate < 0.0)
    {
        errors.insert("taxRate".into(), "Tax rate must be zero or more".into());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AdminError::Validation(errors))
    }
}

pub fn validate_table(table: &Table) -> AdminResult<()> {
    let mut errors = FieldErrors::new();
    if table.name.trim().is_empty() {
        errors.insert("name".into(), "Table name is required".into());
    }
    if table.capacity == 0 {
        errors.insert("capacity".into(), "Capacity must be at least 1".into());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AdminError::Validation(errors))
    }
}

pub async fn get_profile(api: &ApiClient) -> AdminResult<Restaurant> {
    api.get("/restaurent/profile", &[]).await
}

pub async fn update_profile(api: &ApiClient, profile: &Restaurant) -> AdminResult<Restaurant> {
    validate_profile(profile)?;
    api.put("/restaurent/profile", profile).await
}

pub async fn list_tables(api: &ApiClient, query: &ListQuery) -> AdminResult<Page<Table>> {
    api.get("/restaurent/tables", &query.to_pairs()).await
}

pub async fn create_table(api: &ApiClient, table: &Table) -> AdminResult<Table> {
    validate_table(table)?;
    api.post("/restaurent/tables", table).await
}

pub async fn update_table(api: &ApiClient, table: &Table) -> AdminResult<Table> {
    validate_table(table)?;
    api.put(
        &format!("/restaurent/tables/{}", encode_segment(&table.id)),
        table,
    )
    .await
}

pub async fn delete_table(api: &ApiClient, id: &str) -> AdminResult<()> {
    api.delete(&format!("/restaurent/tables/{}", encode_segment(id)))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client;
    use crate::models::SocialLinks;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile() -> Restaurant {
        Restaurant {
            id: "r1".into(),
            name: "Spice Route".into(),
            address: Some("12 MG Road".into()),
            phone: None,
            email: Some("hello@spiceroute.example".into()),
            opening_hours: vec![],
            payment_methods: vec!["cash".into(), "card".into()],
            social_links: SocialLinks::default(),
            tax_rate: Some(0.05),
            currency: Some("INR".into()),
        }
    }

    #[test]
    fn profile_validation() {
        assert!(validate_profile(&profile()).is_ok());
        let mut bad = profile();
        bad.name = " ".into();
        bad.email = Some("not-an-email".into());
        bad.tax_rate = Some(-1.0);
        let Err(AdminError::Validation(fields)) = validate_profile(&bad) else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn table_needs_name_and_capacity() {
        let table = Table {
            id: String::new(),
            name: "".into(),
            capacity: 0,
            is_active: true,
            qr_code_url: None,
        };
        let Err(AdminError::Validation(fields)) = validate_table(&table) else {
            panic!("expected validation error");
        };
        assert!(fields.contains_key("name") && fields.contains_key("capacity"));
    }

    #[tokio::test]
    async fn fetches_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restaurent/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": {
                    "_id": "r1",
                    "name": "Spice Route",
                    "openingHours": [{ "day": "monday", "open": "09:00", "close": "22:00" }],
                    "socialLinks": { "instagram": "@spiceroute" }
                }
            })))
            .mount(&server)
            .await;

        let (api, _) = client(&server.uri(), Some("t"));
        let restaurant = get_profile(&api).await.expect("profile");
        assert_eq!(restaurant.opening_hours.len(), 1);
        assert!(!restaurant.opening_hours[0].closed);
        assert_eq!(
            restaurant.social_links.instagram.as_deref(),
            Some("@spiceroute")
        );
    }
}
