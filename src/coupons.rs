//! Coupons (`/restaurent/coupons`).

use crate::api::{encode_segment, ApiClient};
use crate::error::{AdminError, AdminResult, FieldErrors};
use crate::models::{Coupon, DiscountType, ListQuery, Page};

/// Coupon codes are matched case-insensitively by the backend; send them
/// upper-cased without surrounding whitespace.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn validate_coupon(coupon: &Coupon) -> AdminResult<()> {
    let mut errors = FieldErrors::new();
    let code = normalize_code(&coupon.code);
    if code.is_empty() {
        errors.insert("code".into(), "Coupon code is required".into());
    } else if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        errors.insert(
            "code".into(),
            "Use letters, digits, '-' or '_' only".into(),
        );
    }
    if !coupon.discount.is_finite() || coupon.discount <= 0.0 {
        errors.insert("discount".into(), "Discount must be greater than zero".into());
    } else if coupon.discount_type == DiscountType::Percentage && coupon.discount > 100.0 {
        errors.insert(
            "discount".into(),
            "Percentage discount cannot exceed 100".into(),
        );
    }
    if let (Some(from), Some(until)) = (coupon.valid_from, coupon.valid_until) {
        if until <= from {
            errors.insert(
                "validUntil".into(),
                "End date must be after the start date".into(),
            );
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AdminError::Validation(errors))
    }
}

fn normalized(coupon: &Coupon) -> Coupon {
    Coupon {
        code: normalize_code(&coupon.code),
        ..coupon.clone()
    }
}

pub async fn list_coupons(api: &ApiClient, query: &ListQuery) -> AdminResult<Page<Coupon>> {
    api.get("/restaurent/coupons", &query.to_pairs()).await
}

pub async fn get_coupon(api: &ApiClient, id: &str) -> AdminResult<Coupon> {
    api.get(&format!("/restaurent/coupons/{}", encode_segment(id)), &[])
        .await
}

pub async fn create_coupon(api: &ApiClient, coupon: &Coupon) -> AdminResult<Coupon> {
    validate_coupon(coupon)?;
    api.post("/restaurent/coupons", &normalized(coupon)).await
}

pub async fn update_coupon(api: &ApiClient, coupon: &Coupon) -> AdminResult<Coupon> {
    validate_coupon(coupon)?;
    api.put(
        &format!("/restaurent/coupons/{}", encode_segment(&coupon.id)),
        &normalized(coupon),
    )
    .await
}

pub async fn delete_coupon(api: &ApiClient, id: &str) -> AdminResult<()> {
    api.delete(&format!("/restaurent/coupons/{}", encode_segment(id)))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coupon(code: &str, discount: f64, discount_type: DiscountType) -> Coupon {
        Coupon {
            id: String::new(),
            code: code.into(),
            description: None,
            discount,
            discount_type,
            min_order_amount: None,
            max_discount: None,
            valid_from: None,
            valid_until: None,
            usage_limit: None,
            is_active: true,
        }
    }

    #[test]
    fn validation_rules() {
        assert!(validate_coupon(&coupon("SAVE10", 10.0, DiscountType::Percentage)).is_ok());
        assert!(validate_coupon(&coupon("", 10.0, DiscountType::Fixed)).is_err());
        assert!(validate_coupon(&coupon("SAVE 10", 10.0, DiscountType::Fixed)).is_err());
        assert!(validate_coupon(&coupon("BIG", 150.0, DiscountType::Percentage)).is_err());

        let mut window = coupon("WINDOW", 5.0, DiscountType::Fixed);
        let now = Utc::now();
        window.valid_from = Some(now);
        window.valid_until = Some(now - Duration::hours(1));
        assert!(validate_coupon(&window).is_err());
    }

    #[tokio::test]
    async fn create_sends_upper_cased_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/restaurent/coupons"))
            .and(body_partial_json(json!({ "code": "WELCOME5" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": { "_id": "cp1", "code": "WELCOME5", "discount": 5.0 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = client(&server.uri(), Some("t"));
        let saved = create_coupon(&api, &coupon(" welcome5 ", 5.0, DiscountType::Fixed))
            .await
            .expect("create");
        assert_eq!(saved.id, "cp1");
        assert_eq!(saved.discount_type, DiscountType::Fixed);
    }
}
