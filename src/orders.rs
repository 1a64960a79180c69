//! Orders (`/restaurent/orders`).
//!
//! Order creation prices the cart with [`crate::totals`] before sending, so
//! the totals stored by the backend match what the operator saw.

use chrono::Utc;
use tracing::info;

use crate::api::{encode_segment, ApiClient};
use crate::error::{AdminError, AdminResult, FieldErrors};
use crate::models::{ListQuery, Order, OrderSource, Page, StatusUpdate};
use crate::order_status::{self, OrderStatus};
use crate::totals::Cart;
use crate::users::normalize_phone;

/// Validate an order draft and fill in the derived money fields.
pub fn prepare_draft(mut order: Order) -> AdminResult<Order> {
    let cart = Cart::from_order(&order);
    let mut errors = match cart.validate() {
        Ok(()) => FieldErrors::new(),
        Err(AdminError::Validation(fields)) => fields,
        Err(other) => return Err(other),
    };

    let phone = order
        .customer_phone
        .as_deref()
        .map(normalize_phone)
        .unwrap_or_default();
    if order.source == OrderSource::External && phone.is_empty() {
        errors.insert(
            "customerPhone".into(),
            "Customer phone is required for external orders".into(),
        );
    }
    if !errors.is_empty() {
        return Err(AdminError::Validation(errors));
    }

    for item in &mut order.items {
        item.subtotal = item.price * f64::from(item.quantity);
    }
    let totals = cart.totals();
    order.subtotal = Some(totals.subtotal);
    order.tax = Some(totals.tax);
    order.total = Some(totals.total);
    if !phone.is_empty() {
        order.customer_phone = Some(phone);
    }
    order.status = OrderStatus::Pending;
    order.created_at.get_or_insert_with(Utc::now);
    Ok(order)
}

pub async fn list_orders(api: &ApiClient, query: &ListQuery) -> AdminResult<Page<Order>> {
    api.get("/restaurent/orders", &query.to_pairs()).await
}

pub async fn get_order(api: &ApiClient, id: &str) -> AdminResult<Order> {
    api.get(&format!("/restaurent/orders/{}", encode_segment(id)), &[])
        .await
}

pub async fn create_order(api: &ApiClient, draft: Order) -> AdminResult<Order> {
    let order = prepare_draft(draft)?;
    let created: Order = api.post("/restaurent/orders", &order).await?;
    info!(order_id = %created.id, total = ?created.total, "order created");
    Ok(created)
}

/// Move `order` to `next`. The transition table is checked before sending.
pub async fn update_status(
    api: &ApiClient,
    order: &Order,
    next: OrderStatus,
    reason: Option<String>,
) -> AdminResult<Order> {
    order_status::apply(order.status, next)?;
    let path = format!("/restaurent/orders/{}/status", encode_segment(&order.id));
    let updated: Order = api
        .patch(&path, &StatusUpdate { status: next, reason })
        .await?;
    info!(order_id = %order.id, from = %order.status, to = %next, "order status updated");
    Ok(updated)
}


#[cfg(test)]
mod tests {
    use super::fixtures::order;
    use super::*;
    use crate::api::test_support::client;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn draft_gets_totals_and_normalized_phone() {
        let draft = prepare_draft(order("", OrderStatus::Delivered)).expect("valid draft");
        assert_eq!(draft.status, OrderStatus::Pending);
        assert_eq!(draft.customer_phone.as_deref(), Some("919876543210"));
        assert!((draft.total.unwrap() - 45.667).abs() < 1e-9);
        assert!((draft.tax.unwrap() - 3.697).abs() < 1e-9);
    }

    #[test]
    fn external_draft_requires_phone() {
        let mut o = order("", OrderStatus::Pending);
        o.source = OrderSource::External;
        o.customer_phone = Some("  ".into());
        let Err(AdminError::Validation(fields)) = prepare_draft(o) else {
            panic!("expected validation error");
        };
        assert!(fields.contains_key("customerPhone"));
    }

    #[tokio::test]
    async fn invalid_transition_never_reaches_the_server() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (api, _) = client(&server.uri(), Some("t"));
        let err = update_status(&api, &order("o1", OrderStatus::Pending), OrderStatus::Delivered, None)
            .await
            .expect_err("pending -> delivered");
        assert!(matches!(err, AdminError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn allowed_transition_is_sent() {
        let server = MockServer::start().await;
        let delivered = serde_json::to_value(order("o1", OrderStatus::Delivered)).unwrap();
        Mock::given(method("PATCH"))
            .and(path("/restaurent/orders/o1/status"))
            .and(body_partial_json(json!({ "status": "delivered" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "isSuccess": true, "data": delivered })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = client(&server.uri(), Some("t"));
        let updated = update_status(&api, &order("o1", OrderStatus::Ready), OrderStatus::Delivered, None)
            .await
            .expect("ready -> delivered");
        assert_eq!(updated.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn create_sends_computed_totals() {
        let server = MockServer::start().await;
        let created = serde_json::to_value(order("o42", OrderStatus::Pending)).unwrap();
        Mock::given(method("POST"))
            .and(path("/restaurent/orders"))
            .and(body_partial_json(json!({ "status": "pending", "customerPhone": "919876543210" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "isSuccess": true, "data": created })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = client(&server.uri(), Some("t"));
        let saved = create_order(&api, order("", OrderStatus::Pending))
            .await
            .expect("create");
        assert_eq!(saved.id, "o42");
    }
}
