use chrono::Utc;

use super::{fail, finish, respond, Outcome};
use crate::app::AdminApp;
use crate::coupons::normalize_code;
use crate::error::{AdminError, AdminResult};
use crate::models::{Coupon, ListQuery, Order, Page};
use crate::order_status::OrderStatus;
use crate::orders;
use crate::store::Action;
use crate::totals::{coupon_discount, Cart, OrderTotals};

pub async fn load_orders(app: &AdminApp, query: &ListQuery) -> Outcome<Page<Order>> {
    let result = orders::list_orders(&app.api, query).await;
    finish(app, result, |page| Action::OrdersLoaded(page.clone()))
}

pub async fn open_order(app: &AdminApp, id: &str) -> Outcome<Order> {
    let result = orders::get_order(&app.api, id).await;
    finish(app, result, |order| Action::OrderLoaded(order.clone()))
}

/// Create an order. A `couponCode` on the draft is resolved against the
/// loaded coupons and becomes the order's discount, priced the same way as
/// [`quote`].
pub async fn create_order(app: &AdminApp, mut draft: Order) -> Outcome<Order> {
    if let Err(e) = apply_coupon(app, &mut draft) {
        return fail(app, e);
    }
    let result = orders::create_order(&app.api, draft).await;
    finish(app, result, |order| Action::OrderSaved(order.clone()))
}

/// Move an order to `next`, using the copy already in the store when there is one.
pub async fn change_status(
    app: &AdminApp,
    order_id: &str,
    next: OrderStatus,
    reason: Option<String>,
) -> Outcome<Order> {
    let known = app.read(|s| {
        s.current_order
            .as_ref()
            .filter(|o| o.id == order_id)
            .or_else(|| s.orders.get(order_id))
            .cloned()
    });
    let order = match known {
        Some(order) => order,
        None => match orders::get_order(&app.api, order_id).await {
            Ok(order) => order,
            Err(e) => return fail(app, e),
        },
    };
    let result = orders::update_status(&app.api, &order, next, reason).await;
    finish(app, result, |updated| Action::OrderSaved(updated.clone()))
}

/// Totals for a cart, optionally with a coupon from the loaded coupon list.
pub fn quote(app: &AdminApp, cart: &Cart, coupon_code: Option<&str>) -> Outcome<OrderTotals> {
    respond(app, priced(app, cart, coupon_code))
}

fn priced(app: &AdminApp, cart: &Cart, coupon_code: Option<&str>) -> AdminResult<OrderTotals> {
    cart.validate()?;
    let Some(code) = coupon_code.map(normalize_code).filter(|c| !c.is_empty()) else {
        return Ok(cart.totals());
    };
    let discount = coupon_discount(&loaded_coupon(app, &code)?, cart.totals().subtotal, Utc::now())?;
    let with_coupon = Cart {
        discount: Some(discount),
        ..cart.clone()
    };
    Ok(with_coupon.totals())
}

fn apply_coupon(app: &AdminApp, draft: &mut Order) -> AdminResult<()> {
    let Some(code) = draft
        .coupon_code
        .as_deref()
        .map(normalize_code)
        .filter(|c| !c.is_empty())
    else {
        draft.coupon_code = None;
        return Ok(());
    };
    let cart = Cart::from_order(draft);
    // An invalid cart is reported by the draft validation instead.
    if cart.validate().is_err() {
        return Ok(());
    }
    let discount = coupon_discount(&loaded_coupon(app, &code)?, cart.totals().subtotal, Utc::now())?;
    draft.discount = Some(discount.value);
    draft.discount_type = Some(discount.discount_type);
    draft.coupon_code = Some(code);
    Ok(())
}

fn loaded_coupon(app: &AdminApp, code: &str) -> AdminResult<Coupon> {
    app.read(|s| s.coupons.items.iter().find(|c| c.code == code).cloned())
        .ok_or_else(|| AdminError::field("couponCode", "Unknown coupon code"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::app;
    use crate::models::DiscountType;
    use crate::orders::fixtures::order;
    use crate::totals::CartLine;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn order_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "_id": id,
            "items": [{ "menuItemId": "m1", "name": "Burger", "quantity": 2, "price": 8.99, "subtotal": 17.98 }],
            "status": status
        })
    }

    fn cart() -> Cart {
        Cart {
            lines: vec![
                CartLine { price: 8.99, quantity: 2 },
                CartLine { price: 18.99, quantity: 1 },
            ],
            discount: None,
            tax_rate: 0.1,
            delivery_fee: Some(5.0),
        }
    }

    #[tokio::test]
    async fn status_change_updates_store() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/restaurent/orders/o1/status"))
            .and(body_partial_json(json!({ "status": "delivered" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": order_json("o1", "delivered")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = app(&server.uri(), Some("t"));
        app.dispatch(Action::OrderLoaded(order("o1", OrderStatus::Ready)));
        let outcome = change_status(&app, "o1", OrderStatus::Delivered, None).await;
        assert!(outcome.is_success());
        assert_eq!(
            app.read(|s| s.current_order.as_ref().map(|o| o.status)),
            Some(OrderStatus::Delivered)
        );
    }

    #[tokio::test]
    async fn disallowed_status_change_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = app(&server.uri(), Some("t"));
        app.dispatch(Action::OrderSaved(order("o1", OrderStatus::Pending)));
        let outcome = change_status(&app, "o1", OrderStatus::Delivered, None).await;
        assert!(matches!(outcome, Outcome::Toast(m) if m.contains("Invalid transition")));
        assert_eq!(app.read(|s| s.orders.get("o1").map(|o| o.status)), Some(OrderStatus::Pending));
    }

    #[tokio::test]
    async fn unknown_order_is_fetched_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restaurent/orders/o9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": order_json("o9", "pending")
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/restaurent/orders/o9/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": order_json("o9", "accepted")
            })))
            .mount(&server)
            .await;

        let app = app(&server.uri(), Some("t"));
        let outcome = change_status(&app, "o9", OrderStatus::Accepted, None).await;
        assert_eq!(outcome.success().map(|o| o.status), Some(OrderStatus::Accepted));
    }

    #[tokio::test]
    async fn rejected_session_on_load_redirects_and_clears_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restaurent/orders"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let app = app(&server.uri(), Some("stale"));
        app.dispatch(Action::Navigated("/orders".into()));
        let outcome = load_orders(&app, &ListQuery::default()).await;
        assert_eq!(outcome, Outcome::Redirect("/login?next=%2Forders".into()));
        assert!(app.api.sessions().load().unwrap().is_none());
    }

    #[test]
    fn quote_reference_cart() {
        let app = app("http://localhost:4000", None);
        let totals = quote(&app, &cart(), None).success().expect("totals");
        assert!((totals.subtotal - 36.97).abs() < 1e-9);
        assert!((totals.total - 45.667).abs() < 1e-9);
    }

    fn flat10() -> Coupon {
        Coupon {
            id: "cp1".into(),
            code: "FLAT10".into(),
            description: None,
            discount: 10.0,
            discount_type: DiscountType::Fixed,
            min_order_amount: None,
            max_discount: None,
            valid_from: None,
            valid_until: None,
            usage_limit: None,
            is_active: true,
        }
    }

    #[test]
    fn quote_applies_loaded_coupon() {
        let app = app("http://localhost:4000", None);
        app.dispatch(Action::CouponSaved(flat10()));
        let totals = quote(&app, &cart(), Some("flat10")).success().expect("totals");
        assert!((totals.discount_amount - 10.0).abs() < 1e-9);
        assert!(matches!(
            quote(&app, &cart(), Some("NOPE")),
            Outcome::FieldErrors(f) if f.contains_key("couponCode")
        ));
    }

    #[tokio::test]
    async fn created_order_carries_coupon_discount_in_total() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/restaurent/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": order_json("o5", "pending")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = app(&server.uri(), Some("t"));
        app.dispatch(Action::CouponSaved(flat10()));
        let mut draft = order("", OrderStatus::Pending);
        draft.coupon_code = Some(" flat10 ".into());
        assert!(create_order(&app, draft).await.is_success());

        let requests = server.received_requests().await.expect("recorded");
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["couponCode"], "FLAT10");
        assert_eq!(body["discountType"], "fixed");
        let total = body["total"].as_f64().expect("total");
        assert!((total - ((36.97 - 10.0) * 1.1 + 5.0)).abs() < 1e-9, "{total}");
    }

    #[tokio::test]
    async fn unknown_coupon_on_create_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = app(&server.uri(), Some("t"));
        let mut draft = order("", OrderStatus::Pending);
        draft.coupon_code = Some("NOPE".into());
        let outcome = create_order(&app, draft).await;
        assert!(matches!(outcome, Outcome::FieldErrors(f) if f.contains_key("couponCode")));
    }
}
