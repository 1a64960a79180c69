use super::{finish, Outcome};
use crate::app::AdminApp;
use crate::coupons;
use crate::models::{Coupon, ListQuery, Page};
use crate::store::Action;

pub async fn load_coupons(app: &AdminApp, query: &ListQuery) -> Outcome<Page<Coupon>> {
    let result = coupons::list_coupons(&app.api, query).await;
    finish(app, result, |page| Action::CouponsLoaded(page.clone()))
}

/// Coupon detail and edit pages.
pub async fn open_coupon(app: &AdminApp, id: &str) -> Outcome<Coupon> {
    let result = coupons::get_coupon(&app.api, id).await;
    finish(app, result, |coupon| Action::CouponSaved(coupon.clone()))
}

pub async fn save_coupon(app: &AdminApp, coupon: &Coupon) -> Outcome<Coupon> {
    let result = if coupon.id.is_empty() {
        coupons::create_coupon(&app.api, coupon).await
    } else {
        coupons::update_coupon(&app.api, coupon).await
    };
    finish(app, result, |saved| Action::CouponSaved(saved.clone()))
}

pub async fn remove_coupon(app: &AdminApp, id: &str) -> Outcome<()> {
    let result = coupons::delete_coupon(&app.api, id).await;
    finish(app, result, |_| Action::CouponRemoved(id.to_string()))
}
