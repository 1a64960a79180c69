//! Client routes and the permission guard in front of them.

use std::fmt;

use chrono::Utc;

use crate::api::{decode_segment, encode_segment};
use crate::auth::AuthSession;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Tables,
    QrCodes,
    MenuCategories,
    MenuItems,
    Orders,
    OrderDetail(String),
    CreateOrder,
    Expenses,
    Reports,
    ProfitLoss,
    Loyalty,
    ItemWiseAnalytics,
    CustomerWiseAnalytics,
    Users,
    Profile,
    Restaurant,
    PosTroubleshooting,
    Coupons,
    CreateCoupon,
    CouponDetail(String),
    EditCoupon(String),
}

/// Page + action pair checked against the user's permission list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub page: &'static str,
    pub action: &'static str,
}

const fn view(page: &'static str) -> Requirement {
    Requirement { page, action: "view" }
}

impl Route {
    /// Match a client path. Query string, fragment and trailing slash are ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            ["login"] => Route::Login,
            [] | ["dashboard"] => Route::Dashboard,
            ["tables"] => Route::Tables,
            ["qr-codes"] => Route::QrCodes,
            ["menu-categories"] => Route::MenuCategories,
            ["menu-items"] => Route::MenuItems,
            ["orders"] => Route::Orders,
            ["orders", id] => Route::OrderDetail(decode_segment(id)),
            ["create-order"] => Route::CreateOrder,
            ["expenses"] => Route::Expenses,
            ["reports"] => Route::Reports,
            ["reports", "profit-loss"] => Route::ProfitLoss,
            ["loyalty"] => Route::Loyalty,
            ["analytics", "item-wise"] => Route::ItemWiseAnalytics,
            ["analytics", "customer-wise"] => Route::CustomerWiseAnalytics,
            ["users"] => Route::Users,
            ["profile"] => Route::Profile,
            ["restaurant"] => Route::Restaurant,
            ["pos-troubleshooting"] => Route::PosTroubleshooting,
            ["coupons"] => Route::Coupons,
            ["coupons", "create"] => Route::CreateCoupon,
            ["coupons", id] => Route::CouponDetail(decode_segment(id)),
            ["coupons", id, "edit"] => Route::EditCoupon(decode_segment(id)),
            _ => return None,
        };
        Some(route)
    }

    /// `None` for routes open to everyone.
    pub fn requirement(&self) -> Option<Requirement> {
        let req = match self {
            Route::Login => return None,
            Route::Dashboard => view("dashboard"),
            Route::Tables => view("tables"),
            Route::QrCodes => view("qr-codes"),
            Route::MenuCategories => view("menu-categories"),
            Route::MenuItems => view("menu-items"),
            Route::Orders | Route::OrderDetail(_) => view("orders"),
            Route::CreateOrder => Requirement {
                page: "orders",
                action: "create",
            },
            Route::Expenses => view("expenses"),
            Route::Reports | Route::ProfitLoss => view("reports"),
            Route::Loyalty => view("loyalty"),
            Route::ItemWiseAnalytics | Route::CustomerWiseAnalytics => view("analytics"),
            Route::Users => view("users"),
            Route::Profile => view("profile"),
            Route::Restaurant => view("restaurant"),
            Route::PosTroubleshooting => view("pos-troubleshooting"),
            Route::Coupons | Route::CouponDetail(_) => view("coupons"),
            Route::CreateCoupon => Requirement {
                page: "coupons",
                action: "create",
            },
            Route::EditCoupon(_) => Requirement {
                page: "coupons",
                action: "edit",
            },
        };
        Some(req)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => f.write_str(LOGIN_PATH),
            Route::Dashboard => f.write_str("/dashboard"),
            Route::Tables => f.write_str("/tables"),
            Route::QrCodes => f.write_str("/qr-codes"),
            Route::MenuCategories => f.write_str("/menu-categories"),
            Route::MenuItems => f.write_str("/menu-items"),
            Route::Orders => f.write_str("/orders"),
            Route::OrderDetail(id) => write!(f, "/orders/{}", encode_segment(id)),
            Route::CreateOrder => f.write_str("/create-order"),
            Route::Expenses => f.write_str("/expenses"),
            Route::Reports => f.write_str("/reports"),
            Route::ProfitLoss => f.write_str("/reports/profit-loss"),
            Route::Loyalty => f.write_str("/loyalty"),
            Route::ItemWiseAnalytics => f.write_str("/analytics/item-wise"),
            Route::CustomerWiseAnalytics => f.write_str("/analytics/customer-wise"),
            Route::Users => f.write_str("/users"),
            Route::Profile => f.write_str("/profile"),
            Route::Restaurant => f.write_str("/restaurant"),
            Route::PosTroubleshooting => f.write_str("/pos-troubleshooting"),
            Route::Coupons => f.write_str("/coupons"),
            Route::CreateCoupon => f.write_str("/coupons/create"),
            Route::CouponDetail(id) => write!(f, "/coupons/{}", encode_segment(id)),
            Route::EditCoupon(id) => write!(f, "/coupons/{}/edit", encode_segment(id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Not signed in (or the session expired); go to this login URL.
    RedirectLogin(String),
    Forbidden(Requirement),
}

/// `/login?next=<path>` with the path percent-encoded.
pub fn login_redirect(next: &str) -> String {
    let next = next.trim();
    if next.is_empty() || next.starts_with(LOGIN_PATH) {
        return LOGIN_PATH.to_string();
    }
    format!("{LOGIN_PATH}?next={}", encode_segment(next))
}

pub fn guard(route: &Route, session: Option<&AuthSession>) -> Access {
    let Some(req) = route.requirement() else {
        return Access::Allow;
    };
    match session {
        Some(s) if !s.is_expired(Utc::now()) => {
            if s.can(req.page, req.action) {
                Access::Allow
            } else {
                Access::Forbidden(req)
            }
        }
        _ => Access::RedirectLogin(login_redirect(&route.to_string())),
    }
}
