//! User lookup (`/user/*`).

use crate::api::ApiClient;
use crate::error::{AdminError, AdminResult};
use crate::models::User;

/// Minimum digits before a phone search is sent.
const MIN_PHONE_DIGITS: usize = 4;

/// Keep digits only, so "+91 98765-43210" and "919876543210" match.
pub fn normalize_phone(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
}

/// `GET /user/get-users-by-phone?phone=`.
pub async fn get_users_by_phone(api: &ApiClient, phone: &str) -> AdminResult<Vec<User>> {
    let digits = normalize_phone(phone);
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(AdminError::field(
            "phone",
            format!("Enter at least {MIN_PHONE_DIGITS} digits"),
        ));
    }
    api.get("/user/get-users-by-phone", &[("phone", digits)])
        .await
}
