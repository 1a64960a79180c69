use super::{respond, Outcome};
use crate::app::AdminApp;
use crate::models::User;
use crate::users;

/// Customer phone autocomplete on the create-order page. Debounced like the
/// other search boxes; `None` when superseded by a newer keystroke.
pub async fn find_by_phone(app: &AdminApp, phone: &str) -> Option<Outcome<Vec<User>>> {
    if !app.phone_search.settle().await {
        return None;
    }
    let result = users::get_users_by_phone(&app.api, phone).await;
    Some(respond(app, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::app;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn finds_customers_by_phone_digits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/get-users-by-phone"))
            .and(query_param("phone", "98765"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": [{ "_id": "u9", "name": "Ravi", "phone": "9876543210" }]
            })))
            .mount(&server)
            .await;

        let app = app(&server.uri(), Some("t"));
        let users = find_by_phone(&app, "98-765")
            .await
            .and_then(Outcome::success)
            .expect("users");
        assert_eq!(users[0].name, "Ravi");
    }

    #[tokio::test]
    async fn short_input_is_a_field_error() {
        let app = app("http://127.0.0.1:9", Some("t"));
        let outcome = find_by_phone(&app, "98").await.expect("not superseded");
        assert!(matches!(outcome, Outcome::FieldErrors(f) if f.contains_key("phone")));
    }
}
