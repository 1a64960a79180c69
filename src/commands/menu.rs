use super::{finish, Outcome};
use crate::app::AdminApp;
use crate::menu;
use crate::models::{ListQuery, MenuCategory, MenuItem, Page};
use crate::search::search_term;
use crate::store::Action;

pub async fn load_categories(app: &AdminApp, query: &ListQuery) -> Outcome<Page<MenuCategory>> {
    let result = menu::list_categories(&app.api, query).await;
    finish(app, result, |page| Action::CategoriesLoaded(page.clone()))
}

/// Create when the category has no id yet, update otherwise.
pub async fn save_category(app: &AdminApp, category: &MenuCategory) -> Outcome<MenuCategory> {
    let result = if category.id.is_empty() {
        menu::create_category(&app.api, category).await
    } else {
        menu::update_category(&app.api, category).await
    };
    finish(app, result, |saved| Action::CategorySaved(saved.clone()))
}

pub async fn remove_category(app: &AdminApp, id: &str) -> Outcome<()> {
    let result = menu::delete_category(&app.api, id).await;
    finish(app, result, |_| Action::CategoryRemoved(id.to_string()))
}

pub async fn load_items(app: &AdminApp, query: &ListQuery) -> Outcome<Page<MenuItem>> {
    let result = menu::list_items(&app.api, query).await;
    finish(app, result, |page| Action::MenuItemsLoaded(page.clone()))
}

/// Search box on the menu items page. `None` when a newer keystroke
/// superseded this one.
pub async fn search_items(app: &AdminApp, input: &str) -> Option<Outcome<Page<MenuItem>>> {
    if !app.menu_search.settle().await {
        return None;
    }
    let query = ListQuery {
        search: search_term(input),
        ..ListQuery::default()
    };
    Some(load_items(app, &query).await)
}

pub async fn save_item(app: &AdminApp, item: &MenuItem) -> Outcome<MenuItem> {
    let result = if item.id.is_empty() {
        menu::create_item(&app.api, item).await
    } else {
        menu::update_item(&app.api, item).await
    };
    finish(app, result, |saved| Action::MenuItemSaved(saved.clone()))
}

pub async fn remove_item(app: &AdminApp, id: &str) -> Outcome<()> {
    let result = menu::delete_item(&app.api, id).await;
    finish(app, result, |_| Action::MenuItemRemoved(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::app;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn category(id: &str, name: &str) -> MenuCategory {
        MenuCategory {
            id: id.into(),
            name: name.into(),
            description: None,
            image: None,
            is_active: true,
            sort_order: 0,
        }
    }

    #[tokio::test]
    async fn save_without_id_creates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/menu/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": { "_id": "c1", "name": "Starters", "isActive": true }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = app(&server.uri(), Some("t"));
        let outcome = save_category(&app, &category("", "Starters")).await;
        assert!(outcome.is_success());
        assert_eq!(app.read(|s| s.menu_categories.total), 1);
    }

    #[tokio::test]
    async fn failed_delete_keeps_category() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/menu/categories/c1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = app(&server.uri(), Some("t"));
        app.dispatch(Action::CategorySaved(category("c1", "Mains")));
        let outcome = remove_category(&app, "c1").await;
        assert!(matches!(outcome, Outcome::Toast(_)));
        assert!(app.read(|s| s.menu_categories.get("c1").is_some()));
    }

    #[tokio::test]
    async fn blank_category_name_never_reaches_server() {
        let app = app("http://127.0.0.1:9", Some("t"));
        let outcome = save_category(&app, &category("", "  ")).await;
        assert!(matches!(outcome, Outcome::FieldErrors(f) if f.contains_key("name")));
    }

    #[tokio::test]
    async fn only_last_search_hits_the_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/menu/items"))
            .and(query_param("search", "paneer tikka"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": { "items": [], "total": 0 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = Arc::new(app(&server.uri(), Some("t")));
        let early = {
            let app = app.clone();
            tokio::spawn(async move { search_items(&app, "paneer").await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let late = search_items(&app, " paneer  tikka ").await;

        assert!(early.await.unwrap().is_none());
        assert!(late.is_some_and(|o| o.is_success()));
    }

    #[tokio::test]
    async fn phone_lookup_does_not_supersede_menu_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/menu/items"))
            .and(query_param("search", "pizza"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": { "items": [], "total": 0 }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/get-users-by-phone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": []
            })))
            .mount(&server)
            .await;

        let app = app(&server.uri(), Some("t"));
        let (menu, phone) = tokio::join!(
            search_items(&app, "pizza"),
            crate::commands::users::find_by_phone(&app, "98765")
        );
        assert!(menu.is_some_and(|o| o.is_success()));
        assert!(phone.is_some_and(|o| o.is_success()));
    }
}
