//! Menu categories and items (`/menu/*`).

use tracing::trace;

use crate::api::{encode_segment, ApiClient};
use crate::error::{AdminError, AdminResult, FieldErrors};
use crate::models::{ListQuery, MenuCategory, MenuItem, Page};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_category(category: &MenuCategory) -> AdminResult<()> {
    if category.name.trim().is_empty() {
        return Err(AdminError::field("name", "Category name is required"));
    }
    Ok(())
}

pub fn validate_item(item: &MenuItem) -> AdminResult<()> {
    let mut errors = FieldErrors::new();
    if item.name.trim().is_empty() {
        errors.insert("name".into(), "Item name is required".into());
    }
    if item.category_id.trim().is_empty() {
        errors.insert("categoryId".into(), "Select a category".into());
    }
    if !item.price.is_finite() || item.price < 0.0 {
        errors.insert("price".into(), "Price must be zero or more".into());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AdminError::Validation(errors))
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub async fn list_categories(api: &ApiClient, query: &ListQuery) -> AdminResult<Page<MenuCategory>> {
    trace!(?query, "menu: listing categories");
    api.get("/menu/categories", &query.to_pairs()).await
}

pub async fn create_category(api: &ApiClient, category: &MenuCategory) -> AdminResult<MenuCategory> {
    validate_category(category)?;
    api.post("/menu/categories", category).await
}

pub async fn update_category(api: &ApiClient, category: &MenuCategory) -> AdminResult<MenuCategory> {
    validate_category(category)?;
    let path = format!("/menu/categories/{}", encode_segment(&category.id));
    api.put(&path, category).await
}

pub async fn delete_category(api: &ApiClient, id: &str) -> AdminResult<()> {
    api.delete(&format!("/menu/categories/{}", encode_segment(id)))
        .await
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

pub async fn list_items(api: &ApiClient, query: &ListQuery) -> AdminResult<Page<MenuItem>> {
    trace!(?query, "menu: listing items");
    api.get("/menu/items", &query.to_pairs()).await
}

pub async fn create_item(api: &ApiClient, item: &MenuItem) -> AdminResult<MenuItem> {
    validate_item(item)?;
    api.post("/menu/items", item).await
}

pub async fn update_item(api: &ApiClient, item: &MenuItem) -> AdminResult<MenuItem> {
    validate_item(item)?;
    let path = format!("/menu/items/{}", encode_segment(&item.id));
    api.put(&path, item).await
}

pub async fn delete_item(api: &ApiClient, id: &str) -> AdminResult<()> {
    api.delete(&format!("/menu/items/{}", encode_segment(id)))
        .await
}
