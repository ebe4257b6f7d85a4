//! Menu item CRUD API handlers

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::Pagination;
use crate::db::menu_items::{self, MenuItem, MenuItemFields};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /menu_item
pub async fn index(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    let records =
        menu_items::list_menu_items(&state.db, pagination.page, pagination.per_page).await?;
    Ok(Json(records))
}

/// GET /menu_item/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MenuItem>> {
    let item = menu_items::get_menu_item(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Menu item not found".to_string()))?;
    Ok(Json(item))
}

/// POST /menu_item
pub async fn create(
    State(state): State<AppState>,
    Json(fields): Json<MenuItemFields>,
) -> ApiResult<(axum::http::StatusCode, Json<MenuItem>)> {
    let item = menu_items::create_menu_item(&state.db, &fields).await?;
    Ok((axum::http::StatusCode::CREATED, Json(item)))
}

/// PUT /menu_item/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(fields): Json<MenuItemFields>,
) -> ApiResult<Json<MenuItem>> {
    let item = menu_items::update_menu_item(&state.db, id, &fields).await?;
    Ok(Json(item))
}

/// DELETE /menu_item/{id}
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    menu_items::delete_menu_item(&state.db, id).await?;
    Ok(Json(json!({ "message": "Menu item deleted successfully" })))
}

/// Build menu item CRUD routes
pub fn menu_item_routes() -> Router<AppState> {
    Router::new()
        .route("/menu_item", get(index).post(create))
        .route("/menu_item/:id", get(show).put(update).delete(destroy))
}
