//! Menu CRUD API handlers, nested under a restaurant

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::Pagination;
use crate::api::restaurants::MenuDetail;
use crate::db::links::{self, LinkAttributes, LinkResult, MenuMenuItem};
use crate::db::menus::{self, Menu, MenuFields};
use crate::db::{menu_items, restaurants};
use crate::error::{ApiError, ApiResult};
use crate::models::PriceValue;
use crate::AppState;

async fn require_restaurant(state: &AppState, id: Uuid) -> ApiResult<()> {
    restaurants::get_restaurant(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Restaurant not found".to_string()))?;
    Ok(())
}

/// GET /restaurant/{restaurant_id}/menu
pub async fn index(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<Menu>>> {
    require_restaurant(&state, restaurant_id).await?;
    let records =
        menus::list_menus(&state.db, restaurant_id, pagination.page, pagination.per_page).await?;
    Ok(Json(records))
}

/// GET /restaurant/{restaurant_id}/menu/{id}
pub async fn show(
    State(state): State<AppState>,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MenuDetail>> {
    let menu = menus::get_menu(&state.db, restaurant_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Menu not found".to_string()))?;
    let menu_items = links::list_links_for_menu(&state.db, menu.id).await?;
    Ok(Json(MenuDetail { menu, menu_items }))
}

/// POST /restaurant/{restaurant_id}/menu
pub async fn create(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Json(fields): Json<MenuFields>,
) -> ApiResult<(axum::http::StatusCode, Json<Menu>)> {
    require_restaurant(&state, restaurant_id).await?;
    let menu = menus::create_menu(&state.db, restaurant_id, &fields).await?;
    Ok((axum::http::StatusCode::CREATED, Json(menu)))
}

/// PUT /restaurant/{restaurant_id}/menu/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
    Json(fields): Json<MenuFields>,
) -> ApiResult<Json<Menu>> {
    let menu = menus::update_menu(&state.db, restaurant_id, id, &fields).await?;
    Ok(Json(menu))
}

/// DELETE /restaurant/{restaurant_id}/menu/{id}
pub async fn destroy(
    State(state): State<AppState>,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    menus::delete_menu(&state.db, restaurant_id, id).await?;
    Ok(Json(json!({ "message": "Menu deleted successfully" })))
}

/// POST /restaurant/{restaurant_id}/menu/{id}/add_menu_item request
#[derive(Debug, Deserialize)]
pub struct AddMenuItemRequest {
    pub menu_item_id: Uuid,
    pub price: Option<PriceValue>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub available: Option<bool>,
    pub image_url: Option<String>,
    pub prep_time_minutes: Option<i64>,
}

/// POST /restaurant/{restaurant_id}/menu/{id}/add_menu_item
pub async fn add_menu_item(
    State(state): State<AppState>,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
    Json(request): Json<AddMenuItemRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<MenuMenuItem>)> {
    let menu = menus::get_menu(&state.db, restaurant_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Menu not found".to_string()))?;
    menu_items::get_menu_item(&state.db, request.menu_item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Menu item not found".to_string()))?;

    if links::link_exists(&state.db, menu.id, request.menu_item_id).await? {
        return Err(ApiError::Unprocessable(
            "Menu item is already on this menu".to_string(),
        ));
    }

    let attrs = LinkAttributes {
        price: request.price,
        currency: request.currency,
        description: request.description,
        category: request.category,
        available: request.available,
        image_url: request.image_url,
        prep_time_minutes: request.prep_time_minutes,
    };
    match links::create_link(&state.db, menu.id, request.menu_item_id, &attrs).await? {
        LinkResult::Created(link) => Ok((axum::http::StatusCode::CREATED, Json(link))),
        LinkResult::Invalid(errors) => Err(ApiError::Unprocessable(errors.join(", "))),
    }
}

/// DELETE /restaurant/{restaurant_id}/menu/{id}/remove_menu_item/{item_id}
pub async fn remove_menu_item(
    State(state): State<AppState>,
    Path((restaurant_id, id, item_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    menus::get_menu(&state.db, restaurant_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Menu not found".to_string()))?;
    links::delete_link(&state.db, id, item_id).await?;
    Ok(Json(json!({ "message": "Menu item removed from menu" })))
}

/// Build menu CRUD routes
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/restaurant/:restaurant_id/menu", get(index).post(create))
        .route(
            "/restaurant/:restaurant_id/menu/:id",
            get(show).put(update).delete(destroy),
        )
        .route(
            "/restaurant/:restaurant_id/menu/:id/add_menu_item",
            post(add_menu_item),
        )
        .route(
            "/restaurant/:restaurant_id/menu/:id/remove_menu_item/:item_id",
            delete(remove_menu_item),
        )
}
