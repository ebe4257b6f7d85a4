//! Restaurant CRUD API handlers

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::Pagination;
use crate::db::links::LinkedItem;
use crate::db::menus::Menu;
use crate::db::restaurants::{self, Restaurant, RestaurantFields};
use crate::db::{links, menus};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Restaurant with its menus and their linked items, for the show endpoint
#[derive(Debug, Serialize)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub menus: Vec<MenuDetail>,
}

#[derive(Debug, Serialize)]
pub struct MenuDetail {
    #[serde(flatten)]
    pub menu: Menu,
    pub menu_items: Vec<LinkedItem>,
}

async fn load_detail(state: &AppState, restaurant: Restaurant) -> ApiResult<RestaurantDetail> {
    let menu_records = menus::list_menus(&state.db, restaurant.id, 1, u32::MAX).await?;
    let mut menu_details = Vec::with_capacity(menu_records.len());
    for menu in menu_records {
        let menu_items = links::list_links_for_menu(&state.db, menu.id).await?;
        menu_details.push(MenuDetail { menu, menu_items });
    }
    Ok(RestaurantDetail {
        restaurant,
        menus: menu_details,
    })
}

/// GET /restaurant
pub async fn index(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<Restaurant>>> {
    let records =
        restaurants::list_restaurants(&state.db, pagination.page, pagination.per_page).await?;
    Ok(Json(records))
}

/// GET /restaurant/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RestaurantDetail>> {
    let restaurant = restaurants::get_restaurant(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Restaurant not found".to_string()))?;
    Ok(Json(load_detail(&state, restaurant).await?))
}

/// POST /restaurant
pub async fn create(
    State(state): State<AppState>,
    Json(fields): Json<RestaurantFields>,
) -> ApiResult<(axum::http::StatusCode, Json<Restaurant>)> {
    let restaurant = restaurants::create_restaurant(&state.db, &fields).await?;
    Ok((axum::http::StatusCode::CREATED, Json(restaurant)))
}

/// PUT /restaurant/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(fields): Json<RestaurantFields>,
) -> ApiResult<Json<Restaurant>> {
    let restaurant = restaurants::update_restaurant(&state.db, id, &fields).await?;
    Ok(Json(restaurant))
}

/// DELETE /restaurant/{id}
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    restaurants::delete_restaurant(&state.db, id).await?;
    Ok(Json(json!({ "message": "Restaurant deleted successfully" })))
}

/// Build restaurant CRUD routes
pub fn restaurant_routes() -> Router<AppState> {
    Router::new()
        .route("/restaurant", get(index).post(create))
        .route("/restaurant/:id", get(show).put(update).delete(destroy))
}
