use crate::{
    api::{ApiJson, ApiPath, ApiResponse, AppState, AuthUser},
    core::inventory::{self, InventoryPatch, NewInventoryItem, StockAdjustment},
    entities::inventory_item,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};

type Item = inventory_item::Model;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/alerts/low-stock", get(low_stock))
        .route("/category/:category", get(by_category))
        .route("/:id", get(show).put(update).delete(remove))
        .route("/:id/adjust", patch(adjust))
}

async fn list(State(state): State<AppState>, caller: AuthUser) -> Result<ApiResponse<Vec<Item>>> {
    let items = inventory::list_items(&state.db, caller.user_id).await?;
    Ok(ApiResponse::list(items))
}

async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Item>> {
    let item = inventory::get_item(&state.db, caller.user_id, id).await?;
    Ok(ApiResponse::ok(item))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(input): ApiJson<NewInventoryItem>,
) -> Result<(StatusCode, ApiResponse<Item>)> {
    let item = inventory::create_item(&state.db, caller.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(item).with_message("Inventory item created successfully"),
    ))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<InventoryPatch>,
) -> Result<ApiResponse<Item>> {
    let item = inventory::update_item(&state.db, caller.user_id, id, patch).await?;
    Ok(ApiResponse::ok(item).with_message("Inventory item updated successfully"))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<()>> {
    inventory::delete_item(&state.db, caller.user_id, id).await?;
    Ok(ApiResponse::message("Inventory item deleted successfully"))
}

async fn low_stock(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<ApiResponse<Vec<Item>>> {
    let items = inventory::list_low_stock(&state.db, caller.user_id).await?;
    Ok(ApiResponse::list(items))
}

async fn by_category(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(category): ApiPath<String>,
) -> Result<ApiResponse<Vec<Item>>> {
    let items = inventory::list_by_category(&state.db, caller.user_id, &category).await?;
    Ok(ApiResponse::list(items))
}

async fn adjust(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(adjustment): ApiJson<StockAdjustment>,
) -> Result<ApiResponse<Item>> {
    let item = inventory::adjust_stock(&state.db, caller.user_id, id, adjustment).await?;
    Ok(ApiResponse::ok(item).with_message("Stock adjusted successfully"))
}
