use super::DateRangeQuery;
use crate::{
    api::{ApiJson, ApiPath, ApiQuery, ApiResponse, AppState, AuthUser},
    core::purchase_order::{self, NewPurchaseOrder, PurchaseOrderDetail, PurchaseOrderPatch},
    errors::Result,
};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/status/:status", get(by_status))
        .route("/date-range", get(by_date_range))
        .route("/alerts/overdue", get(overdue))
        .route("/:id", get(show).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<ApiResponse<Vec<PurchaseOrderDetail>>> {
    let orders = purchase_order::list_orders(&state.db, caller.user_id).await?;
    Ok(ApiResponse::list(orders))
}

async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<PurchaseOrderDetail>> {
    let order = purchase_order::get_order(&state.db, caller.user_id, id).await?;
    Ok(ApiResponse::ok(order))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(input): ApiJson<NewPurchaseOrder>,
) -> Result<(StatusCode, ApiResponse<PurchaseOrderDetail>)> {
    let order = purchase_order::create_order(&state.db, caller.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(order).with_message("Purchase order created successfully"),
    ))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<PurchaseOrderPatch>,
) -> Result<ApiResponse<PurchaseOrderDetail>> {
    let order = purchase_order::update_order(&state.db, caller.user_id, id, patch).await?;
    Ok(ApiResponse::ok(order).with_message("Purchase order updated successfully"))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<()>> {
    purchase_order::delete_order(&state.db, caller.user_id, id).await?;
    Ok(ApiResponse::message("Purchase order deleted successfully"))
}

async fn by_status(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(status): ApiPath<String>,
) -> Result<ApiResponse<Vec<PurchaseOrderDetail>>> {
    let orders = purchase_order::list_by_status(&state.db, caller.user_id, &status).await?;
    Ok(ApiResponse::list(orders))
}

async fn by_date_range(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiQuery(range): ApiQuery<DateRangeQuery>,
) -> Result<ApiResponse<Vec<PurchaseOrderDetail>>> {
    let (start, end) = range.bounds()?;
    let orders = purchase_order::list_in_date_range(&state.db, caller.user_id, start, end).await?;
    Ok(ApiResponse::list(orders))
}

async fn overdue(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<ApiResponse<Vec<PurchaseOrderDetail>>> {
    let orders = purchase_order::list_overdue(&state.db, caller.user_id, Utc::now()).await?;
    Ok(ApiResponse::list(orders))
}
