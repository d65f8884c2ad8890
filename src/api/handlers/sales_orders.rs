use super::DateRangeQuery;
use crate::{
    api::{ApiJson, ApiPath, ApiQuery, ApiResponse, AppState, AuthUser},
    core::sales_order::{self, NewSalesOrder, SalesOrderDetail, SalesOrderPatch},
    errors::Result,
};
use axum::{Router, extract::State, http::StatusCode, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/status/:status", get(by_status))
        .route("/date-range", get(by_date_range))
        .route("/:id", get(show).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<ApiResponse<Vec<SalesOrderDetail>>> {
    let orders = sales_order::list_orders(&state.db, caller.user_id).await?;
    Ok(ApiResponse::list(orders))
}

async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<SalesOrderDetail>> {
    let order = sales_order::get_order(&state.db, caller.user_id, id).await?;
    Ok(ApiResponse::ok(order))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(input): ApiJson<NewSalesOrder>,
) -> Result<(StatusCode, ApiResponse<SalesOrderDetail>)> {
    let order = sales_order::create_order(&state.db, caller.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(order).with_message("Sales order created successfully"),
    ))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<SalesOrderPatch>,
) -> Result<ApiResponse<SalesOrderDetail>> {
    let order = sales_order::update_order(&state.db, caller.user_id, id, patch).await?;
    Ok(ApiResponse::ok(order).with_message("Sales order updated successfully"))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<()>> {
    sales_order::delete_order(&state.db, caller.user_id, id).await?;
    Ok(ApiResponse::message("Sales order deleted successfully"))
}

async fn by_status(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(status): ApiPath<String>,
) -> Result<ApiResponse<Vec<SalesOrderDetail>>> {
    let orders = sales_order::list_by_status(&state.db, caller.user_id, &status).await?;
    Ok(ApiResponse::list(orders))
}

async fn by_date_range(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiQuery(range): ApiQuery<DateRangeQuery>,
) -> Result<ApiResponse<Vec<SalesOrderDetail>>> {
    let (start, end) = range.bounds()?;
    let orders = sales_order::list_in_date_range(&state.db, caller.user_id, start, end).await?;
    Ok(ApiResponse::list(orders))
}
