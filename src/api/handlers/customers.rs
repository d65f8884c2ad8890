use crate::{
    api::{ApiJson, ApiPath, ApiResponse, AppState, AuthUser},
    core::{
        DeleteOutcome, StatusChange,
        customer::{self, CustomerPatch, NewCustomer},
    },
    entities::customer as customer_entity,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};

type Customer = customer_entity::Model;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/active", get(list_active))
        .route("/search/:term", get(search))
        .route("/:id", get(show).put(update).delete(remove))
        .route("/:id/status", patch(set_status))
        .route("/:id/toggle-status", patch(toggle_status))
}

fn status_message(customer: &Customer) -> &'static str {
    if customer.is_active {
        "Customer activated successfully"
    } else {
        "Customer deactivated successfully"
    }
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<ApiResponse<Vec<Customer>>> {
    let customers = customer::list_customers(&state.db, caller.user_id).await?;
    Ok(ApiResponse::list(customers))
}

async fn list_active(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<ApiResponse<Vec<Customer>>> {
    let customers = customer::list_active_customers(&state.db, caller.user_id).await?;
    Ok(ApiResponse::list(customers))
}

async fn search(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(term): ApiPath<String>,
) -> Result<ApiResponse<Vec<Customer>>> {
    let customers = customer::search_customers(&state.db, caller.user_id, &term).await?;
    Ok(ApiResponse::list(customers))
}

async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Customer>> {
    let found = customer::get_customer(&state.db, caller.user_id, id).await?;
    Ok(ApiResponse::ok(found))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(input): ApiJson<NewCustomer>,
) -> Result<(StatusCode, ApiResponse<Customer>)> {
    let created = customer::create_customer(&state.db, caller.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(created).with_message("Customer created successfully"),
    ))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<CustomerPatch>,
) -> Result<ApiResponse<Customer>> {
    let updated = customer::update_customer(&state.db, caller.user_id, id, patch).await?;
    Ok(ApiResponse::ok(updated).with_message("Customer updated successfully"))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Customer>> {
    let response = match customer::delete_customer(&state.db, caller.user_id, id).await? {
        DeleteOutcome::Deleted => ApiResponse::message("Customer deleted successfully"),
        DeleteOutcome::Deactivated(kept) => ApiResponse::ok(kept)
            .with_message("Customer marked as inactive due to existing references"),
    };
    Ok(response)
}

async fn set_status(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(change): ApiJson<StatusChange>,
) -> Result<ApiResponse<Customer>> {
    let updated = customer::set_status(&state.db, caller.user_id, id, change).await?;
    let message = status_message(&updated);
    Ok(ApiResponse::ok(updated).with_message(message))
}

async fn toggle_status(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Customer>> {
    let updated = customer::toggle_status(&state.db, caller.user_id, id).await?;
    let message = status_message(&updated);
    Ok(ApiResponse::ok(updated).with_message(message))
}
