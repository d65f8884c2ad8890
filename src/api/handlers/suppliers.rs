use crate::{
    api::{ApiJson, ApiPath, ApiResponse, AppState, AuthUser},
    core::{
        DeleteOutcome, StatusChange,
        supplier::{self, NewSupplier, SupplierDetail, SupplierPatch},
    },
    entities::supplier as supplier_entity,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};

type Supplier = supplier_entity::Model;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/active", get(list_active))
        .route("/search/:term", get(search))
        .route("/:id", get(show).put(update).delete(remove))
        .route("/:id/status", patch(set_status))
        .route("/:id/toggle-status", patch(toggle_status))
}

fn status_message(supplier: &Supplier) -> &'static str {
    if supplier.is_active {
        "Supplier activated successfully"
    } else {
        "Supplier deactivated successfully"
    }
}

async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<ApiResponse<Vec<Supplier>>> {
    let suppliers = supplier::list_suppliers(&state.db, caller.user_id).await?;
    Ok(ApiResponse::list(suppliers))
}

async fn list_active(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<ApiResponse<Vec<Supplier>>> {
    let suppliers = supplier::list_active_suppliers(&state.db, caller.user_id).await?;
    Ok(ApiResponse::list(suppliers))
}

async fn search(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(term): ApiPath<String>,
) -> Result<ApiResponse<Vec<Supplier>>> {
    let suppliers = supplier::search_suppliers(&state.db, caller.user_id, &term).await?;
    Ok(ApiResponse::list(suppliers))
}

async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<SupplierDetail>> {
    let detail = supplier::get_supplier_detail(&state.db, caller.user_id, id).await?;
    Ok(ApiResponse::ok(detail))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(input): ApiJson<NewSupplier>,
) -> Result<(StatusCode, ApiResponse<Supplier>)> {
    let created = supplier::create_supplier(&state.db, caller.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(created).with_message("Supplier created successfully"),
    ))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<SupplierPatch>,
) -> Result<ApiResponse<Supplier>> {
    let updated = supplier::update_supplier(&state.db, caller.user_id, id, patch).await?;
    Ok(ApiResponse::ok(updated).with_message("Supplier updated successfully"))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Supplier>> {
    let response = match supplier::delete_supplier(&state.db, caller.user_id, id).await? {
        DeleteOutcome::Deleted => ApiResponse::message("Supplier deleted successfully"),
        DeleteOutcome::Deactivated(kept) => ApiResponse::ok(kept)
            .with_message("Supplier marked as inactive due to existing references"),
    };
    Ok(response)
}

async fn set_status(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(change): ApiJson<StatusChange>,
) -> Result<ApiResponse<Supplier>> {
    let updated = supplier::set_status(&state.db, caller.user_id, id, change).await?;
    let message = status_message(&updated);
    Ok(ApiResponse::ok(updated).with_message(message))
}

async fn toggle_status(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Supplier>> {
    let updated = supplier::toggle_status(&state.db, caller.user_id, id).await?;
    let message = status_message(&updated);
    Ok(ApiResponse::ok(updated).with_message(message))
}
