use crate::{
    api::{ApiResponse, AppState, AuthUser},
    core::report::{self, DashboardSummary},
    errors::Result,
};
use axum::{Router, extract::State, routing::get};
use chrono::Utc;

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

async fn dashboard(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<ApiResponse<DashboardSummary>> {
    let summary = report::dashboard(&state.db, caller.user_id, Utc::now()).await?;
    Ok(ApiResponse::ok(summary))
}
