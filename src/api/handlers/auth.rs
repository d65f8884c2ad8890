use crate::{
    api::{ApiJson, ApiResponse, AppState, AuthUser},
    core::auth::{self, AuthSession, LoginInput, RegisterInput},
    entities::user,
    errors::{Error, Result},
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<(StatusCode, ApiResponse<AuthSession>)> {
    let session = auth::register(&state.db, &state.tokens, state.bcrypt_cost, input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(session).with_message("User registered successfully"),
    ))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<ApiResponse<AuthSession>> {
    let session = auth::login(&state.db, &state.tokens, input).await?;
    Ok(ApiResponse::ok(session).with_message("Login successful"))
}

async fn me(State(state): State<AppState>, caller: AuthUser) -> Result<ApiResponse<user::Model>> {
    // A valid token can outlive its account
    let user = auth::get_user_by_id(&state.db, caller.user_id)
        .await?
        .ok_or_else(|| Error::Unauthorized {
            reason: "account no longer exists".to_string(),
        })?;
    Ok(ApiResponse::ok(user))
}
