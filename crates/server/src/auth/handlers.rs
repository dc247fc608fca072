//! Auth handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::info;

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::Result;
use crate::models::UserInfo;
use crate::validation::{LoginRequest, RegisterRequest, ValidatedJson};

/// Token plus the public user fields, flattened into one object
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: UserInfo,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    info!("POST /auth/register - {}", req.email);

    let user = state.auth.register(req.into()).await?;
    let token = state.keys.sign(&user.id)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    info!("POST /auth/login - {}", req.email);

    let user = state.auth.login(&req.email, &req.password).await?;
    let token = state.keys.sign(&user.id)?;

    Ok(Json(AuthResponse { token, user }))
}

/// GET /auth/me
pub async fn me(State(state): State<AppState>, ctx: Ctx) -> Result<Json<UserInfo>> {
    info!("GET /auth/me - {}", ctx.user_id());

    let user = state.auth.get_user(ctx.user_id()).await?;

    Ok(Json(user))
}
