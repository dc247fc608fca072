//! Post handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::Result;
use crate::models::Post;
use crate::validation::{PostRequest, ValidatedJson};

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// GET /posts
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>> {
    info!("GET /posts");
    Ok(Json(state.posts.list().await?))
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>> {
    info!("GET /posts/{}", id);
    Ok(Json(state.posts.view(&id).await?))
}

/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    ctx: Ctx,
    ValidatedJson(req): ValidatedJson<PostRequest>,
) -> Result<(StatusCode, Json<Post>)> {
    info!("POST /posts - {}", ctx.user_id());

    let post = state.posts.create(ctx.user_id(), req.into()).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// PATCH /posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PostRequest>,
) -> Result<Json<SuccessResponse>> {
    info!("PATCH /posts/{} - {}", id, ctx.user_id());

    state.posts.update(&id, ctx.user_id(), req.into()).await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    info!("DELETE /posts/{} - {}", id, ctx.user_id());

    state.posts.delete(&id, ctx.user_id()).await?;

    Ok(Json(SuccessResponse { success: true }))
}
