//! Route table
//!
//! Public routes and bearer-protected routes are built as two routers and
//! merged; the auth middleware is a `route_layer` on the protected half only.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::auth::{handlers as auth_handlers, middleware::mw_require_auth};
use crate::config::AppState;
use crate::posts::handlers as post_handlers;
use crate::uploads;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login))
        .route("/posts", get(post_handlers::list_posts))
        .route("/posts/{id}", get(post_handlers::get_post))
        .route("/health", get(health_check));

    let protected = Router::new()
        .route("/auth/me", get(auth_handlers::me))
        .route(
            "/upload",
            post(uploads::upload_image)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes())),
        )
        .route("/posts", post(post_handlers::create_post))
        .route(
            "/posts/{id}",
            patch(post_handlers::update_post).delete(post_handlers::delete_post),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw_require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service("/uploads", ServeDir::new(&state.config.uploads_dir))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK - Blog Server"
}
