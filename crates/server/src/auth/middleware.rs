use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let auth_header = match req.headers().get(header::AUTHORIZATION) {
        Some(h) => h.to_str().map_err(|_| Error::AuthFailTokenWrongFormat)?,
        None => return Err(Error::AuthFailNoToken),
    };

    // Format: "Bearer <token>"
    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(Error::AuthFailTokenWrongFormat)?;

    let claims = state.keys.verify(token).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        Error::AuthFailInvalidToken
    })?;
    let ctx = Ctx::from_claims(claims)?;
    debug!(
        "Authenticated {} (token expires {})",
        ctx.user_id(),
        ctx.token_expires_at()
    );

    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
