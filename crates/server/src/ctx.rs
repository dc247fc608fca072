//! Authenticated identity for the current request
//!
//! `mw_require_auth` builds a [`Ctx`] from verified token claims and stores it
//! in the request extensions; handlers on protected routes take it as an
//! extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use tracing::error;

use crate::auth::token::Claims;
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctx {
    user_id: String,
    token_expires_at: DateTime<Utc>,
}

impl Ctx {
    /// Identity asserted by a token that has already passed verification
    pub fn from_claims(claims: Claims) -> Result<Self> {
        let token_expires_at = i64::try_from(claims.exp)
            .ok()
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
            .ok_or(Error::AuthFailInvalidToken)?;

        Ok(Self {
            user_id: claims.sub,
            token_expires_at,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn token_expires_at(&self) -> DateTime<Utc> {
        self.token_expires_at
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        match parts.extensions.get::<Ctx>() {
            Some(ctx) => Ok(ctx.clone()),
            None => {
                // Route registered outside the auth route_layer
                error!("No auth context for {} {}", parts.method, parts.uri);
                Err(Error::AuthFailCtxNotInRequestExt)
            }
        }
    }
}
