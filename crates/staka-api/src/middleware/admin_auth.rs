//! Bearer-token guard for the admin surface
//!
//! The admin key is a shared operator secret from `ADMIN_API_KEY`. Issuing and
//! rotating it happens outside this service.

use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use staka_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

#[derive(Clone)]
pub struct AdminAuthState {
    pub admin_api_key: String,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized(message: &str) -> Response {
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

pub async fn admin_auth_middleware(
    State(auth_state): State<Arc<AdminAuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            tracing::warn!(path = %request.uri().path(), "Admin request without authorization header");
            return unauthorized("Missing authorization header");
        }
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) => token.trim(),
        None => {
            tracing::warn!(path = %request.uri().path(), "Admin request with malformed authorization header");
            return unauthorized("Invalid authorization header format");
        }
    };

    if !secure_compare(token, &auth_state.admin_api_key) {
        tracing::warn!(path = %request.uri().path(), "Admin request with invalid API key");
        return unauthorized("Invalid API key");
    }

    next.run(request).await
}
