//! API-key authentication middleware.
//!
//! Every API route requires the shared secret in the `X-API-Key` header.
//! A missing or mismatched key is rejected with 401; a server whose key is
//! unconfigured (or still the placeholder) answers 500, since that is a
//! deployment fault rather than a client fault.

use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Placeholder value shipped in example configuration; never accepted.
const PLACEHOLDER_API_KEY: &str = "your-secure-api-key";

/// Middleware enforcing the API-key check on every request.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(rejection) = check_api_key(provided, &state.api_key) {
        return rejection.into_response();
    }

    next.run(request).await
}

/// The pure key-check decision, shared with tests.
fn check_api_key(
    provided: Option<&str>,
    configured: &str,
) -> Result<(), (StatusCode, &'static str)> {
    let Some(provided) = provided else {
        return Err((StatusCode::UNAUTHORIZED, "API Key was not provided"));
    };

    if configured.is_empty() || configured == PLACEHOLDER_API_KEY {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error: API Key not properly configured",
        ));
    }

    if provided != configured {
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized client"));
    }

    Ok(())
}
