//! Middleware that abandons requests which take too long.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// Run the request, answering with [Error::Timeout] if no response is ready within `limit`.
///
/// Add it with `axum::middleware::from_fn_with_state(limit, timeout_middleware)`.
pub async fn timeout_middleware(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request.uri().clone();

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!("{uri} did not respond within {limit:?}");
            Error::Timeout.into_response()
        }
    }
}
