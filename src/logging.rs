//! Middleware for logging requests and responses.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// Bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Request bodies larger than this many bytes are rejected before they reach a handler.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// JSON fields whose values are never written to the logs.
const SECRET_FIELDS: [&str; 2] = ["password", "access_token"];

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Passwords, access tokens and the `Authorization` header are redacted.
///
/// Request bodies over [MAX_BODY_BYTES] are answered with a 400 without being read in full.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::debug!("could not read request body: {error}");
            return Error::MalformedBody(format!(
                "could not read request body, it must be at most {MAX_BODY_BYTES} bytes"
            ))
            .into_response();
        }
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    tracing::info!(
        method = %parts.method,
        uri = %parts.uri,
        headers = ?redact_headers(&parts.headers),
        "Received request"
    );
    log_body("request", &redact_body(&body_text));

    let request = Request::from_parts(parts, body_bytes.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return Response::from_parts(parts, axum::body::Body::empty());
        }
    };

    tracing::info!(status = %parts.status, "Sending response");
    log_body("response", &redact_body(&String::from_utf8_lossy(&body_bytes)));

    Response::from_parts(parts, body_bytes.into())
}

fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if headers.contains_key(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, HeaderValue::from_static(REDACTED));
    }

    headers
}

/// Replace the values of secret fields in a JSON body.
///
/// Bodies that are not JSON objects are returned as is.
fn redact_body(body_text: &str) -> String {
    let mut json = match serde_json::from_str::<Value>(body_text) {
        Ok(json @ Value::Object(_)) => json,
        _ => return body_text.to_owned(),
    };

    if let Value::Object(fields) = &mut json {
        for field in SECRET_FIELDS {
            if let Some(value) = fields.get_mut(field) {
                *value = Value::String(REDACTED.to_owned());
            }
        }
    }

    json.to_string()
}

fn log_body(direction: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{direction} body: {}...", truncate(body, LOG_BODY_LENGTH_LIMIT));
        tracing::debug!("Full {direction} body: {body:?}");
    } else {
        tracing::info!("{direction} body: {body:?}");
    }
}

/// Cut `text` to at most `max_bytes` without splitting a character.
fn truncate(text: &str, max_bytes: usize) -> &str {
    let end = text
        .char_indices()
        .map(|(index, _)| index)
        .take_while(|&index| index <= max_bytes)
        .last()
        .unwrap_or(0);

    if text.len() <= max_bytes {
        text
    } else {
        &text[..end]
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION},
        middleware,
        routing::post,
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{MAX_BODY_BYTES, logging_middleware, redact_body, redact_headers, truncate};

    async fn echo(body: String) -> String {
        body
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn passes_body_through_to_handler() {
        let server = get_test_server();

        let response = server.post("/echo").text("hello").await;

        response.assert_status_ok();
        response.assert_text("hello");
    }

    #[tokio::test]
    async fn rejects_body_over_limit() {
        let server = get_test_server();

        let response = server
            .post("/echo")
            .text("a".repeat(MAX_BODY_BYTES + 1))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["success"], false);
    }

    #[test]
    fn redacts_password_in_json_body() {
        let body = json!({"email": "foo@bar.baz", "password": "hunter2"}).to_string();

        let redacted: Value = serde_json::from_str(&redact_body(&body)).unwrap();

        assert_eq!(
            redacted,
            json!({"email": "foo@bar.baz", "password": "********"})
        );
    }

    #[test]
    fn redacts_access_token_in_response_body() {
        let body = json!({"success": true, "access_token": "abc.def.ghi"}).to_string();

        assert!(!redact_body(&body).contains("abc.def.ghi"));
    }

    #[test]
    fn leaves_other_bodies_alone() {
        assert_eq!(redact_body("password=hunter2"), "password=hunter2");
        assert_eq!(redact_body("[1, 2]"), "[1, 2]");
        assert_eq!(redact_body(""), "");
    }

    #[test]
    fn redacts_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));

        let redacted = redact_headers(&headers);

        assert_eq!(redacted.get(AUTHORIZATION).unwrap(), "********");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo", 2), "h");
    }
}
