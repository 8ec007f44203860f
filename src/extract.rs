//! Request extractors that turn malformed input into JSON 400 responses.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{Error, FieldError, database_id::DatabaseId};

/// A JSON request body that has been deserialized and then checked with [Validate].
///
/// An empty body is rejected with [Error::EmptyBody], JSON that cannot be parsed into `T` with
/// [Error::MalformedBody] and a body that fails validation with [Error::Validation].
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(request, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("could not read request body: {rejection}");
                Error::MalformedBody("could not read request body".to_owned())
            })?;

        if body.trim_ascii().is_empty() {
            return Err(Error::EmptyBody);
        }

        let value: T = serde_json::from_slice(&body).map_err(|error| {
            tracing::debug!("JSON parsing failed: {error}");
            Error::MalformedBody(classify_json_error(&error))
        })?;

        value.validate()?;

        Ok(Self(value))
    }
}

/// Give a client-facing description of a JSON error without echoing the body back.
fn classify_json_error(error: &serde_json::Error) -> String {
    match error.classify() {
        serde_json::error::Category::Syntax => {
            format!("invalid JSON at line {}", error.line())
        }
        serde_json::error::Category::Eof => "invalid JSON: unexpected end of input".to_owned(),
        serde_json::error::Category::Data => {
            "invalid JSON: wrong types for one or more fields".to_owned()
        }
        serde_json::error::Category::Io => "invalid JSON: could not read body".to_owned(),
    }
}

/// Unwrap a field that validation has already checked is present.
///
/// # Errors
/// Returns [Error::Validation] naming `field` if `value` is `None`.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, Error> {
    value.ok_or_else(|| {
        Error::Validation(vec![FieldError {
            field: field.to_owned(),
            message: "is required".to_owned(),
        }])
    })
}

/// A positive integer ID taken from the only parameter in the request path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdPath(pub DatabaseId);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("could not get ID from path {}: {rejection}", parts.uri);
                Error::InvalidId(String::new())
            })?;

        match raw_id.parse::<DatabaseId>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(Error::InvalidId(raw_id)),
        }
    }
}
