//! Authentication middleware that checks the bearer token on protected routes.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{Claims, TokenService},
    db::lock_connection,
    user::{UserID, user_exists},
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// Verifies the access tokens sent by clients.
    pub token_service: TokenService,
    /// The database connection for checking the token's user is still registered.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_service: state.token_service.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer token in the `Authorization` header.
///
/// The verified [Claims] are placed into the request extensions and the request executed
/// normally if the token is valid, otherwise a 401 response is returned. Tokens stay valid
/// until they expire, so a token whose user has since been deleted is also rejected.
///
/// **Note**: Route handlers can use the function argument `user: CurrentUser` to receive the
/// user ID and claims.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let claims = match authorize(&parts.headers, &state.token_service)
        .and_then(|claims| check_user_exists(claims, &state.db_connection))
    {
        Ok(claims) => claims,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(claims);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

fn authorize(headers: &HeaderMap, token_service: &TokenService) -> Result<Claims, Error> {
    let header = match headers.get(AUTHORIZATION) {
        Some(header) if !header.as_bytes().trim_ascii().is_empty() => header,
        _ => return Err(Error::MissingToken),
    };

    let header = header.to_str().map_err(|_| Error::InvalidToken)?;
    let mut segments = header.split_whitespace();

    match (segments.next(), segments.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("Bearer") => {
            token_service.verify(token).ok_or(Error::InvalidToken)
        }
        _ => Err(Error::InvalidToken),
    }
}

fn check_user_exists(claims: Claims, db_connection: &Mutex<Connection>) -> Result<Claims, Error> {
    let user_id = claims.user_id().ok_or(Error::InvalidToken)?;
    let connection = lock_connection(db_connection)?;

    if user_exists(user_id, &connection)? {
        Ok(claims)
    } else {
        tracing::debug!("rejected token for user {user_id}, who is no longer registered");
        Err(Error::InvalidToken)
    }
}

/// The authenticated user making the request.
///
/// Only available on routes behind [auth_guard].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The user's ID, parsed from the `sub` claim.
    pub id: UserID,
    /// All of the verified claims from the access token.
    pub claims: Claims,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<Claims>().cloned().ok_or_else(|| {
            tracing::error!(
                "no claims in request extensions for {}, is the route missing auth_guard?",
                parts.uri
            );
            Error::MissingToken
        })?;

        let id = claims.user_id().ok_or(Error::InvalidToken)?;

        Ok(Self { id, claims })
    }
}
