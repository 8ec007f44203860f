//! The log in endpoint, which exchanges an email and password for an access token.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    AppState, Error,
    auth::TokenService,
    db::lock_connection,
    extract::{ValidatedJson, required},
    user::{User, get_user_by_email},
};

/// The state needed to perform a log in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// Issues the access token for a successful log in.
    pub token_service: TokenService,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_service: state.token_service.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The credentials sent by the client.
#[derive(Debug, Deserialize, Validate)]
pub struct LogInData {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

/// The body of a successful log in response.
///
/// `data` holds the user's display name.
#[derive(Debug, Serialize)]
struct LogInResponse {
    success: bool,
    access_token: String,
    data: String,
}

impl IntoResponse for LogInResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Handler for log in requests.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password or signing the token.
///
/// The first two give the same error so that clients cannot tell which emails are registered.
pub async fn log_in_endpoint(
    State(state): State<LogInState>,
    ValidatedJson(data): ValidatedJson<LogInData>,
) -> Result<impl IntoResponse, Error> {
    let email = required(data.email, "email")?;
    let password = required(data.password, "password")?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_email(&email, &connection)?
    };

    let user: User = match user {
        Some(user) => user,
        None => {
            tracing::debug!("log in attempt for unregistered email");
            return Err(Error::InvalidCredentials);
        }
    };

    if !user.password_hash.verify(&password)? {
        tracing::debug!("log in attempt with wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let access_token = state.token_service.issue(user.id, &user.email)?;
    tracing::info!("User {} logged in", user.id);

    Ok(LogInResponse {
        success: true,
        access_token,
        data: user.display_name(),
    })
}
