//! The registration endpoint for creating a new user.
use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    db::lock_connection,
    extract::{ValidatedJson, required},
    response::Success,
    user::{NewUser, UserProfile, create_user},
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The details a new user signs up with.
#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationData {
    #[validate(required, length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(required, length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 1, max = 20))]
    pub phone: Option<String>,
    #[validate(required, length(min = 8, max = 72))]
    pub password: Option<String>,
}

/// A route handler for creating a new user.
///
/// The password must pass the strength check in [ValidatedPassword] and is stored as a bcrypt
/// hash. The response contains the new user's profile, never the password.
pub async fn register_user_endpoint(
    State(state): State<RegistrationState>,
    ValidatedJson(data): ValidatedJson<RegistrationData>,
) -> Result<Success<UserProfile>, Error> {
    let raw_password = required(data.password, "password")?;
    let password_hash =
        PasswordHash::new(ValidatedPassword::new(&raw_password)?, PasswordHash::DEFAULT_COST)?;

    let new_user = NewUser {
        first_name: required(data.first_name, "first_name")?,
        last_name: required(data.last_name, "last_name")?,
        email: required(data.email, "email")?,
        phone: required(data.phone, "phone")?,
        password_hash,
    };

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(new_user, &connection)?;
    tracing::info!("Registered user {}", user.id);

    Ok(Success::created(UserProfile::from(user)).with_message("user registered"))
}
