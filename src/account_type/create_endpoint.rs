//! Defines the endpoint for creating a new account type.
use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState, Error,
    account_type::core::{AccountType, create_account_type},
    db::lock_connection,
    extract::{ValidatedJson, required},
    response::Success,
};

/// The state needed to create an account type.
#[derive(Debug, Clone)]
pub struct CreateAccountTypeState {
    /// The database connection for managing account types.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountTypeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an account type.
#[derive(Debug, Deserialize, Validate)]
pub struct AccountTypeData {
    #[validate(required, length(min = 1, max = 30))]
    pub name: Option<String>,
}

/// A route handler for creating a new account type, responds with the new account type.
pub async fn create_account_type_endpoint(
    State(state): State<CreateAccountTypeState>,
    ValidatedJson(data): ValidatedJson<AccountTypeData>,
) -> Result<Success<AccountType>, Error> {
    let name = required(data.name, "name")?;
    let connection = lock_connection(&state.db_connection)?;

    let account_type = create_account_type(&name, &connection)?;

    Ok(Success::created(account_type).with_message("account type created"))
}
