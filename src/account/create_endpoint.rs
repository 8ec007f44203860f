//! Defines the endpoint for creating a new account.
use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState, Error,
    account::core::{Account, NewAccount, create_account},
    auth::CurrentUser,
    db::lock_connection,
    extract::{ValidatedJson, required},
    response::Success,
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an account.
///
/// The owner is always the logged in user.
#[derive(Debug, Deserialize, Validate)]
pub struct AccountData {
    #[validate(required, length(min = 1, max = 35))]
    pub name: Option<String>,
    #[validate(required, range(min = 1))]
    pub account_type_id: Option<i64>,
    #[validate(required, range(min = 0.0))]
    pub balance: Option<f64>,
}

/// A route handler for opening a new account for the logged in user.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    user: CurrentUser,
    ValidatedJson(data): ValidatedJson<AccountData>,
) -> Result<Success<Account>, Error> {
    let new_account = NewAccount {
        name: required(data.name, "name")?,
        account_type_id: required(data.account_type_id, "account_type_id")?,
        balance: required(data.balance, "balance")?,
    };
    let connection = lock_connection(&state.db_connection)?;

    let account = create_account(new_account, user.id, &connection)?;

    Ok(Success::created(account).with_message("account created"))
}
