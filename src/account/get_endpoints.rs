//! Defines the endpoints for reading the logged in user's accounts.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::core::{
        Account, AccountUsage, AccountWithUsage, get_account, get_account_usage,
        get_accounts_for_user, get_accounts_with_usage,
    },
    auth::CurrentUser,
    db::lock_connection,
    extract::IdPath,
    response::Success,
};

/// The state needed to read accounts.
#[derive(Debug, Clone)]
pub struct AccountsState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the logged in user's accounts.
pub async fn list_accounts_endpoint(
    State(state): State<AccountsState>,
    user: CurrentUser,
) -> Result<Success<Vec<Account>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_accounts_for_user(user.id, &connection).map(Success::ok)
}

/// A route handler that lists the logged in user's accounts with their transaction counts.
pub async fn list_accounts_with_usage_endpoint(
    State(state): State<AccountsState>,
    user: CurrentUser,
) -> Result<Success<Vec<AccountWithUsage>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_accounts_with_usage(user.id, &connection).map(Success::ok)
}

pub async fn get_account_endpoint(
    State(state): State<AccountsState>,
    user: CurrentUser,
    IdPath(account_id): IdPath,
) -> Result<Success<Account>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_account(account_id, user.id, &connection).map(Success::ok)
}

/// A route handler that reports whether any transactions were recorded against an account.
pub async fn get_account_usage_endpoint(
    State(state): State<AccountsState>,
    user: CurrentUser,
    IdPath(account_id): IdPath,
) -> Result<Success<AccountUsage>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_account_usage(account_id, user.id, &connection).map(Success::ok)
}
