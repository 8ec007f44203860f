//! Defines the endpoints for reading account types.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account_type::core::{
        AccountType, AccountTypeUsage, get_account_type, get_account_type_usage,
        get_all_account_types,
    },
    db::lock_connection,
    extract::IdPath,
    response::Success,
};

/// The state needed to read account types.
#[derive(Debug, Clone)]
pub struct AccountTypesState {
    /// The database connection for managing account types.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountTypesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists every account type.
pub async fn list_account_types_endpoint(
    State(state): State<AccountTypesState>,
) -> Result<Success<Vec<AccountType>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_account_types(&connection).map(Success::ok)
}

/// A route handler that gets a single account type.
pub async fn get_account_type_endpoint(
    State(state): State<AccountTypesState>,
    IdPath(account_type_id): IdPath,
) -> Result<Success<AccountType>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_account_type(account_type_id, &connection).map(Success::ok)
}

/// A route handler that reports whether any accounts use an account type.
pub async fn get_account_type_usage_endpoint(
    State(state): State<AccountTypesState>,
    IdPath(account_type_id): IdPath,
) -> Result<Success<AccountTypeUsage>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_account_type_usage(account_type_id, &connection).map(Success::ok)
}
