//! Defines the endpoint for deleting an account type.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;

use crate::{
    AppState, Error, account_type::core::delete_account_type, db::lock_connection,
    extract::IdPath, response::Success,
};

/// The state needed to delete an account type.
#[derive(Debug, Clone)]
pub struct DeleteAccountTypeState {
    /// The database connection for managing account types.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountTypeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an account type that no accounts use.
pub async fn delete_account_type_endpoint(
    State(state): State<DeleteAccountTypeState>,
    IdPath(account_type_id): IdPath,
) -> Result<Success<()>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_account_type(account_type_id, &connection)?;

    Ok(Success::message("account type deleted"))
}
