//! Defines the endpoint for listing the logged in user's transactions.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::CurrentUser,
    db::lock_connection,
    response::Success,
    transaction::core::{Transaction, get_transactions_for_user},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the transactions on the logged in user's accounts, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionsState>,
    user: CurrentUser,
) -> Result<Success<Vec<Transaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transactions_for_user(user.id, &connection).map(Success::ok)
}
