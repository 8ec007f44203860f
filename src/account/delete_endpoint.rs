//! Defines the endpoint for deleting an account.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;

use crate::{
    AppState, Error, account::core::delete_account, auth::CurrentUser, db::lock_connection,
    extract::IdPath, response::Success,
};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    /// The database connection for managing account.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an account that has no transactions.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    user: CurrentUser,
    IdPath(account_id): IdPath,
) -> Result<Success<()>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_account(account_id, user.id, &connection)?;

    Ok(Success::message("account deleted"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::test_utils::{
        get_test_app, insert_test_account, insert_test_category, log_in_test_user,
        must_get_user_id,
    };

    #[tokio::test]
    async fn deletes_account() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let user_id = must_get_user_id("foo@bar.baz", &state);
        let account =
            insert_test_account(user_id, "Wallet", 10.0, &state.db_connection.lock().unwrap());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .delete(&format!("/api/accounts/{}", account.id))
            .add_header("Authorization", format!("Bearer {token}"))
            .await
            .assert_status_ok();

        server
            .get(&format!("/api/accounts/{}", account.id))
            .add_header("Authorization", format!("Bearer {token}"))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn account_with_transactions_is_conflict() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let user_id = must_get_user_id("foo@bar.baz", &state);
        let account = {
            let connection = state.db_connection.lock().unwrap();
            let account = insert_test_account(user_id, "Wallet", 10.0, &connection);
            let category_id = insert_test_category("Salary", true, &connection);
            crate::record_income(
                &crate::Movement {
                    amount: 5.0,
                    date: time::OffsetDateTime::now_utc(),
                    description: "pay".to_owned(),
                    category_id,
                    account_id: account.id,
                },
                user_id,
                &connection,
            )
            .unwrap();
            account
        };
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .delete(&format!("/api/accounts/{}", account.id))
            .add_header("Authorization", format!("Bearer {token}"))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}
