//! Defines the endpoints for updating an account and setting its balance.
use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState, Error,
    account::core::{Account, AccountChanges, set_account_balance, update_account},
    auth::CurrentUser,
    db::lock_connection,
    extract::{IdPath, ValidatedJson, required},
    response::Success,
};

/// The state needed to edit an account.
#[derive(Debug, Clone)]
pub struct EditAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields of an account that may be changed. Missing fields are left as is.
#[derive(Debug, Deserialize, Validate)]
pub struct AccountUpdate {
    #[validate(length(min = 1, max = 35))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub account_type_id: Option<i64>,
    #[validate(range(min = 0.0))]
    pub balance: Option<f64>,
}

/// A route handler for changing some of the fields of an account.
pub async fn edit_account_endpoint(
    State(state): State<EditAccountState>,
    user: CurrentUser,
    IdPath(account_id): IdPath,
    ValidatedJson(update): ValidatedJson<AccountUpdate>,
) -> Result<Success<Account>, Error> {
    let changes = AccountChanges {
        name: update.name,
        account_type_id: update.account_type_id,
        balance: update.balance,
    };
    let connection = lock_connection(&state.db_connection)?;

    let account = update_account(account_id, user.id, changes, &connection)?;

    Ok(Success::ok(account).with_message("account updated"))
}

/// The request body for overwriting an account's balance.
#[derive(Debug, Deserialize, Validate)]
pub struct BalanceData {
    #[validate(required, range(min = 0.0))]
    pub balance: Option<f64>,
}

/// A route handler for overwriting the balance of an account, e.g. to reconcile with a bank
/// statement.
pub async fn set_account_balance_endpoint(
    State(state): State<EditAccountState>,
    user: CurrentUser,
    IdPath(account_id): IdPath,
    ValidatedJson(data): ValidatedJson<BalanceData>,
) -> Result<Success<Account>, Error> {
    let balance = required(data.balance, "balance")?;
    let connection = lock_connection(&state.db_connection)?;

    let account = set_account_balance(account_id, user.id, balance, &connection)?;

    Ok(Success::ok(account).with_message("balance updated"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::test_utils::{get_test_app, insert_test_account, log_in_test_user, must_get_user_id};

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let user_id = must_get_user_id("foo@bar.baz", &state);
        let account =
            insert_test_account(user_id, "Wallet", 10.0, &state.db_connection.lock().unwrap());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .put(&format!("/api/accounts/{}", account.id))
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({"name": "Purse"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["name"], "Purse");
        assert_eq!(body["data"]["balance"], 10.0);
    }

    #[tokio::test]
    async fn other_users_account_is_not_found() {
        let (app, state) = get_test_app();
        log_in_test_user("foo@bar.baz", &state);
        let token = log_in_test_user("bar@baz.qux", &state);
        let owner_id = must_get_user_id("foo@bar.baz", &state);
        let account =
            insert_test_account(owner_id, "Wallet", 10.0, &state.db_connection.lock().unwrap());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .put(&format!("/api/accounts/{}", account.id))
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({"name": "Mine now"}))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn sets_balance() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let user_id = must_get_user_id("foo@bar.baz", &state);
        let account =
            insert_test_account(user_id, "Wallet", 10.0, &state.db_connection.lock().unwrap());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .put(&format!("/api/accounts/{}/balance", account.id))
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({"balance": 250.0}))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["balance"], 250.0);
    }

    #[tokio::test]
    async fn negative_balance_is_rejected() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let user_id = must_get_user_id("foo@bar.baz", &state);
        let account =
            insert_test_account(user_id, "Wallet", 10.0, &state.db_connection.lock().unwrap());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .put(&format!("/api/accounts/{}/balance", account.id))
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({"balance": -5.0}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
