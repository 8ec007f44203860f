//! Defines the endpoint for renaming an account type.
use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState, Error,
    account_type::core::{AccountType, update_account_type},
    db::lock_connection,
    extract::{IdPath, ValidatedJson},
    response::Success,
};

/// The state needed to edit an account type.
#[derive(Debug, Clone)]
pub struct EditAccountTypeState {
    /// The database connection for managing account types.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountTypeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields of an account type that may be changed.
#[derive(Debug, Deserialize, Validate)]
pub struct AccountTypeUpdate {
    #[validate(length(min = 1, max = 30))]
    pub name: Option<String>,
}

/// A route handler for renaming an account type.
pub async fn edit_account_type_endpoint(
    State(state): State<EditAccountTypeState>,
    IdPath(account_type_id): IdPath,
    ValidatedJson(update): ValidatedJson<AccountTypeUpdate>,
) -> Result<Success<AccountType>, Error> {
    let name = update.name.ok_or(Error::NoFieldsToUpdate)?;
    let connection = lock_connection(&state.db_connection)?;

    let account_type = update_account_type(account_type_id, &name, &connection)?;

    Ok(Success::ok(account_type).with_message("account type updated"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::test_utils::{get_test_app, insert_test_account_type, log_in_test_user};

    #[tokio::test]
    async fn renames_account_type() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let id = insert_test_account_type("Savings", &state.db_connection.lock().unwrap());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .put(&format!("/api/account_types/{id}"))
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({"name": "Term Deposit"}))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["name"], "Term Deposit");
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let id = insert_test_account_type("Savings", &state.db_connection.lock().unwrap());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .put(&format!("/api/account_types/{id}"))
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_account_type_is_not_found() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .put("/api/account_types/42")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({"name": "Savings"}))
            .await
            .assert_status_not_found();
    }
}
