//! Defines the endpoints for recording income and expenses.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;
use validator::Validate;

use crate::{
    AppState, Error,
    account::AccountId,
    auth::CurrentUser,
    category::CategoryId,
    db::lock_connection,
    extract::ValidatedJson,
    response::Success,
    transaction::{
        core::Transaction,
        ledger::{Movement, record_expense, record_income},
    },
};

/// The state needed to record movements.
#[derive(Debug, Clone)]
pub struct MovementState {
    /// The database connection for recording transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MovementState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for an income or expense.
///
/// Fields are optional here so that a missing field gives "missing data" rather than a JSON
/// error. The date is an RFC 3339 timestamp and defaults to now.
#[derive(Debug, Deserialize, Validate)]
pub struct MovementData {
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub category_id: Option<CategoryId>,
    #[validate(range(min = 0))]
    pub account_id: Option<AccountId>,
}

impl TryFrom<MovementData> for Movement {
    type Error = Error;

    fn try_from(data: MovementData) -> Result<Self, Self::Error> {
        match data {
            MovementData {
                amount: Some(amount),
                date,
                description: Some(description),
                category_id: Some(category_id),
                account_id: Some(account_id),
            } => Ok(Movement {
                amount,
                date: date.unwrap_or_else(OffsetDateTime::now_utc),
                description,
                category_id,
                account_id,
            }),
            _ => Err(Error::MissingMovementData),
        }
    }
}

/// A route handler for recording income into one of the logged in user's accounts.
pub async fn record_income_endpoint(
    State(state): State<MovementState>,
    user: CurrentUser,
    ValidatedJson(data): ValidatedJson<MovementData>,
) -> Result<Success<Transaction>, Error> {
    let movement = Movement::try_from(data)?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = record_income(&movement, user.id, &connection)?;

    Ok(Success::created(transaction).with_message("income recorded"))
}

/// A route handler for recording an expense from one of the logged in user's accounts.
pub async fn record_expense_endpoint(
    State(state): State<MovementState>,
    user: CurrentUser,
    ValidatedJson(data): ValidatedJson<MovementData>,
) -> Result<Success<Transaction>, Error> {
    let movement = Movement::try_from(data)?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = record_expense(&movement, user.id, &connection)?;

    Ok(Success::created(transaction).with_message("expense recorded"))
}

#[cfg(test)]
mod tests {
    use std::future::IntoFuture;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        AppState,
        account::Account,
        test_utils::{
            get_test_app, insert_test_account, insert_test_category, log_in_test_user,
            must_get_balance, must_get_user_id,
        },
    };

    const INCOME: &str = "/api/transactions/income";
    const EXPENSE: &str = "/api/transactions/expense";

    fn set_up(state: &AppState) -> (String, Account, i64, i64) {
        let token = log_in_test_user("foo@bar.baz", state);
        let user_id = must_get_user_id("foo@bar.baz", state);
        let connection = state.db_connection.lock().unwrap();
        let account = insert_test_account(user_id, "Wallet", 100.0, &connection);
        let salary = insert_test_category("Salary", true, &connection);
        let groceries = insert_test_category("Groceries", false, &connection);

        (token, account, salary, groceries)
    }

    #[tokio::test]
    async fn income_is_recorded() {
        let (app, state) = get_test_app();
        let (token, account, salary, _) = set_up(&state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post(INCOME)
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({
                "amount": 50.0,
                "date": "2025-03-04T05:06:07Z",
                "description": "Pay day",
                "category_id": salary,
                "account_id": account.id
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "income recorded");
        assert_eq!(body["data"]["amount"], 50.0);
        assert_eq!(body["data"]["date"], "2025-03-04T05:06:07Z");
        assert_eq!(
            must_get_balance(account.id, &state.db_connection.lock().unwrap()),
            150.0
        );
    }

    #[tokio::test]
    async fn expense_without_date_is_recorded() {
        let (app, state) = get_test_app();
        let (token, account, _, groceries) = set_up(&state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .post(EXPENSE)
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({
                "amount": 30.0,
                "description": "Vegetables",
                "category_id": groceries,
                "account_id": account.id
            }))
            .await
            .assert_status(StatusCode::CREATED);

        assert_eq!(
            must_get_balance(account.id, &state.db_connection.lock().unwrap()),
            70.0
        );
    }

    #[tokio::test]
    async fn zero_amount_is_missing_data() {
        let (app, state) = get_test_app();
        let (token, account, salary, _) = set_up(&state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post(INCOME)
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({
                "amount": 0,
                "description": "Nothing",
                "category_id": salary,
                "account_id": account.id
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "success": false,
            "error": "could not record transaction",
            "message": "missing data"
        }));
    }

    #[tokio::test]
    async fn missing_description_is_missing_data() {
        let (app, state) = get_test_app();
        let (token, account, salary, _) = set_up(&state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post(INCOME)
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({"amount": 5, "category_id": salary, "account_id": account.id}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "missing data");
    }

    #[tokio::test]
    async fn negative_amount_is_invalid() {
        let (app, state) = get_test_app();
        let (token, account, salary, _) = set_up(&state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post(INCOME)
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({
                "amount": -5,
                "description": "Sneaky",
                "category_id": salary,
                "account_id": account.id
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "invalid data");
        assert_eq!(body["details"][0]["field"], "amount");
    }

    #[tokio::test]
    async fn other_users_account_is_not_found() {
        let (app, state) = get_test_app();
        let (_, account, salary, _) = set_up(&state);
        let intruder_token = log_in_test_user("bar@baz.qux", &state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .post(INCOME)
            .add_header("Authorization", format!("Bearer {intruder_token}"))
            .json(&json!({
                "amount": 5,
                "description": "Not mine",
                "category_id": salary,
                "account_id": account.id
            }))
            .await
            .assert_status_not_found();

        assert_eq!(
            must_get_balance(account.id, &state.db_connection.lock().unwrap()),
            100.0
        );
    }

    #[tokio::test]
    async fn requires_token() {
        let (app, _) = get_test_app();
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.post(INCOME).json(&json!({"amount": 5})).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"success": false, "error": "not authorized"}));
    }

    #[tokio::test]
    async fn concurrent_movements_are_all_applied() {
        let (app, state) = get_test_app();
        let (token, account, salary, groceries) = set_up(&state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let income = server
            .post(INCOME)
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({
                "amount": 40.0,
                "description": "Bonus",
                "category_id": salary,
                "account_id": account.id
            }));
        let expense = server
            .post(EXPENSE)
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({
                "amount": 15.0,
                "description": "Snacks",
                "category_id": groceries,
                "account_id": account.id
            }));

        let (income_response, expense_response) =
            tokio::join!(income.into_future(), expense.into_future());

        income_response.assert_status(StatusCode::CREATED);
        expense_response.assert_status(StatusCode::CREATED);
        assert_eq!(
            must_get_balance(account.id, &state.db_connection.lock().unwrap()),
            125.0
        );
    }
}
