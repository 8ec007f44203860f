//! Defines the endpoints for reading categories.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, Path, State};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::core::{
        Category, CategoryKind, CategoryStatistics, CategoryUsage, get_all_categories,
        get_categories_by_kind, get_category, get_category_statistics, get_category_usage,
    },
    db::lock_connection,
    extract::IdPath,
    response::Success,
};

/// The state needed to read categories.
#[derive(Debug, Clone)]
pub struct CategoriesState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn list_categories_endpoint(
    State(state): State<CategoriesState>,
) -> Result<Success<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_categories(&connection).map(Success::ok)
}

pub async fn get_category_endpoint(
    State(state): State<CategoriesState>,
    IdPath(category_id): IdPath,
) -> Result<Success<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_category(category_id, &connection).map(Success::ok)
}

/// A route handler that reports whether any transactions or budgets refer to a category.
pub async fn get_category_usage_endpoint(
    State(state): State<CategoriesState>,
    IdPath(category_id): IdPath,
) -> Result<Success<CategoryUsage>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_category_usage(category_id, &connection).map(Success::ok)
}

/// A route handler that lists either the income or the expense categories.
///
/// The path segment must be "income" or "expense".
pub async fn list_categories_by_kind_endpoint(
    State(state): State<CategoriesState>,
    Path(raw_kind): Path<String>,
) -> Result<Success<Vec<Category>>, Error> {
    let kind = CategoryKind::parse(&raw_kind)?;
    let connection = lock_connection(&state.db_connection)?;

    get_categories_by_kind(kind, &connection).map(Success::ok)
}

pub async fn get_category_statistics_endpoint(
    State(state): State<CategoriesState>,
) -> Result<Success<CategoryStatistics>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_category_statistics(&connection).map(Success::ok)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::test_utils::{get_test_app, insert_test_category, log_in_test_user};

    #[tokio::test]
    async fn lists_expense_categories() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let rent_id = {
            let connection = state.db_connection.lock().unwrap();
            insert_test_category("Salary", true, &connection);
            insert_test_category("Rent", false, &connection)
        };
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .get("/api/categories/type/expense")
            .add_header("Authorization", format!("Bearer {token}"))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "success": true,
            "data": [{"id": rent_id, "name": "Rent", "is_income": false}]
        }));
    }

    #[tokio::test]
    async fn unknown_kind_is_bad_request() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .get("/api/categories/type/savings")
            .add_header("Authorization", format!("Bearer {token}"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reports_statistics() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        {
            let connection = state.db_connection.lock().unwrap();
            insert_test_category("Salary", true, &connection);
            insert_test_category("Rent", false, &connection);
        }
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .get("/api/categories/statistics")
            .add_header("Authorization", format!("Bearer {token}"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body["data"],
            json!({"total": 2, "income_count": 1, "expense_count": 1})
        );
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .get("/api/categories/5")
            .add_header("Authorization", format!("Bearer {token}"))
            .await
            .assert_status_not_found();

        server
            .get("/api/categories/5/usage")
            .add_header("Authorization", format!("Bearer {token}"))
            .await
            .assert_status_not_found();
    }
}
