//! Defines the endpoint for creating a new category.
use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState, Error,
    category::core::{Category, create_category},
    db::lock_connection,
    extract::{ValidatedJson, required},
    response::Success,
};

/// The state needed to create a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryData {
    #[validate(required, length(min = 1, max = 30))]
    pub name: Option<String>,
    #[validate(required)]
    pub is_income: Option<bool>,
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    ValidatedJson(data): ValidatedJson<CategoryData>,
) -> Result<Success<Category>, Error> {
    let name = required(data.name, "name")?;
    let is_income = required(data.is_income, "is_income")?;
    let connection = lock_connection(&state.db_connection)?;

    let category = create_category(&name, is_income, &connection)?;

    Ok(Success::created(category).with_message("category created"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::test_utils::{get_test_app, log_in_test_user};

    #[tokio::test]
    async fn can_create_category() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/api/categories")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({"name": "Salary", "is_income": true}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["name"], "Salary");
        assert_eq!(body["data"]["is_income"], true);
    }

    #[tokio::test]
    async fn same_name_with_other_flag_is_allowed() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        for is_income in [true, false] {
            server
                .post("/api/categories")
                .add_header("Authorization", format!("Bearer {token}"))
                .json(&json!({"name": "Gifts", "is_income": is_income}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .post("/api/categories")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({"name": "Gifts", "is_income": false}))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "duplicate");
    }

    #[tokio::test]
    async fn missing_flag_is_rejected() {
        let (app, state) = get_test_app();
        let token = log_in_test_user("foo@bar.baz", &state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/api/categories")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({"name": "Salary"}))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["details"][0]["field"], "is_income");
    }
}
