//! Defines the endpoint for updating a category.
use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState, Error,
    category::core::{Category, CategoryChanges, update_category},
    db::lock_connection,
    extract::{IdPath, ValidatedJson},
    response::Success,
};

/// The state needed to edit a category.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields of a category that may be changed.
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 30))]
    pub name: Option<String>,
    pub is_income: Option<bool>,
}

/// A route handler for changing the name and/or kind of a category.
pub async fn edit_category_endpoint(
    State(state): State<EditCategoryState>,
    IdPath(category_id): IdPath,
    ValidatedJson(update): ValidatedJson<CategoryUpdate>,
) -> Result<Success<Category>, Error> {
    let changes = CategoryChanges {
        name: update.name,
        is_income: update.is_income,
    };
    let connection = lock_connection(&state.db_connection)?;

    let category = update_category(category_id, changes, &connection)?;

    Ok(Success::ok(category).with_message("category updated"))
}
