//! Defines the endpoint for deleting a category.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;

use crate::{
    AppState, Error, category::core::delete_category, db::lock_connection, extract::IdPath,
    response::Success,
};

/// The state needed to delete a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a category that no transactions or budgets refer to.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryState>,
    IdPath(category_id): IdPath,
) -> Result<Success<()>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_category(category_id, &connection)?;

    Ok(Success::message("category deleted"))
}
