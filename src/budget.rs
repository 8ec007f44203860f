//! Budgets set a spending limit for a category over a date range.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::{
    AppState, Error,
    auth::CurrentUser,
    category::{CategoryId, get_category},
    database_id::DatabaseId,
    db::lock_connection,
    extract::{ValidatedJson, required},
    response::Success,
    user::UserID,
};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub type BudgetId = DatabaseId;

/// A limit on how much may be spent in a category between two dates, inclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    /// The ID of the budget in the database.
    pub id: BudgetId,
    /// The most that should be spent in the category over the date range.
    pub limit_amount: f64,
    /// The first day the budget applies to.
    #[serde(with = "iso_date")]
    pub start_date: Date,
    /// The last day the budget applies to. Never before `start_date`.
    #[serde(with = "iso_date")]
    pub end_date: Date,
    /// The user that owns the budget.
    pub user_id: UserID,
    /// The category whose spending is limited.
    pub category_id: CategoryId,
}

/// The data needed to create a [Budget]. The owner is supplied separately.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub limit_amount: f64,
    pub start_date: Date,
    pub end_date: Date,
    pub category_id: CategoryId,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            limit_amount REAL NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        limit_amount: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        user_id: UserID::new(row.get(4)?),
        category_id: row.get(5)?,
    })
}

/// Create a budget owned by `user_id`.
///
/// # Errors
/// Returns [Error::InvalidDateRange] if the end date is before the start date, or
/// [Error::CategoryNotFound] if the category does not exist.
pub fn create_budget(
    new_budget: NewBudget,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    if new_budget.end_date < new_budget.start_date {
        return Err(Error::InvalidDateRange);
    }

    get_category(new_budget.category_id, connection)?;

    connection.execute(
        "INSERT INTO budget (limit_amount, start_date, end_date, user_id, category_id)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            new_budget.limit_amount,
            new_budget.start_date,
            new_budget.end_date,
            user_id.as_i64(),
            new_budget.category_id,
        ),
    )?;

    Ok(Budget {
        id: connection.last_insert_rowid(),
        limit_amount: new_budget.limit_amount,
        start_date: new_budget.start_date,
        end_date: new_budget.end_date,
        user_id,
        category_id: new_budget.category_id,
    })
}

/// Get the budgets owned by `user_id`, most recent first.
pub fn get_budgets_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, limit_amount, start_date, end_date, user_id, category_id FROM budget
            WHERE user_id = ?1 ORDER BY start_date DESC, id DESC",
        )?
        .query_map([user_id.as_i64()], map_row_to_budget)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// The state needed by the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a budget. Dates are formatted as "YYYY-MM-DD".
#[derive(Debug, Deserialize, Validate)]
pub struct BudgetData {
    #[validate(required, range(exclusive_min = 0.0))]
    pub limit_amount: Option<f64>,
    #[serde(default, with = "iso_date::option")]
    #[validate(required)]
    pub start_date: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    #[validate(required)]
    pub end_date: Option<Date>,
    #[validate(required, range(min = 1))]
    pub category_id: Option<CategoryId>,
}

/// A route handler for creating a budget for the logged in user.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    user: CurrentUser,
    ValidatedJson(data): ValidatedJson<BudgetData>,
) -> Result<Success<Budget>, Error> {
    let new_budget = NewBudget {
        limit_amount: required(data.limit_amount, "limit_amount")?,
        start_date: required(data.start_date, "start_date")?,
        end_date: required(data.end_date, "end_date")?,
        category_id: required(data.category_id, "category_id")?,
    };
    let connection = lock_connection(&state.db_connection)?;

    let budget = create_budget(new_budget, user.id, &connection)?;

    Ok(Success::created(budget).with_message("budget created"))
}

/// A route handler that lists the logged in user's budgets.
pub async fn list_budgets_endpoint(
    State(state): State<BudgetState>,
    user: CurrentUser,
) -> Result<Success<Vec<Budget>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_budgets_for_user(user.id, &connection).map(Success::ok)
}


#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        budget::{NewBudget, create_budget, get_budgets_for_user},
        test_utils::{get_test_connection, insert_test_category, insert_test_user},
        user::UserID,
    };

    #[test]
    fn creates_and_lists_budget() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);
        let category_id = insert_test_category("Groceries", false, &connection);

        let budget = create_budget(
            NewBudget {
                limit_amount: 400.0,
                start_date: date!(2025 - 03 - 01),
                end_date: date!(2025 - 03 - 31),
                category_id,
            },
            user.id,
            &connection,
        )
        .unwrap();

        assert_eq!(get_budgets_for_user(user.id, &connection), Ok(vec![budget]));
    }

    #[test]
    fn single_day_budget_is_allowed() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);
        let category_id = insert_test_category("Groceries", false, &connection);

        let result = create_budget(
            NewBudget {
                limit_amount: 20.0,
                start_date: date!(2025 - 03 - 01),
                end_date: date!(2025 - 03 - 01),
                category_id,
            },
            user.id,
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);
        let category_id = insert_test_category("Groceries", false, &connection);

        let result = create_budget(
            NewBudget {
                limit_amount: 400.0,
                start_date: date!(2025 - 03 - 31),
                end_date: date!(2025 - 03 - 01),
                category_id,
            },
            user.id,
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidDateRange));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);

        let result = create_budget(
            NewBudget {
                limit_amount: 400.0,
                start_date: date!(2025 - 03 - 01),
                end_date: date!(2025 - 03 - 31),
                category_id: 42,
            },
            user.id,
            &connection,
        );

        assert_eq!(result, Err(Error::CategoryNotFound));
    }

    #[test]
    fn unknown_user_is_not_reported_as_missing_category() {
        let connection = get_test_connection();
        let category_id = insert_test_category("Groceries", false, &connection);

        let result = create_budget(
            NewBudget {
                limit_amount: 400.0,
                start_date: date!(2025 - 03 - 01),
                end_date: date!(2025 - 03 - 31),
                category_id,
            },
            UserID::new(42),
            &connection,
        );

        assert!(
            matches!(result, Err(Error::SqlError(_))),
            "got {result:?}"
        );
    }

    #[test]
    fn lists_only_own_budgets() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);
        let other_user = insert_test_user("bar@baz.qux", &connection);
        let category_id = insert_test_category("Groceries", false, &connection);
        create_budget(
            NewBudget {
                limit_amount: 400.0,
                start_date: date!(2025 - 03 - 01),
                end_date: date!(2025 - 03 - 31),
                category_id,
            },
            other_user.id,
            &connection,
        )
        .unwrap();

        assert_eq!(get_budgets_for_user(user.id, &connection), Ok(vec![]));
    }
}
