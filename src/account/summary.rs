//! Aggregate views over the logged in user's accounts, grouped by account type.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{
    AppState, Error, account_type::AccountTypeId, auth::CurrentUser, db::lock_connection,
    response::Success, user::UserID,
};

/// Totals for the accounts of a single account type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTypeSummary {
    pub account_type_id: AccountTypeId,
    pub account_type: String,
    pub account_count: i64,
    pub total_balance: f64,
    pub average_balance: f64,
}

/// Totals over all of a user's accounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTotals {
    pub account_count: i64,
    pub total_balance: f64,
    pub average_balance: f64,
}

/// Totals over all of a user's accounts, and per account type that the user has accounts of.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountStatistics {
    pub summary: AccountTotals,
    pub by_type: Vec<AccountTypeSummary>,
}

fn map_row_to_type_summary(row: &Row) -> Result<AccountTypeSummary, rusqlite::Error> {
    Ok(AccountTypeSummary {
        account_type_id: row.get(0)?,
        account_type: row.get(1)?,
        account_count: row.get(2)?,
        total_balance: row.get(3)?,
        average_balance: row.get(4)?,
    })
}

/// Summarise the user's accounts for every account type, ordered by account type name.
///
/// Account types the user has no accounts of are included with zero totals.
pub fn get_account_summary(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<AccountTypeSummary>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.name, COUNT(a.id),
                COALESCE(SUM(a.balance), 0.0), COALESCE(AVG(a.balance), 0.0)
            FROM account_type t
            LEFT JOIN account a ON a.account_type_id = t.id AND a.user_id = ?1
            GROUP BY t.id
            ORDER BY t.name",
        )?
        .query_map([user_id.as_i64()], map_row_to_type_summary)?
        .map(|maybe_summary| maybe_summary.map_err(Error::from))
        .collect()
}

/// Get the overall totals for the user's accounts and the totals for each account type in use.
pub fn get_account_statistics(
    user_id: UserID,
    connection: &Connection,
) -> Result<AccountStatistics, Error> {
    let summary = connection.query_row(
        "SELECT COUNT(id), COALESCE(SUM(balance), 0.0), COALESCE(AVG(balance), 0.0)
        FROM account WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| {
            Ok(AccountTotals {
                account_count: row.get(0)?,
                total_balance: row.get(1)?,
                average_balance: row.get(2)?,
            })
        },
    )?;

    let by_type = connection
        .prepare(
            "SELECT t.id, t.name, COUNT(a.id), SUM(a.balance), AVG(a.balance)
            FROM account a
            INNER JOIN account_type t ON a.account_type_id = t.id
            WHERE a.user_id = ?1
            GROUP BY t.id
            ORDER BY t.name",
        )?
        .query_map([user_id.as_i64()], map_row_to_type_summary)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AccountStatistics { summary, by_type })
}

/// The state needed to summarise accounts.
#[derive(Debug, Clone)]
pub struct AccountSummaryState {
    /// The database connection for reading accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountSummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn get_account_summary_endpoint(
    State(state): State<AccountSummaryState>,
    user: CurrentUser,
) -> Result<Success<Vec<AccountTypeSummary>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_account_summary(user.id, &connection).map(Success::ok)
}

pub async fn get_account_statistics_endpoint(
    State(state): State<AccountSummaryState>,
    user: CurrentUser,
) -> Result<Success<AccountStatistics>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_account_statistics(user.id, &connection).map(Success::ok)
}
