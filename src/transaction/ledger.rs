//! Records income and expenses and keeps account balances in step with them.
//!
//! Each movement is written in a single SQLite transaction that inserts the transaction row and
//! adjusts the balance of its account. If any step fails, the SQLite transaction is rolled back
//! when it is dropped, so a transaction row never exists without its balance change.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    account::{AccountId, get_account},
    category::{CategoryId, get_category},
    transaction::core::{Transaction, get_transaction},
    user::UserID,
};

/// Money moving into or out of an account.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    /// How much money moved. Must be greater than zero.
    pub amount: f64,
    /// When the money moved. Stored in UTC whatever the offset given.
    pub date: OffsetDateTime,
    /// What the money was for.
    pub description: String,
    /// The category the movement is recorded under.
    pub category_id: CategoryId,
    /// The account the money moved in or out of. Must belong to the acting user.
    pub account_id: AccountId,
}

impl Movement {
    /// Whether every field has a usable value.
    ///
    /// A zero amount, blank description or zero ID counts as missing.
    fn is_complete(&self) -> bool {
        self.amount.is_finite()
            && self.amount > 0.0
            && !self.description.trim().is_empty()
            && self.category_id > 0
            && self.account_id > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    In,
    Out,
}

/// Record money earned into an account owned by `user_id`, adding it to the balance.
///
/// # Errors
/// Returns:
/// - [Error::MissingMovementData] if the movement is incomplete.
/// - [Error::CategoryNotFound] if the category does not exist.
/// - [Error::AccountNotFound] if the account does not exist or belongs to another user.
/// - [Error::MovementFailed] if the insert or balance update did not change a row.
/// - [Error::SqlError] for any other SQL error.
///
/// Nothing is written if an error is returned.
pub fn record_income(
    movement: &Movement,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    record_movement(movement, Direction::In, user_id, connection)
}

/// Record money spent from an account owned by `user_id`, subtracting it from the balance.
///
/// The balance is allowed to go below zero.
///
/// # Errors
/// Returns the same errors as [record_income].
pub fn record_expense(
    movement: &Movement,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    record_movement(movement, Direction::Out, user_id, connection)
}

fn record_movement(
    movement: &Movement,
    direction: Direction,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !movement.is_complete() {
        return Err(Error::MissingMovementData);
    }

    // IMMEDIATE takes the write lock up front so that concurrent movements on other connections
    // wait instead of failing part way through.
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_category(movement.category_id, &transaction)?;
    get_account(movement.account_id, user_id, &transaction)?;

    let rows_inserted = transaction.execute(
        "INSERT INTO \"transaction\" (amount, date, description, category_id, account_id)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            movement.amount,
            // Dates are compared as text when sorting, so they must share an offset.
            movement.date.to_offset(UtcOffset::UTC),
            &movement.description,
            movement.category_id,
            movement.account_id,
        ),
    )?;

    if rows_inserted == 0 {
        tracing::error!(
            "inserting a movement into account {} did not add a row",
            movement.account_id
        );
        return Err(Error::MovementFailed);
    }

    let transaction_id = transaction.last_insert_rowid();

    let delta = match direction {
        Direction::In => movement.amount,
        Direction::Out => -movement.amount,
    };

    let rows_updated = transaction.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2 AND user_id = ?3",
        (delta, movement.account_id, user_id.as_i64()),
    )?;

    if rows_updated != 1 {
        tracing::error!(
            "adjusting the balance of account {} updated {rows_updated} rows",
            movement.account_id
        );
        return Err(Error::MovementFailed);
    }

    let recorded = get_transaction(transaction_id, &transaction)?;

    transaction.commit()?;

    tracing::debug!(
        "recorded {:?} movement {} of {} on account {}",
        direction,
        recorded.id,
        recorded.amount,
        recorded.account_id
    );

    Ok(recorded)
}
