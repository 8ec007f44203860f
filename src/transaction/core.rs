//! Defines the transaction model and the queries for reading transactions.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error, account::AccountId, category::CategoryId, database_id::DatabaseId, user::UserID,
};

pub type TransactionId = DatabaseId;

/// An income or expense recorded against an account.
///
/// Transactions are only created by the ledger and are never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money moved. Always positive, the category says which way it went.
    pub amount: f64,
    /// When the money was moved.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The ID of the account the money was moved in or out of.
    pub account_id: AccountId,
}

/// Create the transaction table.
///
/// `transaction` is a keyword in SQL, so the table name must always be quoted.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL CHECK (amount > 0),
            date TIMESTAMP NOT NULL,
            description TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            account_id INTEGER NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_account ON \"transaction\"(account_id)",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        amount: row.get(1)?,
        date: row.get(2)?,
        description: row.get(3)?,
        category_id: row.get(4)?,
        account_id: row.get(5)?,
    })
}

/// Get a transaction by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such transaction.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .query_row(
            "SELECT id, amount, date, description, category_id, account_id
            FROM \"transaction\" WHERE id = ?1",
            [id],
            map_row_to_transaction,
        )
        .map_err(Error::from)
}

/// Get the transactions on the accounts owned by `user_id`, newest first.
pub fn get_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.amount, t.date, t.description, t.category_id, t.account_id
            FROM \"transaction\" t
            INNER JOIN account a ON t.account_id = a.id
            WHERE a.user_id = ?1
            ORDER BY t.date DESC, t.id DESC",
        )?
        .query_map([user_id.as_i64()], map_row_to_transaction)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use super::create_transaction_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_transaction_table(&connection));
    }
}
