use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::{
    Error,
    account_type::AccountTypeId,
    database_id::DatabaseId,
    db::is_unique_violation,
    user::UserID,
};

pub type AccountId = DatabaseId;

/// A bank account, credit card or cash wallet belonging to a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The name of the account, unique per user.
    pub name: String,
    /// The user that owns the account.
    pub user_id: UserID,
    /// The kind of account.
    pub account_type_id: AccountTypeId,
    /// The amount of money in the account.
    ///
    /// Expenses may take the balance below zero.
    pub balance: f64,
}

/// The data needed to open an account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub account_type_id: AccountTypeId,
    pub balance: f64,
}

/// The fields of an account to change. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub account_type_id: Option<AccountTypeId>,
    pub balance: Option<f64>,
}

impl AccountChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.account_type_id.is_none() && self.balance.is_none()
    }
}

/// Whether any transactions have been recorded against an account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountUsage {
    pub id: AccountId,
    pub in_use: bool,
    pub transaction_count: i64,
}

/// An account along with how many transactions have been recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountWithUsage {
    #[serde(flatten)]
    pub account: Account,
    pub transaction_count: i64,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE,
            user_id INTEGER NOT NULL,
            account_type_id INTEGER NOT NULL,
            balance REAL NOT NULL DEFAULT 0,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(account_type_id) REFERENCES account_type(id) ON UPDATE CASCADE ON DELETE RESTRICT
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        user_id: UserID::new(row.get(2)?),
        account_type_id: row.get(3)?,
        balance: row.get(4)?,
    })
}

/// Get an account owned by `user_id`.
///
/// # Errors
/// Returns [Error::AccountNotFound] if the account does not exist or belongs to another user.
pub fn get_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .query_row(
            "SELECT id, name, user_id, account_type_id, balance FROM account
            WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
            map_row_to_account,
        )
        .optional()?
        .ok_or(Error::AccountNotFound)
}

/// Get the accounts owned by `user_id`, ordered by name.
pub fn get_accounts_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, user_id, account_type_id, balance FROM account
            WHERE user_id = ?1 ORDER BY name",
        )?
        .query_map([user_id.as_i64()], map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

fn account_type_exists(id: AccountTypeId, connection: &Connection) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM account_type WHERE id = ?1",
        [id],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Open an account for `user_id`.
///
/// # Errors
/// Returns [Error::InvalidAccountType] if the account type does not exist, or
/// [Error::DuplicateAccountName] if the user already has an account with the same name.
pub fn create_account(
    new_account: NewAccount,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    if !account_type_exists(new_account.account_type_id, connection)? {
        return Err(Error::InvalidAccountType);
    }

    connection
        .execute(
            "INSERT INTO account (name, user_id, account_type_id, balance)
            VALUES (?1, ?2, ?3, ?4)",
            (
                &new_account.name,
                user_id.as_i64(),
                new_account.account_type_id,
                new_account.balance,
            ),
        )
        .map_err(|error| match error {
            // Handle unique account name constraint violation
            error if is_unique_violation(&error) => {
                Error::DuplicateAccountName(new_account.name.clone())
            }
            error => error.into(),
        })?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        name: new_account.name,
        user_id,
        account_type_id: new_account.account_type_id,
        balance: new_account.balance,
    })
}

/// Change some of the fields of an account owned by `user_id`.
///
/// # Errors
/// Returns [Error::NoFieldsToUpdate] if `changes` is empty, [Error::InvalidAccountType] if the
/// new account type does not exist, [Error::DuplicateAccountName] if the new name is taken and
/// [Error::UpdateMissingAccount] if the user has no such account.
pub fn update_account(
    id: AccountId,
    user_id: UserID,
    changes: AccountChanges,
    connection: &Connection,
) -> Result<Account, Error> {
    if changes.is_empty() {
        return Err(Error::NoFieldsToUpdate);
    }

    if let Some(account_type_id) = changes.account_type_id {
        if !account_type_exists(account_type_id, connection)? {
            return Err(Error::InvalidAccountType);
        }
    }

    let rows_affected = connection
        .execute(
            "UPDATE account
            SET name = COALESCE(?1, name),
                account_type_id = COALESCE(?2, account_type_id),
                balance = COALESCE(?3, balance)
            WHERE id = ?4 AND user_id = ?5",
            (
                &changes.name,
                changes.account_type_id,
                changes.balance,
                id,
                user_id.as_i64(),
            ),
        )
        .map_err(|error| match error {
            error if is_unique_violation(&error) => {
                Error::DuplicateAccountName(changes.name.clone().unwrap_or_default())
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    get_account(id, user_id, connection)
}

/// Overwrite the balance of an account owned by `user_id`.
///
/// # Errors
/// Returns [Error::UpdateMissingAccount] if the user has no such account.
pub fn set_account_balance(
    id: AccountId,
    user_id: UserID,
    balance: f64,
    connection: &Connection,
) -> Result<Account, Error> {
    let rows_affected = connection.execute(
        "UPDATE account SET balance = ?1 WHERE id = ?2 AND user_id = ?3",
        (balance, id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    get_account(id, user_id, connection)
}

pub fn get_account_usage(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<AccountUsage, Error> {
    get_account(id, user_id, connection)?;

    let transaction_count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM \"transaction\" WHERE account_id = ?1",
        [id],
        |row| row.get(0),
    )?;

    Ok(AccountUsage {
        id,
        in_use: transaction_count > 0,
        transaction_count,
    })
}

/// Get the accounts owned by `user_id` with their transaction counts, ordered by name.
pub fn get_accounts_with_usage(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<AccountWithUsage>, Error> {
    connection
        .prepare(
            "SELECT a.id, a.name, a.user_id, a.account_type_id, a.balance, COUNT(t.id)
            FROM account a
            LEFT JOIN \"transaction\" t ON t.account_id = a.id
            WHERE a.user_id = ?1
            GROUP BY a.id
            ORDER BY a.name",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok(AccountWithUsage {
                account: map_row_to_account(row)?,
                transaction_count: row.get(5)?,
            })
        })?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Delete an account owned by `user_id` that has no transactions.
///
/// # Errors
/// Returns [Error::AccountInUse] if there are transactions recorded against the account, or
/// [Error::DeleteMissingAccount] if the user has no such account.
pub fn delete_account(id: AccountId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let usage = match get_account_usage(id, user_id, connection) {
        Ok(usage) => usage,
        Err(Error::AccountNotFound) => return Err(Error::DeleteMissingAccount),
        Err(error) => return Err(error),
    };

    if usage.in_use {
        return Err(Error::AccountInUse);
    }

    let rows_affected = connection.execute(
        "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAccount);
    }

    Ok(())
}

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use super::create_account_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_account_table(&connection));
    }
}
