use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{Error, database_id::DatabaseId, db::is_unique_violation};

pub type AccountTypeId = DatabaseId;

/// A kind of account, e.g. "Savings" or "Credit Card".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountType {
    /// The id for the account type.
    pub id: AccountTypeId,
    /// The display name. Unique ignoring case.
    pub name: String,
}

/// Whether any accounts still use an account type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTypeUsage {
    /// The account type that was checked.
    pub id: AccountTypeId,
    /// Whether any account uses the type, in which case it cannot be deleted.
    pub in_use: bool,
    /// How many accounts, across all users, have this type.
    pub account_count: i64,
}

pub fn create_account_type_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account_type (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account_type(row: &Row) -> Result<AccountType, rusqlite::Error> {
    Ok(AccountType {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

pub fn get_account_type(id: AccountTypeId, connection: &Connection) -> Result<AccountType, Error> {
    connection
        .query_row(
            "SELECT id, name FROM account_type WHERE id = ?1",
            [id],
            map_row_to_account_type,
        )
        .map_err(Error::from)
}

pub fn get_all_account_types(connection: &Connection) -> Result<Vec<AccountType>, Error> {
    connection
        .prepare("SELECT id, name FROM account_type ORDER BY id")?
        .query_map([], map_row_to_account_type)?
        .map(|maybe_account_type| maybe_account_type.map_err(Error::from))
        .collect()
}

/// Whether an account type other than `exclude_id` already uses `name`, ignoring case.
fn name_is_taken(
    name: &str,
    exclude_id: Option<AccountTypeId>,
    connection: &Connection,
) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM account_type
        WHERE name = ?1 COLLATE NOCASE AND (?2 IS NULL OR id != ?2)",
        (name, exclude_id),
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Create an account type.
///
/// # Errors
/// Returns [Error::DuplicateAccountType] if another account type has the same name ignoring case.
pub fn create_account_type(name: &str, connection: &Connection) -> Result<AccountType, Error> {
    if name_is_taken(name, None, connection)? {
        return Err(Error::DuplicateAccountType(name.to_owned()));
    }

    connection
        .execute("INSERT INTO account_type (name) VALUES (?1)", [name])
        .map_err(|error| match error {
            error if is_unique_violation(&error) => Error::DuplicateAccountType(name.to_owned()),
            error => error.into(),
        })?;

    Ok(AccountType {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
    })
}

/// Rename an account type.
///
/// # Errors
/// Returns [Error::UpdateMissingAccountType] if the account type does not exist, or
/// [Error::DuplicateAccountType] if another account type has the same name ignoring case.
pub fn update_account_type(
    id: AccountTypeId,
    name: &str,
    connection: &Connection,
) -> Result<AccountType, Error> {
    if name_is_taken(name, Some(id), connection)? {
        return Err(Error::DuplicateAccountType(name.to_owned()));
    }

    let rows_affected = connection
        .execute(
            "UPDATE account_type SET name = ?1 WHERE id = ?2",
            (name, id),
        )
        .map_err(|error| match error {
            error if is_unique_violation(&error) => Error::DuplicateAccountType(name.to_owned()),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccountType);
    }

    Ok(AccountType {
        id,
        name: name.to_owned(),
    })
}

pub fn get_account_type_usage(
    id: AccountTypeId,
    connection: &Connection,
) -> Result<AccountTypeUsage, Error> {
    // Checked first so that an unknown ID is a 404 rather than unused.
    get_account_type(id, connection)?;

    let account_count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM account WHERE account_type_id = ?1",
        [id],
        |row| row.get(0),
    )?;

    Ok(AccountTypeUsage {
        id,
        in_use: account_count > 0,
        account_count,
    })
}

/// Delete an account type that no accounts use.
///
/// # Errors
/// Returns [Error::AccountTypeInUse] if any account has this type, or
/// [Error::DeleteMissingAccountType] if the account type does not exist.
pub fn delete_account_type(id: AccountTypeId, connection: &Connection) -> Result<(), Error> {
    let usage = match get_account_type_usage(id, connection) {
        Ok(usage) => usage,
        Err(Error::NotFound) => return Err(Error::DeleteMissingAccountType),
        Err(error) => return Err(error),
    };

    if usage.in_use {
        return Err(Error::AccountTypeInUse);
    }

    let rows_affected = connection.execute("DELETE FROM account_type WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAccountType);
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use crate::{
        Error,
        account_type::core::{
            AccountType, create_account_type, delete_account_type, get_account_type,
            get_account_type_usage, get_all_account_types, update_account_type,
        },
        test_utils::{get_test_connection, insert_test_account, insert_test_user},
    };

    #[test]
    fn create_then_get() {
        let connection = get_test_connection();

        let created = create_account_type("Savings", &connection).unwrap();

        assert_eq!(
            get_account_type(created.id, &connection),
            Ok(AccountType {
                id: created.id,
                name: "Savings".to_owned()
            })
        );
    }

    #[test]
    fn names_are_unique_ignoring_case() {
        let connection = get_test_connection();
        create_account_type("Savings", &connection).unwrap();

        let result = create_account_type("SAVINGS", &connection);

        assert_eq!(result, Err(Error::DuplicateAccountType("SAVINGS".to_owned())));
        assert_eq!(get_all_account_types(&connection).unwrap().len(), 1);
    }

    #[test]
    fn update_renames_account_type() {
        let connection = get_test_connection();
        let account_type = create_account_type("Savings", &connection).unwrap();

        update_account_type(account_type.id, "Term Deposit", &connection).unwrap();

        assert_eq!(
            get_account_type(account_type.id, &connection).unwrap().name,
            "Term Deposit"
        );
    }

    #[test]
    fn update_can_change_case_of_own_name() {
        let connection = get_test_connection();
        let account_type = create_account_type("savings", &connection).unwrap();

        let result = update_account_type(account_type.id, "Savings", &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn update_rejects_name_of_other_type() {
        let connection = get_test_connection();
        create_account_type("Savings", &connection).unwrap();
        let other = create_account_type("Checking", &connection).unwrap();

        let result = update_account_type(other.id, "savings", &connection);

        assert_eq!(result, Err(Error::DuplicateAccountType("savings".to_owned())));
    }

    #[test]
    fn update_missing_account_type_fails() {
        let connection = get_test_connection();

        assert_eq!(
            update_account_type(42, "Savings", &connection),
            Err(Error::UpdateMissingAccountType)
        );
    }

    #[test]
    fn delete_unused_account_type() {
        let connection = get_test_connection();
        let account_type = create_account_type("Savings", &connection).unwrap();

        delete_account_type(account_type.id, &connection).unwrap();

        assert_eq!(
            get_account_type(account_type.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_account_type_in_use_is_conflict() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);
        let account = insert_test_account(user.id, "Wallet", 0.0, &connection);

        let result = delete_account_type(account.account_type_id, &connection);

        assert_eq!(result, Err(Error::AccountTypeInUse));
        assert!(get_account_type(account.account_type_id, &connection).is_ok());
    }

    #[test]
    fn delete_missing_account_type_fails() {
        let connection = get_test_connection();

        assert_eq!(
            delete_account_type(42, &connection),
            Err(Error::DeleteMissingAccountType)
        );
    }

    #[test]
    fn usage_counts_accounts() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);
        let account = insert_test_account(user.id, "Wallet", 0.0, &connection);
        let unused = create_account_type("Unused", &connection).unwrap();

        let used = get_account_type_usage(account.account_type_id, &connection).unwrap();
        let unused = get_account_type_usage(unused.id, &connection).unwrap();

        assert!(used.in_use);
        assert_eq!(used.account_count, 1);
        assert!(!unused.in_use);
        assert_eq!(unused.account_count, 0);
    }
}
