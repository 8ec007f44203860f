//! Code for creating the user table, fetching users, and the endpoints for the current user.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use axum::extract::{FromRef, State};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash, auth::CurrentUser, db::lock_connection, response::Success,
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub last_name: String,
    /// The email address the user logs in with.
    pub email: String,
    /// The user's phone number.
    pub phone: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

impl User {
    /// The name shown to the user after logging in, e.g. "Ada-Lovelace".
    pub fn display_name(&self) -> String {
        format!("{}-{}", self.first_name, self.last_name)
    }
}

/// The data needed to register a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: PasswordHash,
}

/// The parts of a [User] that are safe to send to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: UserID,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
        }
    }
}

/// Create the user table.
///
/// Emails are compared case-insensitively.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                phone TEXT NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(5)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateEmail] if the email is already registered, or
/// [Error::SqlError] if another SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (first_name, last_name, email, phone, password)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &new_user.first_name,
            &new_user.last_name,
            &new_user.email,
            &new_user.phone,
            new_user.password_hash.as_str(),
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        email: new_user.email,
        phone: new_user.phone,
        password_hash: new_user.password_hash,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            "SELECT id, first_name, last_name, email, phone, password FROM user WHERE id = ?1",
            [user_id.as_i64()],
            map_row_to_user,
        )
        .map_err(Error::from)
}

/// Whether a user with `user_id` is registered.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn user_exists(user_id: UserID, connection: &Connection) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM user WHERE id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Get the user registered with `email`, ignoring case.
///
/// Returns `Ok(None)` if no user has registered with the email.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<Option<User>, Error> {
    connection
        .query_row(
            "SELECT id, first_name, last_name, email, phone, password FROM user WHERE email = ?1",
            [email],
            map_row_to_user,
        )
        .optional()
        .map_err(Error::from)
}

/// Delete a user along with their accounts, the transactions on those accounts and their budgets.
///
/// Everything is deleted in one SQL transaction, so either all of the user's data is deleted or
/// none of it is.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist, or [Error::SqlError] if an SQL related
/// error occurred.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let id = user_id.as_i64();

    transaction.execute(
        "DELETE FROM \"transaction\"
        WHERE account_id IN (SELECT id FROM account WHERE user_id = ?1)",
        [id],
    )?;
    transaction.execute("DELETE FROM budget WHERE user_id = ?1", [id])?;
    transaction.execute("DELETE FROM account WHERE user_id = ?1", [id])?;
    let rows_affected = transaction.execute("DELETE FROM user WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    transaction.commit()?;

    Ok(())
}

/// The state needed by the endpoints for the current user.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with the profile of the logged in user.
pub async fn get_profile_endpoint(
    State(state): State<UserState>,
    user: CurrentUser,
) -> Result<Success<UserProfile>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let user = get_user_by_id(user.id, &connection)?;

    Ok(Success::ok(user.into()))
}

/// A route handler that deletes the logged in user and all of their data.
pub async fn delete_current_user_endpoint(
    State(state): State<UserState>,
    user: CurrentUser,
) -> Result<Success<()>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_user(user.id, &connection)?;
    tracing::info!("Deleted user {}", user.id);

    Ok(Success::message("user deleted"))
}
