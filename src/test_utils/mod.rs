//! Helpers shared by the unit tests.

use axum::Router;
use rusqlite::Connection;

use crate::{
    AppState, PasswordHash, ValidatedPassword, build_router,
    account::{Account, AccountId},
    account_type::AccountTypeId,
    category::CategoryId,
    user::{NewUser, User, UserID, create_user},
};

/// The password of every user created by [insert_test_user].
pub const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// Get a router backed by an empty in-memory database, and the state it was built with.
#[track_caller]
pub fn get_test_app() -> (Router, AppState) {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    let state = AppState::new(connection, "foobar", "finanzas-test")
        .expect("Could not create app state");

    (build_router(state.clone()), state)
}

/// Get an in-memory database with all of the tables created.
#[track_caller]
pub fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    crate::db::initialize(&connection).expect("Could not initialize database");
    connection
}

/// Insert a user with the name "Test User" and the password [TEST_PASSWORD].
///
/// The password is hashed with the minimum cost to keep the tests fast.
#[track_caller]
pub fn insert_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        NewUser {
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: email.to_owned(),
            phone: "021 123 4567".to_owned(),
            password_hash: PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
                .expect("Could not hash password"),
        },
        connection,
    )
    .expect("Could not create test user")
}

/// Register a user with `email` and return a valid access token for them.
#[track_caller]
pub fn log_in_test_user(email: &str, state: &AppState) -> String {
    let connection = state.db_connection.lock().unwrap();
    let user = insert_test_user(email, &connection);

    state
        .token_service
        .issue(user.id, &user.email)
        .expect("Could not issue token")
}

/// Get the ID of the user registered with `email`.
#[track_caller]
pub fn must_get_user_id(email: &str, state: &AppState) -> UserID {
    let connection = state.db_connection.lock().unwrap();

    crate::user::get_user_by_email(email, &connection)
        .expect("Could not query user")
        .expect("No user with that email")
        .id
}

#[track_caller]
pub fn insert_test_account_type(name: &str, connection: &Connection) -> AccountTypeId {
    connection
        .execute("INSERT INTO account_type (name) VALUES (?1)", [name])
        .expect("Could not insert account type");

    connection.last_insert_rowid()
}

#[track_caller]
pub fn insert_test_category(name: &str, is_income: bool, connection: &Connection) -> CategoryId {
    connection
        .execute(
            "INSERT INTO category (name, is_income) VALUES (?1, ?2)",
            (name, is_income),
        )
        .expect("Could not insert category");

    connection.last_insert_rowid()
}

/// Insert an account of a new account type named after the account.
#[track_caller]
pub fn insert_test_account(
    user_id: UserID,
    name: &str,
    balance: f64,
    connection: &Connection,
) -> Account {
    let account_type_id = insert_test_account_type(&format!("{name} type {}", user_id), connection);

    connection
        .execute(
            "INSERT INTO account (name, user_id, account_type_id, balance) VALUES (?1, ?2, ?3, ?4)",
            (name, user_id.as_i64(), account_type_id, balance),
        )
        .expect("Could not insert account");

    Account {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
        user_id,
        account_type_id,
        balance,
    }
}

#[track_caller]
pub fn must_get_balance(account_id: AccountId, connection: &Connection) -> f64 {
    connection
        .query_row(
            "SELECT balance FROM account WHERE id = ?1",
            [account_id],
            |row| row.get(0),
        )
        .expect("Could not get account balance")
}
