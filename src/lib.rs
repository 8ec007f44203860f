//! Finanzas is a REST backend for managing personal finances.
//!
//! Users keep a set of accounts, each with an account type and a running
//! balance. Income and expense movements are recorded against an account and
//! categorised, and budgets set spending limits per category over a date range.
//!
//! Every route except log in and registration requires a bearer access token.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod account;
mod account_type;
mod app_state;
mod auth;
mod budget;
mod category;
mod database_id;
mod db;
mod endpoints;
mod extract;
mod log_in;
mod logging;
mod password;
mod register_user;
mod response;
mod routing;
#[cfg(test)]
mod test_utils;
mod timeout;
mod transaction;
mod user;

pub use account::{Account, AccountId};
pub use app_state::AppState;
pub use auth::{Claims, TOKEN_LIFETIME_SECONDS, TokenService};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use timeout::timeout_middleware;
pub use transaction::{Movement, Transaction, record_expense, record_income};
pub use user::{User, UserID, get_user_by_email};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// A single problem found while validating a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The name of the offending field as it appears in the JSON body.
    pub field: String,
    /// What is wrong with the field's value.
    pub message: String,
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not include an `Authorization` header.
    #[error("not authorized")]
    MissingToken,

    /// The access token was malformed, had a bad signature or has expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An access token could not be signed.
    ///
    /// Like [Error::HashingError], the error string is for the server logs only.
    #[error("could not sign access token: {0}")]
    TokenSigningError(String),

    /// The request body failed schema validation.
    #[error("invalid data")]
    Validation(Vec<FieldError>),

    /// The request had no body where one was required.
    #[error("request body is empty")]
    EmptyBody,

    /// The request body could not be parsed as JSON of the expected shape.
    #[error("{0}")]
    MalformedBody(String),

    /// A path parameter that should be a positive integer ID was not.
    #[error("invalid ID \"{0}\"")]
    InvalidId(String),

    /// An update request did not contain any fields to change.
    #[error("no fields to update")]
    NoFieldsToUpdate,

    /// An income or expense was missing its amount, description, category or account.
    ///
    /// An amount of zero is treated the same as a missing amount.
    #[error("missing data")]
    MissingMovementData,

    /// The account type ID given for an account does not refer to an existing account type.
    #[error("the account type does not exist")]
    InvalidAccountType,

    /// A budget's end date is before its start date.
    #[error("the end date must not be before the start date")]
    InvalidDateRange,

    /// The category kind was neither "income" nor "expense".
    #[error("\"{0}\" is not a category type, expected \"income\" or \"expense\"")]
    InvalidCategoryKind(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The account does not exist or belongs to another user.
    #[error("the account could not be found")]
    AccountNotFound,

    /// The category does not exist.
    #[error("the category could not be found")]
    CategoryNotFound,

    /// Tried to update an account type that does not exist.
    #[error("tried to update an account type that is not in the database")]
    UpdateMissingAccountType,

    /// Tried to delete an account type that does not exist.
    #[error("tried to delete an account type that is not in the database")]
    DeleteMissingAccountType,

    /// Tried to update an account that does not exist.
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to delete an account that does not exist.
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update a category that does not exist.
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist.
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// An account type with the same name, ignoring case, already exists.
    #[error("the account type \"{0}\" already exists")]
    DuplicateAccountType(String),

    /// The user already has an account with the same name.
    #[error("the account \"{0}\" already exists")]
    DuplicateAccountName(String),

    /// A category with the same name and income/expense flag already exists.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// The email is already registered to another user.
    #[error("the email is already in use")]
    DuplicateEmail,

    /// The account type still has accounts and cannot be deleted.
    #[error("the account type is in use by one or more accounts")]
    AccountTypeInUse,

    /// The account still has transactions and cannot be deleted.
    #[error("the account has transactions and cannot be deleted")]
    AccountInUse,

    /// The category is still referenced by transactions or budgets and cannot be deleted.
    #[error("the category is in use by transactions or budgets")]
    CategoryInUse,

    /// Inserting the movement or adjusting the balance did not affect any rows.
    #[error("could not complete transaction")]
    MovementFailed,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The request was abandoned because it ran past the server's time limit.
    #[error("the request took too long to complete")]
    Timeout,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                let field = field.to_string();

                field_errors.iter().map(move |error| FieldError {
                    field: field.clone(),
                    message: match &error.message {
                        Some(message) => message.to_string(),
                        None => describe_validation_code(&error.code),
                    },
                })
            })
            .collect();

        details.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));

        Error::Validation(details)
    }
}

fn describe_validation_code(code: &str) -> String {
    match code {
        "required" => "is required".to_owned(),
        "length" => "has an invalid length".to_owned(),
        "range" => "is out of range".to_owned(),
        "email" => "is not a valid email address".to_owned(),
        other => format!("failed the {other} check"),
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
}

impl ErrorBody {
    fn new(error: impl ToString) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message: None,
            details: None,
        }
    }

    fn with_message(mut self, message: impl ToString) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingToken | Error::InvalidToken | Error::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Error::TooWeak(_)
            | Error::Validation(_)
            | Error::EmptyBody
            | Error::MalformedBody(_)
            | Error::InvalidId(_)
            | Error::NoFieldsToUpdate
            | Error::MissingMovementData
            | Error::InvalidAccountType
            | Error::InvalidDateRange
            | Error::InvalidCategoryKind(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::AccountNotFound
            | Error::CategoryNotFound
            | Error::UpdateMissingAccountType
            | Error::DeleteMissingAccountType
            | Error::UpdateMissingAccount
            | Error::DeleteMissingAccount
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory => StatusCode::NOT_FOUND,
            Error::DuplicateAccountType(_)
            | Error::DuplicateAccountName(_)
            | Error::DuplicateCategory(_)
            | Error::DuplicateEmail
            | Error::AccountTypeInUse
            | Error::AccountInUse
            | Error::CategoryInUse => StatusCode::CONFLICT,
            Error::HashingError(_)
            | Error::TokenSigningError(_)
            | Error::MovementFailed
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::Timeout => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match self {
            Error::Validation(details) => ErrorBody {
                details: Some(details),
                ..ErrorBody::new("invalid data")
            },
            Error::DuplicateAccountType(_)
            | Error::DuplicateAccountName(_)
            | Error::DuplicateCategory(_)
            | Error::DuplicateEmail => ErrorBody::new("duplicate").with_message(self),
            Error::AccountTypeInUse | Error::AccountInUse | Error::CategoryInUse => {
                ErrorBody::new("in use").with_message(self)
            }
            Error::MissingMovementData | Error::MovementFailed => {
                ErrorBody::new("could not record transaction").with_message(self)
            }
            Error::Timeout => ErrorBody::new("internal server error").with_message(self),
            // Any errors that are not handled above are not intended to be shown to the client.
            error if status_code == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorBody::new("internal server error")
                    .with_message("an unexpected error occurred, check the server logs")
            }
            error => ErrorBody::new(error),
        };

        (status_code, Json(body)).into_response()
    }
}
