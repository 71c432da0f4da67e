//! Spendbook is the backend for a personal expense tracker.
//!
//! This library provides a JSON REST API for registering users, logging in,
//! assigning avatars, and managing the income/expense transactions owned by
//! each user, backed by a SQLite database.

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

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod password;
mod routing;
mod transaction;
mod user;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;

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

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more of the required fields for creating a transaction was
    /// absent, empty, or (for the amount) zero.
    ///
    /// The legacy client expects this case as HTTP 408 with this exact
    /// message, so both are preserved.
    #[error("Please Fill all fields")]
    MissingFields,

    /// A required request parameter was absent. The payload names the
    /// parameter(s) in the wording the client displays.
    #[error("{0}")]
    MissingParameters(&'static str),

    /// A transaction amount was zero or negative.
    #[error("Amount must be a positive number")]
    InvalidAmount,

    /// A field that must not be empty was supplied as an empty string.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// A date string could not be parsed.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A transaction type other than "income" or "expense" was supplied.
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// The frequency parameter was neither a number of days nor the literal
    /// "custom".
    #[error("\"{0}\" is not a number of days or \"custom\"")]
    InvalidFrequency(String),

    /// The user ID did not resolve to a registered user.
    #[error("User not found")]
    UserNotFound,

    /// The transaction ID did not resolve to a transaction visible to the
    /// caller.
    #[error("Transaction not found")]
    TransactionNotFound,

    /// The email used to register was not a valid email address.
    #[error("Please enter a valid email")]
    InvalidEmail,

    /// The password used to register was shorter than the minimum length.
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    /// The email used to register already belongs to another user.
    #[error("Email already in use")]
    DuplicateEmail,

    /// The email/password combination did not match a registered user.
    ///
    /// The same error is reported whether the email is unknown or the
    /// password is wrong, so the response does not reveal which emails are
    /// registered.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The denormalized transaction-reference list stored on a user row
    /// could not be read or written as JSON.
    #[error("corrupt transaction reference list: {0}")]
    CorruptReferenceList(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
            {
                Error::DuplicateEmail
            }
            error => Error::SqlError(error),
        }
    }
}

impl Error {
    /// The HTTP status code the legacy client expects for this error.
    ///
    /// The mapping is non-standard but part of the wire contract: 408 for
    /// create-validation failures, 400 for domain errors, and 401 as the
    /// catch-all for unexpected server-side failures.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFields => StatusCode::REQUEST_TIMEOUT,
            Error::HashingError(_) | Error::CorruptReferenceList(_) | Error::SqlError(_) => {
                StatusCode::UNAUTHORIZED
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code == StatusCode::UNAUTHORIZED {
            tracing::error!("An unexpected error occurred: {self}");
        }

        (
            status_code,
            Json(ApiMessage {
                success: false,
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// The `{success, message}` envelope used by every response that carries no
/// other data, including all error responses.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    /// Whether the request succeeded.
    pub success: bool,
    /// A human-readable description of the outcome.
    pub message: String,
}

impl ApiMessage {
    /// Create a success envelope with the given message.
    pub fn success(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_owned(),
        }
    }
}
