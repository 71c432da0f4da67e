//! Defines the endpoint for logging in a user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error};

use super::{core::get_user_by_email, register_endpoint::UserResponse};

/// The state needed to log in a user.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for logging in.
#[derive(Debug, Deserialize)]
pub struct LogInRequest {
    /// The email the user registered with.
    pub email: Option<String>,
    /// The user's raw password.
    pub password: Option<String>,
}

/// A route handler for logging in a user.
///
/// An unknown email and a wrong password produce the same error so the
/// response does not reveal which emails are registered.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn log_in_endpoint(
    State(state): State<LogInState>,
    Json(request): Json<LogInRequest>,
) -> Response {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Error::MissingParameters("Email and password are required").into_response();
    };

    if email.is_empty() || password.is_empty() {
        return Error::MissingParameters("Email and password are required").into_response();
    }

    let connection = state.db_connection.lock().unwrap();

    let user = match get_user_by_email(&email, &connection) {
        Ok(user) => user,
        Err(Error::UserNotFound) => return Error::InvalidCredentials.into_response(),
        Err(error) => return error.into_response(),
    };

    match user.password_hash.verify(&password) {
        Ok(true) => Json(UserResponse {
            success: true,
            message: "Login successful".to_owned(),
            user,
        })
        .into_response(),
        Ok(false) => Error::InvalidCredentials.into_response(),
        Err(error) => Error::HashingError(error.to_string()).into_response(),
    }
}
