//! Defines the endpoint for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, password::PasswordHash};

use super::core::{NewUser, User, create_user};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegisterState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegisterState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for registering a user.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// The user's display name.
    pub name: Option<String>,
    /// The user's email address.
    pub email: Option<String>,
    /// The user's raw password, at least six characters.
    pub password: Option<String>,
}

/// The response body for a successful registration or log-in.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// A human-readable description of the outcome.
    pub message: String,
    /// The user, without the password hash.
    pub user: User,
}

fn validate(request: RegisterRequest) -> Result<(String, String, String), Error> {
    let (Some(name), Some(email), Some(password)) =
        (request.name, request.email, request.password)
    else {
        return Err(Error::MissingParameters("Name, email and password are required"));
    };

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(Error::MissingParameters("Name, email and password are required"));
    }

    if email.parse::<EmailAddress>().is_err() {
        return Err(Error::InvalidEmail);
    }

    Ok((name, email, password))
}

/// A route handler for registering a new user.
///
/// The password is validated against the minimum length rule and stored as a
/// bcrypt hash; the response never includes it.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_endpoint(
    State(state): State<RegisterState>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    let (name, email, password) = match validate(request) {
        Ok(fields) => fields,
        Err(error) => return error.into_response(),
    };

    let password_hash = match PasswordHash::from_raw_password(&password, PasswordHash::DEFAULT_COST)
    {
        Ok(password_hash) => password_hash,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    match create_user(
        NewUser {
            name,
            email,
            password_hash,
        },
        &connection,
    ) {
        Ok(user) => Json(UserResponse {
            success: true,
            message: "User registered successfully".to_owned(),
            user,
        })
        .into_response(),
        Err(error) => error.into_response(),
    }
}
