//! Defines the endpoint for listing every user other than the given one.
//!
//! The client uses this to show the other account holders on a shared
//! device, so the excluded ID is simply whoever is asking.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{AppState, database_id::UserId};

use super::core::{User, get_all_users_except};

/// The state needed to list users.
#[derive(Debug, Clone)]
pub struct AllUsersState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AllUsersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a successful user listing.
#[derive(Debug, Serialize)]
pub struct AllUsersResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// Every user except the requested one, without password hashes.
    pub users: Vec<User>,
}

/// A route handler for listing every user except the one in the path.
///
/// The excluded ID does not have to belong to a registered user.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn all_users_endpoint(
    State(state): State<AllUsersState>,
    Path(user_id): Path<UserId>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match get_all_users_except(user_id, &connection) {
        Ok(users) => Json(AllUsersResponse {
            success: true,
            users,
        })
        .into_response(),
        Err(error) => error.into_response(),
    }
}
