//! Defines the endpoint for deleting a single transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    ApiMessage, AppState, Error,
    database_id::{TransactionId, UserId},
};

use super::core::delete_transaction;

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for deleting a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTransactionRequest {
    /// The ID of the user the transaction belongs to. Required.
    pub user_id: Option<UserId>,
}

/// A route handler for deleting a transaction.
///
/// The transaction must belong to the supplied user; IDs owned by someone
/// else are reported as not found.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Json(request): Json<DeleteTransactionRequest>,
) -> Response {
    let Some(user_id) = request.user_id else {
        return Error::MissingParameters("Transaction ID and User ID are required")
            .into_response();
    };

    let connection = state.db_connection.lock().unwrap();

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(()) => Json(ApiMessage::success("Transaction successfully deleted")).into_response(),
        Err(error) => error.into_response(),
    }
}
