//! Defines the endpoint for deleting a batch of transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    ApiMessage, AppState, Error,
    database_id::{TransactionId, UserId},
};

use super::core::delete_transactions;

/// The state needed to delete a batch of transactions.
#[derive(Debug, Clone)]
pub struct DeleteTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for deleting a batch of transactions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTransactionsRequest {
    /// The IDs of the transactions to delete. Required.
    pub transaction_ids: Option<Vec<TransactionId>>,
    /// The ID of the user the transactions belong to. Required. IDs owned by
    /// another user are skipped.
    pub user_id: Option<UserId>,
}

/// A route handler for deleting a batch of transactions.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_transactions_endpoint(
    State(state): State<DeleteTransactionsState>,
    Json(request): Json<DeleteTransactionsRequest>,
) -> Response {
    let (Some(transaction_ids), Some(user_id)) = (request.transaction_ids, request.user_id)
    else {
        return Error::MissingParameters("Transaction IDs and User ID are required")
            .into_response();
    };

    let connection = state.db_connection.lock().unwrap();

    match delete_transactions(&transaction_ids, user_id, &connection) {
        Ok(_) => Json(ApiMessage::success("Transactions successfully deleted")).into_response(),
        Err(error) => error.into_response(),
    }
}
