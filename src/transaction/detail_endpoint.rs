//! Defines the endpoint for fetching a single transaction by ID.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{AppState, database_id::TransactionId};

use super::core::{Transaction, get_transaction};

/// The state needed to fetch a transaction.
#[derive(Debug, Clone)]
pub struct TransactionDetailState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionDetailState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a successful detail request.
#[derive(Debug, Serialize)]
pub struct TransactionDetailResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The requested transaction.
    pub transaction: Transaction,
}

/// A route handler for fetching a single transaction.
///
/// The route carries no caller identity, so the lookup is not scoped to an
/// owner.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn transaction_detail_endpoint(
    State(state): State<TransactionDetailState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match get_transaction(transaction_id, &connection) {
        Ok(transaction) => Json(TransactionDetailResponse {
            success: true,
            transaction,
        })
        .into_response(),
        Err(error) => error.into_response(),
    }
}
