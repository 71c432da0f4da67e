//! Defines the endpoint for listing a user's transactions with filtering.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, database_id::UserId, user::get_user_by_id};

use super::{
    core::Transaction,
    query::{TransactionFilter, get_transactions_for_user},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for listing transactions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsRequest {
    /// The ID of the user whose transactions to list. Required.
    pub user_id: Option<UserId>,
    /// A transaction type, or the sentinel "all".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// A day count selecting a rolling window, or the sentinel "custom".
    pub frequency: Option<String>,
    /// The first day of the explicit range, as `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// The last day of the explicit range, as `YYYY-MM-DD`.
    pub end_date: Option<String>,
}

/// The response body for a successful list request.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The matching transactions, ordered by date and then ID.
    pub transactions: Vec<Transaction>,
}

/// A route handler for listing a user's transactions.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Json(request): Json<ListTransactionsRequest>,
) -> Response {
    let Some(user_id) = request.user_id else {
        return Error::MissingParameters("User ID is required").into_response();
    };

    let filter = match TransactionFilter::from_params(
        user_id,
        request.transaction_type.as_deref(),
        request.frequency.as_deref(),
        request.start_date.as_deref(),
        request.end_date.as_deref(),
    ) {
        Ok(filter) => filter,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    if let Err(error) = get_user_by_id(user_id, &connection) {
        return error.into_response();
    }

    match get_transactions_for_user(&filter, &connection) {
        Ok(transactions) => Json(ListTransactionsResponse {
            success: true,
            transactions,
        })
        .into_response(),
        Err(error) => error.into_response(),
    }
}
