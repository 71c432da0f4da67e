//! Defines the endpoint for partially updating a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, database_id::TransactionId};

use super::{
    core::{Transaction, TransactionType, TransactionUpdate, update_transaction},
    query::parse_date,
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for updating a transaction.
///
/// A field that is absent is left untouched. A field that is present must be
/// usable: empty strings and non-positive amounts are rejected rather than
/// silently ignored, so "clear this field" and "leave this field alone" are
/// distinct requests.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement amount, strictly positive.
    pub amount: Option<f64>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement date, as `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Replacement category.
    pub category: Option<String>,
    /// Replacement transaction type.
    pub transaction_type: Option<String>,
}

/// The response body for a successful update.
#[derive(Debug, Serialize)]
pub struct UpdateTransactionResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// A human-readable description of the outcome.
    pub message: String,
    /// The transaction after the update.
    pub transaction: Transaction,
}

fn validate(request: UpdateTransactionRequest) -> Result<TransactionUpdate, Error> {
    if matches!(&request.title, Some(title) if title.is_empty()) {
        return Err(Error::EmptyField("Title"));
    }
    if matches!(&request.description, Some(description) if description.is_empty()) {
        return Err(Error::EmptyField("Description"));
    }
    if matches!(&request.category, Some(category) if category.is_empty()) {
        return Err(Error::EmptyField("Category"));
    }
    if matches!(request.amount, Some(amount) if amount <= 0.0) {
        return Err(Error::InvalidAmount);
    }

    let date = request.date.as_deref().map(parse_date).transpose()?;
    let transaction_type = request
        .transaction_type
        .as_deref()
        .map(|raw| raw.parse::<TransactionType>())
        .transpose()?;

    Ok(TransactionUpdate {
        title: request.title,
        amount: request.amount,
        description: request.description,
        date,
        category: request.category,
        transaction_type,
    })
}

/// A route handler for partially updating a transaction.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Response {
    let update = match validate(request) {
        Ok(update) => update,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    match update_transaction(transaction_id, update, &connection) {
        Ok(transaction) => Json(UpdateTransactionResponse {
            success: true,
            message: "Transaction Updated Successfully".to_owned(),
            transaction,
        })
        .into_response(),
        Err(error) => error.into_response(),
    }
}
