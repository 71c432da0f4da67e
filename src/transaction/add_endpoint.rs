//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{ApiMessage, AppState, Error, database_id::UserId};

use super::{
    core::{NewTransaction, create_transaction},
    query::parse_date,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct AddTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AddTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a transaction.
///
/// Every field is required; they are modelled as options so that absence is
/// reported with the contract's 408 envelope rather than a deserialization
/// rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTransactionRequest {
    /// A short label for the transaction.
    pub title: Option<String>,
    /// The value of the transaction, strictly positive.
    pub amount: Option<f64>,
    /// Text detailing the transaction.
    pub description: Option<String>,
    /// The date the transaction occurred, as `YYYY-MM-DD`.
    pub date: Option<String>,
    /// A label grouping related transactions.
    pub category: Option<String>,
    /// The ID of the user the transaction belongs to.
    pub user_id: Option<UserId>,
    /// Either "income" or "expense".
    pub transaction_type: Option<String>,
}

/// Check that every required field was supplied and is usable.
///
/// An amount of exactly zero counts as a missing field, matching what the
/// client has always been shown; a negative amount is its own error.
fn validate(request: AddTransactionRequest) -> Result<NewTransaction, Error> {
    let title = request
        .title
        .filter(|title| !title.is_empty())
        .ok_or(Error::MissingFields)?;
    let description = request
        .description
        .filter(|description| !description.is_empty())
        .ok_or(Error::MissingFields)?;
    let category = request
        .category
        .filter(|category| !category.is_empty())
        .ok_or(Error::MissingFields)?;
    let raw_date = request
        .date
        .filter(|date| !date.is_empty())
        .ok_or(Error::MissingFields)?;
    let raw_type = request
        .transaction_type
        .filter(|transaction_type| !transaction_type.is_empty())
        .ok_or(Error::MissingFields)?;
    let user_id = request.user_id.ok_or(Error::MissingFields)?;
    let amount = request
        .amount
        .filter(|&amount| amount != 0.0)
        .ok_or(Error::MissingFields)?;

    if amount < 0.0 {
        return Err(Error::InvalidAmount);
    }

    Ok(NewTransaction {
        title,
        amount,
        description,
        date: parse_date(&raw_date)?,
        category,
        transaction_type: raw_type.parse()?,
        user_id,
    })
}

/// A route handler for creating a new transaction.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn add_transaction_endpoint(
    State(state): State<AddTransactionState>,
    Json(request): Json<AddTransactionRequest>,
) -> Response {
    let new_transaction = match validate(request) {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    match create_transaction(new_transaction, &connection) {
        Ok(_) => Json(ApiMessage::success("Transaction Added Successfully")).into_response(),
        Err(error) => error.into_response(),
    }
}
