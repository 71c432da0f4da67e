//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, Transaction as SqlTransaction, TransactionBehavior,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{TransactionId, UserId},
    user::{append_transaction_ref, get_user_by_id, remove_transaction_ref, remove_transaction_refs},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction added money to the user's pocket or took it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The wire and storage representation of the transaction type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(Error::InvalidTransactionType(raw.to_string())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short label for the transaction.
    pub title: String,
    /// The amount of money spent or earned in this transaction. Always
    /// strictly positive; direction is carried by `transaction_type`.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// A free-form label grouping related transactions, e.g. "Groceries".
    pub category: String,
    /// Whether this is income or an expense.
    pub transaction_type: TransactionType,
    /// The ID of the user the transaction belongs to. Set at creation and
    /// never changed afterwards; this column is the authoritative ownership
    /// record, of which the user's reference list is a derived copy.
    pub user_id: UserId,
}

/// The validated data needed to create a new [Transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A short label for the transaction.
    pub title: String,
    /// The amount of money spent or earned, strictly positive.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// A free-form label grouping related transactions.
    pub category: String,
    /// Whether this is income or an expense.
    pub transaction_type: TransactionType,
    /// The ID of the user the transaction will belong to.
    pub user_id: UserId,
}

/// A partial update to an existing [Transaction].
///
/// Fields that are `None` are left untouched; fields that are `Some` have
/// already been validated by the caller and overwrite the stored value.
/// There is deliberately no `user_id` field: ownership cannot change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement amount.
    pub amount: Option<f64>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement date.
    pub date: Option<Date>,
    /// Replacement category.
    pub category: Option<String>,
    /// Replacement transaction type.
    pub transaction_type: Option<TransactionType>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database and record it in the owner's
/// transaction-reference list.
///
/// Both writes happen within a single SQL transaction, so the reference list
/// cannot drift from the transaction table on a partial failure.
///
/// # Errors
/// This function will return a:
/// - [Error::UserNotFound] if the owner does not resolve to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_user_by_id(new_transaction.user_id, &sql_transaction)?;

    let transaction = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\"
                (title, amount, description, date, category, transaction_type, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, title, amount, description, date, category, transaction_type, user_id",
        )?
        .query_row(
            (
                &new_transaction.title,
                new_transaction.amount,
                &new_transaction.description,
                new_transaction.date,
                &new_transaction.category,
                new_transaction.transaction_type,
                new_transaction.user_id,
            ),
            map_transaction_row,
        )?;

    append_transaction_ref(transaction.user_id, transaction.id, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// There is no owner scoping on this lookup: the detail route carries no
/// caller identity.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, title, amount, description, date, category, transaction_type, user_id
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound,
            error => error.into(),
        })
}

/// Apply a partial update to the transaction with the given `id`.
///
/// Returns the updated record.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let mut transaction = get_transaction(id, connection)?;

    if let Some(title) = update.title {
        transaction.title = title;
    }
    if let Some(amount) = update.amount {
        transaction.amount = amount;
    }
    if let Some(description) = update.description {
        transaction.description = description;
    }
    if let Some(date) = update.date {
        transaction.date = date;
    }
    if let Some(category) = update.category {
        transaction.category = category;
    }
    if let Some(transaction_type) = update.transaction_type {
        transaction.transaction_type = transaction_type;
    }

    connection.execute(
        "UPDATE \"transaction\"
         SET title = ?1, amount = ?2, description = ?3, date = ?4, category = ?5,
             transaction_type = ?6
         WHERE id = ?7",
        (
            &transaction.title,
            transaction.amount,
            &transaction.description,
            transaction.date,
            &transaction.category,
            transaction.transaction_type,
            id,
        ),
    )?;

    Ok(transaction)
}

/// Delete the transaction with the given `id` on behalf of `user_id`, and
/// remove it from the owner's transaction-reference list.
///
/// The transaction must belong to `user_id`. A transaction owned by someone
/// else is reported as [Error::TransactionNotFound], so a caller cannot tell
/// foreign IDs apart from missing ones.
///
/// # Errors
/// This function will return a:
/// - [Error::UserNotFound] if `user_id` does not resolve to a registered user,
/// - [Error::TransactionNotFound] if the transaction does not exist or is
///   owned by another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_user_by_id(user_id, &sql_transaction)?;

    let transaction = get_transaction(id, &sql_transaction)?;
    if transaction.user_id != user_id {
        return Err(Error::TransactionNotFound);
    }

    sql_transaction.execute("DELETE FROM \"transaction\" WHERE id = ?1", (id,))?;
    remove_transaction_ref(user_id, id, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}

/// Delete every transaction whose ID is in `transaction_ids` AND whose owner
/// is `user_id`, removing the deleted IDs from the owner's reference list.
///
/// IDs that do not exist or belong to another user are skipped. Returns the
/// number of transactions deleted; an empty ID set is a no-op.
///
/// # Errors
/// This function will return a:
/// - [Error::UserNotFound] if `user_id` does not resolve to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transactions(
    transaction_ids: &[TransactionId],
    user_id: UserId,
    connection: &Connection,
) -> Result<usize, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_user_by_id(user_id, &sql_transaction)?;

    if transaction_ids.is_empty() {
        sql_transaction.commit()?;
        return Ok(0);
    }

    let placeholders = vec!["?"; transaction_ids.len()].join(", ");
    let query = format!(
        "DELETE FROM \"transaction\" WHERE user_id = ? AND id IN ({placeholders}) RETURNING id"
    );

    let mut params: Vec<rusqlite::types::Value> = vec![user_id.into()];
    params.extend(transaction_ids.iter().map(|&id| id.into()));

    let deleted_ids: Vec<TransactionId> = sql_transaction
        .prepare(&query)?
        .query_map(rusqlite::params_from_iter(params), |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    remove_transaction_refs(user_id, &deleted_ids, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(deleted_ids.len())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                transaction_type TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Composite index used by the filtered list query.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date
         ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
        category: row.get(5)?,
        transaction_type: row.get(6)?,
        user_id: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
