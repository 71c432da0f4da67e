//! The filtered list query for transactions.
//!
//! A list request is always scoped to one user and can narrow the result
//! down by transaction type and by a date window. The date window comes in
//! two mutually exclusive flavours picked by the `frequency` parameter: a
//! rolling "last N days" window, or an explicit inclusive range selected by
//! the literal `custom`.

use rusqlite::{Connection, params_from_iter, types::Value};
use time::{Date, Duration, OffsetDateTime, macros::format_description};

use crate::{Error, database_id::UserId};

use super::core::{Transaction, TransactionType, map_transaction_row};

/// The date window applied to a transaction list query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateFilter {
    /// Transactions dated strictly after today minus the given number of days.
    LastDays(i64),
    /// Transactions dated within the inclusive range.
    Between {
        /// The first date included in the window.
        start: Date,
        /// The last date included in the window.
        end: Date,
    },
    /// No date restriction.
    ///
    /// This is the documented fall-through for `frequency = "custom"` without
    /// a usable start/end pair.
    Unbounded,
}

/// Defines which of a user's transactions a list query returns.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    /// The owner whose transactions are listed. Always applied.
    pub user_id: UserId,
    /// Include only transactions of this type; `None` means every type
    /// (the wire-level `all` sentinel).
    pub transaction_type: Option<TransactionType>,
    /// The date window to include.
    pub date_filter: DateFilter,
}

impl TransactionFilter {
    /// Build a filter from the raw wire parameters of a list request.
    ///
    /// - `type_param`: a transaction type, or the sentinel `all` (absent and
    ///   empty strings count as `all`).
    /// - `frequency`: a day count selecting a rolling window, or the sentinel
    ///   `custom` selecting the explicit `start_date`/`end_date` range
    ///   (absent and empty strings count as `custom`).
    /// - `start_date`/`end_date`: the explicit range; only applied when both
    ///   are supplied and non-empty, otherwise the query is unbounded in time.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidTransactionType] if `type_param` is not a known type or `all`,
    /// - [Error::InvalidFrequency] if `frequency` is neither a number nor `custom`,
    /// - or [Error::InvalidDate] if a supplied date cannot be parsed.
    pub fn from_params(
        user_id: UserId,
        type_param: Option<&str>,
        frequency: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, Error> {
        let transaction_type = match type_param.filter(|raw| !raw.is_empty()) {
            None | Some("all") => None,
            Some(raw) => Some(raw.parse()?),
        };

        let date_filter = match frequency.filter(|raw| !raw.is_empty()) {
            Some(raw) if raw != "custom" => {
                let days = raw
                    .parse::<i64>()
                    .map_err(|_| Error::InvalidFrequency(raw.to_string()))?;
                DateFilter::LastDays(days)
            }
            _ => {
                let start = parse_optional_date(start_date)?;
                let end = parse_optional_date(end_date)?;

                match (start, end) {
                    (Some(start), Some(end)) => DateFilter::Between { start, end },
                    _ => DateFilter::Unbounded,
                }
            }
        };

        Ok(Self {
            user_id,
            transaction_type,
            date_filter,
        })
    }
}

/// The format dates use on the wire and in the database.
const DATE_FORMAT: &'static [time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` date string.
///
/// # Errors
/// Returns [Error::InvalidDate] if `raw` is not a valid date.
pub(crate) fn parse_date(raw: &str) -> Result<Date, Error> {
    Date::parse(raw, DATE_FORMAT).map_err(|_| Error::InvalidDate(raw.to_string()))
}

/// Parse an optional date parameter, treating absent and empty strings as
/// not supplied.
fn parse_optional_date(raw: Option<&str>) -> Result<Option<Date>, Error> {
    raw.filter(|raw| !raw.is_empty())
        .map(parse_date)
        .transpose()
}

/// Get the transactions matching `filter`.
///
/// Results are ordered by date and then by ID so that the order is stable
/// across updates.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_transactions_for_user(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut query = String::from(
        "SELECT id, title, amount, description, date, category, transaction_type, user_id
         FROM \"transaction\" WHERE user_id = ?",
    );
    let mut params: Vec<Value> = vec![filter.user_id.into()];

    if let Some(transaction_type) = filter.transaction_type {
        query.push_str(" AND transaction_type = ?");
        params.push(transaction_type.to_string().into());
    }

    // Dates are stored as ISO-8601 text, so comparing them as text preserves
    // date order.
    match filter.date_filter {
        DateFilter::LastDays(days) => {
            let cutoff = OffsetDateTime::now_utc().date() - Duration::days(days);
            query.push_str(" AND date > ?");
            params.push(cutoff.to_string().into());
        }
        DateFilter::Between { start, end } => {
            query.push_str(" AND date BETWEEN ? AND ?");
            params.push(start.to_string().into());
            params.push(end.to_string().into());
        }
        DateFilter::Unbounded => {}
    }

    query.push_str(" ORDER BY date ASC, id ASC");

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod query_tests {
    use time::{Duration, OffsetDateTime, macros::date};

    use crate::transaction::{
        TransactionType, create_transaction,
        test_utils::{create_test_user, get_test_connection, new_transaction},
    };

    use super::{DateFilter, TransactionFilter, get_transactions_for_user};

    #[test]
    fn filters_by_type() {
        let conn = get_test_connection();
        let user = create_test_user("alice@example.com", &conn);
        let groceries = create_transaction(
            new_transaction(
                "Groceries",
                50.0,
                date!(2025 - 10 - 05),
                TransactionType::Expense,
                user.id,
            ),
            &conn,
        )
        .unwrap();
        let salary = create_transaction(
            new_transaction(
                "Salary",
                100.0,
                date!(2025 - 10 - 05),
                TransactionType::Income,
                user.id,
            ),
            &conn,
        )
        .unwrap();

        let all = get_transactions_for_user(
            &TransactionFilter {
                user_id: user.id,
                transaction_type: None,
                date_filter: DateFilter::Unbounded,
            },
            &conn,
        )
        .unwrap();
        assert_eq!(all, vec![groceries.clone(), salary.clone()]);

        let expenses_only = get_transactions_for_user(
            &TransactionFilter {
                user_id: user.id,
                transaction_type: Some(TransactionType::Expense),
                date_filter: DateFilter::Unbounded,
            },
            &conn,
        )
        .unwrap();
        assert_eq!(expenses_only, vec![groceries]);
    }

    #[test]
    fn scopes_to_the_given_user() {
        let conn = get_test_connection();
        let alice = create_test_user("alice@example.com", &conn);
        let bob = create_test_user("bob@example.com", &conn);
        let alices = create_transaction(
            new_transaction(
                "Coffee",
                4.5,
                date!(2025 - 10 - 05),
                TransactionType::Expense,
                alice.id,
            ),
            &conn,
        )
        .unwrap();
        create_transaction(
            new_transaction(
                "Tea",
                3.0,
                date!(2025 - 10 - 05),
                TransactionType::Expense,
                bob.id,
            ),
            &conn,
        )
        .unwrap();

        let got = get_transactions_for_user(
            &TransactionFilter {
                user_id: alice.id,
                transaction_type: None,
                date_filter: DateFilter::Unbounded,
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![alices]);
    }

    #[test]
    fn last_days_window_is_strictly_after_cutoff() {
        let conn = get_test_connection();
        let user = create_test_user("alice@example.com", &conn);
        let today = OffsetDateTime::now_utc().date();

        // One transaction per day going back ten days, including one dated
        // exactly on the cutoff (today - 7), which must be excluded.
        for days_ago in 0..10 {
            create_transaction(
                new_transaction(
                    &format!("transaction #{days_ago}"),
                    (days_ago + 1) as f64,
                    today - Duration::days(days_ago),
                    TransactionType::Expense,
                    user.id,
                ),
                &conn,
            )
            .unwrap();
        }

        let got = get_transactions_for_user(
            &TransactionFilter {
                user_id: user.id,
                transaction_type: None,
                date_filter: DateFilter::LastDays(7),
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 7, "got {} transactions, want 7", got.len());
        let cutoff = today - Duration::days(7);
        assert!(got.iter().all(|transaction| transaction.date > cutoff));
    }

    #[test]
    fn between_window_is_inclusive() {
        let conn = get_test_connection();
        let user = create_test_user("alice@example.com", &conn);
        for (i, day) in [3i64, 4, 5, 6, 7].into_iter().enumerate() {
            create_transaction(
                new_transaction(
                    &format!("transaction #{i}"),
                    (i + 1) as f64,
                    date!(2025 - 10 - 01) + Duration::days(day - 1),
                    TransactionType::Expense,
                    user.id,
                ),
                &conn,
            )
            .unwrap();
        }

        let got = get_transactions_for_user(
            &TransactionFilter {
                user_id: user.id,
                transaction_type: None,
                date_filter: DateFilter::Between {
                    start: date!(2025 - 10 - 04),
                    end: date!(2025 - 10 - 06),
                },
            },
            &conn,
        )
        .unwrap();

        let dates: Vec<_> = got.iter().map(|transaction| transaction.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2025 - 10 - 04),
                date!(2025 - 10 - 05),
                date!(2025 - 10 - 06)
            ]
        );
    }

    #[test]
    fn orders_by_date_then_id() {
        let conn = get_test_connection();
        let user = create_test_user("alice@example.com", &conn);
        let later = create_transaction(
            new_transaction(
                "Later",
                1.0,
                date!(2025 - 10 - 06),
                TransactionType::Expense,
                user.id,
            ),
            &conn,
        )
        .unwrap();
        let earlier = create_transaction(
            new_transaction(
                "Earlier",
                2.0,
                date!(2025 - 10 - 05),
                TransactionType::Expense,
                user.id,
            ),
            &conn,
        )
        .unwrap();

        let got = get_transactions_for_user(
            &TransactionFilter {
                user_id: user.id,
                transaction_type: None,
                date_filter: DateFilter::Unbounded,
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![earlier, later]);
    }

    #[test]
    fn expense_filter_with_unbounded_dates_returns_only_expenses() {
        // The end-to-end scenario: U adds T1 (50, expense) and T2 (100,
        // income); listing expenses with frequency custom and no dates must
        // return exactly T1.
        let conn = get_test_connection();
        let user = create_test_user("alice@example.com", &conn);
        let t1 = create_transaction(
            new_transaction(
                "T1",
                50.0,
                date!(2025 - 10 - 05),
                TransactionType::Expense,
                user.id,
            ),
            &conn,
        )
        .unwrap();
        create_transaction(
            new_transaction(
                "T2",
                100.0,
                date!(2025 - 10 - 05),
                TransactionType::Income,
                user.id,
            ),
            &conn,
        )
        .unwrap();

        let filter = TransactionFilter::from_params(
            user.id,
            Some("expense"),
            Some("custom"),
            None,
            None,
        )
        .unwrap();
        let got = get_transactions_for_user(&filter, &conn).unwrap();

        assert_eq!(got, vec![t1]);
    }
}
