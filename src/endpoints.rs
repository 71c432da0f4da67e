//! The API endpoint URIs.
//!
//! The transaction routes reproduce the paths the legacy client already
//! calls, verbs and casing included.

/// The route to create a transaction.
pub const ADD_TRANSACTION: &str = "/addTransaction";
/// The route to list a user's transactions with filtering.
pub const GET_TRANSACTIONS: &str = "/getTransaction";
/// The route to fetch a single transaction by ID.
pub const TRANSACTION_DETAIL: &str = "/getTransaction/{transaction_id}";
/// The route to update a transaction.
pub const UPDATE_TRANSACTION: &str = "/updateTransaction/{transaction_id}";
/// The route to delete a single transaction.
pub const DELETE_TRANSACTION: &str = "/deleteTransaction/{transaction_id}";
/// The route to delete a batch of transactions.
pub const DELETE_MULTIPLE_TRANSACTIONS: &str = "/deleteMultipleTransactions";

/// The route to register a new user.
pub const REGISTER: &str = "/register";
/// The route to log in a user.
pub const LOG_IN: &str = "/login";
/// The route to set a user's avatar image.
pub const SET_AVATAR: &str = "/setAvatar/{user_id}";
/// The route to list every user other than the given one.
pub const ALL_USERS: &str = "/allUsers/{user_id}";
