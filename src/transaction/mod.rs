//! Transaction management for the expense tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its supporting types
//! - Database functions for creating, querying, updating and deleting
//!   transactions, including maintenance of the owner's reference list
//! - The filtered list query
//! - Route handlers for the transaction endpoints

mod add_endpoint;
mod core;
mod delete_endpoint;
mod delete_many_endpoint;
mod detail_endpoint;
mod list_endpoint;
mod query;
mod update_endpoint;

pub use add_endpoint::add_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use delete_many_endpoint::delete_transactions_endpoint;
pub use detail_endpoint::transaction_detail_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use query::{DateFilter, TransactionFilter, get_transactions_for_user};
pub use self::core::{
    NewTransaction, Transaction, TransactionType, TransactionUpdate, create_transaction,
    create_transaction_table, get_transaction, map_transaction_row,
};
pub use update_endpoint::update_transaction_endpoint;

#[cfg(test)]
pub(crate) use self::core::test_utils;
