//! User management for the expense tracker.
//!
//! This module contains everything related to users:
//! - The `User` model and its denormalized transaction-reference list
//! - Database functions for registration, lookup and avatar assignment
//! - Route handlers for the user endpoints

mod all_users_endpoint;
mod core;
mod log_in_endpoint;
mod register_endpoint;
mod set_avatar_endpoint;

pub use all_users_endpoint::all_users_endpoint;
pub use log_in_endpoint::log_in_endpoint;
pub use register_endpoint::register_endpoint;
pub use self::core::{
    NewUser, User, create_user, create_user_table, get_all_users_except, get_user_by_email,
    get_user_by_id, set_avatar,
};
pub use set_avatar_endpoint::set_avatar_endpoint;

pub(crate) use self::core::{
    append_transaction_ref, remove_transaction_ref, remove_transaction_refs,
};
