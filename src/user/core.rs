//! Defines the core data model and database queries for users.
//!
//! Besides identity, each user row carries a denormalized list of the IDs of
//! the transactions it owns, stored as a JSON array. The list is a derived
//! index for the client: the `user_id` column on the transaction row remains
//! authoritative. Callers that mutate transactions must update the list
//! within the same SQL transaction as the row write.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{TransactionId, UserId},
    password::PasswordHash,
};

// ============================================================================
// MODELS
// ============================================================================

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The ID of the user.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The user's email address, unique across the application.
    pub email: String,
    /// The user's password hash. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// Whether the user has picked an avatar image.
    pub is_avatar_image_set: bool,
    /// The avatar image, empty until one is set.
    pub avatar_image: String,
    /// The IDs of the transactions owned by this user, in creation order.
    pub transactions: Vec<TransactionId>,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The validated data needed to register a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The hash of the user's password.
    pub password_hash: PasswordHash,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the user table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                is_avatar_image_set INTEGER NOT NULL DEFAULT 0,
                avatar_image TEXT NOT NULL DEFAULT '',
                transactions TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateEmail] if a user with the same email already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let created_at = OffsetDateTime::now_utc();

    let user = connection
        .prepare(
            "INSERT INTO user (name, email, password, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, email, password, is_avatar_image_set, avatar_image,
                       transactions, created_at",
        )?
        .query_row(
            (
                &new_user.name,
                &new_user.email,
                new_user.password_hash.to_string(),
                created_at,
            ),
            map_user_row,
        )
        .map_err(Error::from)?;

    Ok(user)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// This is the existence check every transaction operation performs before
/// touching the caller's data.
///
/// # Errors
/// This function will return a:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, name, email, password, is_avatar_image_set, avatar_image,
                    transactions, created_at
             FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id)], map_user_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UserNotFound,
            error => error.into(),
        })
}

/// Get the user from the database with the given email address.
///
/// # Errors
/// This function will return a:
/// - [Error::UserNotFound] if no user registered with `email`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, name, email, password, is_avatar_image_set, avatar_image,
                    transactions, created_at
             FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UserNotFound,
            error => error.into(),
        })
}

/// Get every user except the one with `excluded_id`.
///
/// Note that `excluded_id` is not required to belong to a registered user.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_all_users_except(
    excluded_id: UserId,
    connection: &Connection,
) -> Result<Vec<User>, Error> {
    connection
        .prepare(
            "SELECT id, name, email, password, is_avatar_image_set, avatar_image,
                    transactions, created_at
             FROM user WHERE id != :id ORDER BY id ASC",
        )?
        .query_map(&[(":id", &excluded_id)], map_user_row)?
        .map(|user_result| user_result.map_err(Error::SqlError))
        .collect()
}

/// Record `image` as the user's avatar and mark the avatar as set.
///
/// Returns the updated user.
///
/// # Errors
/// This function will return a:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_avatar(user_id: UserId, image: &str, connection: &Connection) -> Result<User, Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET is_avatar_image_set = 1, avatar_image = ?1 WHERE id = ?2",
        (image, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UserNotFound);
    }

    get_user_by_id(user_id, connection)
}

/// Append `transaction_id` to the user's transaction-reference list.
///
/// Must be called within the same SQL transaction as the insert of the
/// transaction row itself.
pub(crate) fn append_transaction_ref(
    user_id: UserId,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let mut refs = get_transaction_refs(user_id, connection)?;
    refs.push(transaction_id);
    set_transaction_refs(user_id, &refs, connection)
}

/// Remove `transaction_id` from the user's transaction-reference list.
///
/// Removing an ID that is not in the list is a no-op.
pub(crate) fn remove_transaction_ref(
    user_id: UserId,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    remove_transaction_refs(user_id, &[transaction_id], connection)
}

/// Remove every ID in `transaction_ids` from the user's transaction-reference list.
pub(crate) fn remove_transaction_refs(
    user_id: UserId,
    transaction_ids: &[TransactionId],
    connection: &Connection,
) -> Result<(), Error> {
    let mut refs = get_transaction_refs(user_id, connection)?;
    refs.retain(|id| !transaction_ids.contains(id));
    set_transaction_refs(user_id, &refs, connection)
}

fn get_transaction_refs(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<TransactionId>, Error> {
    let raw_refs: String = connection
        .query_row(
            "SELECT transactions FROM user WHERE id = :id",
            &[(":id", &user_id)],
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UserNotFound,
            error => error.into(),
        })?;

    serde_json::from_str(&raw_refs).map_err(|error| Error::CorruptReferenceList(error.to_string()))
}

fn set_transaction_refs(
    user_id: UserId,
    transaction_ids: &[TransactionId],
    connection: &Connection,
) -> Result<(), Error> {
    let raw_refs = serde_json::to_string(transaction_ids)
        .map_err(|error| Error::CorruptReferenceList(error.to_string()))?;

    connection.execute(
        "UPDATE user SET transactions = ?1 WHERE id = ?2",
        (raw_refs, user_id),
    )?;

    Ok(())
}

/// Map a database row to a [User].
pub(crate) fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;
    let raw_refs: String = row.get(6)?;

    let transactions = serde_json::from_str(&raw_refs).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        is_avatar_image_set: row.get(4)?,
        avatar_image: row.get(5)?,
        transactions,
        created_at: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize, password::PasswordHash};

    use super::{
        NewUser, append_transaction_ref, create_user, get_all_users_except, get_user_by_email,
        get_user_by_id, remove_transaction_refs, set_avatar,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn test_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn insert_user_succeeds() {
        let conn = get_test_connection();

        let user = create_user(test_user("Alice", "hello@world.com"), &conn).unwrap();

        assert!(user.id > 0);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "hello@world.com");
        assert!(!user.is_avatar_image_set);
        assert_eq!(user.avatar_image, "");
        assert_eq!(user.transactions, Vec::<i64>::new());
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let conn = get_test_connection();
        create_user(test_user("Alice", "hello@world.com"), &conn).unwrap();

        let duplicate = create_user(test_user("Bob", "hello@world.com"), &conn);

        assert_eq!(duplicate, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let conn = get_test_connection();

        assert_eq!(get_user_by_id(42, &conn), Err(Error::UserNotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let conn = get_test_connection();
        let inserted_user = create_user(test_user("Alice", "hello@world.com"), &conn).unwrap();

        let retrieved_user = get_user_by_id(inserted_user.id, &conn).unwrap();

        assert_eq!(retrieved_user, inserted_user);
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let conn = get_test_connection();
        let inserted_user = create_user(test_user("Alice", "hello@world.com"), &conn).unwrap();

        let retrieved_user = get_user_by_email("hello@world.com", &conn).unwrap();

        assert_eq!(retrieved_user, inserted_user);
    }

    #[test]
    fn get_user_by_email_fails_with_unknown_email() {
        let conn = get_test_connection();

        assert_eq!(
            get_user_by_email("nobody@nowhere.com", &conn),
            Err(Error::UserNotFound)
        );
    }

    #[test]
    fn set_avatar_updates_user() {
        let conn = get_test_connection();
        let user = create_user(test_user("Alice", "hello@world.com"), &conn).unwrap();

        let updated_user = set_avatar(user.id, "data:image/svg+xml;base64,PHN2Zz4=", &conn)
            .expect("Could not set avatar");

        assert!(updated_user.is_avatar_image_set);
        assert_eq!(updated_user.avatar_image, "data:image/svg+xml;base64,PHN2Zz4=");
    }

    #[test]
    fn set_avatar_fails_with_non_existent_id() {
        let conn = get_test_connection();

        assert_eq!(set_avatar(42, "image", &conn), Err(Error::UserNotFound));
    }

    #[test]
    fn get_all_users_except_excludes_given_id() {
        let conn = get_test_connection();
        let alice = create_user(test_user("Alice", "alice@example.com"), &conn).unwrap();
        let bob = create_user(test_user("Bob", "bob@example.com"), &conn).unwrap();
        let carol = create_user(test_user("Carol", "carol@example.com"), &conn).unwrap();

        let users = get_all_users_except(bob.id, &conn).unwrap();

        assert_eq!(users, vec![alice, carol]);
    }

    #[test]
    fn transaction_refs_keep_insertion_order() {
        let conn = get_test_connection();
        let user = create_user(test_user("Alice", "hello@world.com"), &conn).unwrap();

        for transaction_id in [3, 1, 2] {
            append_transaction_ref(user.id, transaction_id, &conn).unwrap();
        }

        let refs = get_user_by_id(user.id, &conn).unwrap().transactions;

        assert_eq!(refs, vec![3, 1, 2]);
    }

    #[test]
    fn remove_transaction_refs_removes_only_given_ids() {
        let conn = get_test_connection();
        let user = create_user(test_user("Alice", "hello@world.com"), &conn).unwrap();
        for transaction_id in [1, 2, 3, 4] {
            append_transaction_ref(user.id, transaction_id, &conn).unwrap();
        }

        remove_transaction_refs(user.id, &[2, 4, 99], &conn).unwrap();

        let refs = get_user_by_id(user.id, &conn).unwrap().transactions;

        assert_eq!(refs, vec![1, 3]);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let conn = get_test_connection();
        let user = create_user(test_user("Alice", "hello@world.com"), &conn).unwrap();

        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["name"], "Alice");
    }
}
