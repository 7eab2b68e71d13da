//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use email_address::{EmailAddress, Options};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::PasswordHash};

/// The longest name or email address a user may have.
const MAX_USER_TEXT_LENGTH: usize = 255;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name shown in the app.
    pub name: String,
    /// The user's given name, if they have provided one.
    pub first_name: Option<String>,
    /// The user's family name, if they have provided one.
    pub last_name: Option<String>,
    /// The address the user signs in with. Always lower case.
    pub email: String,
    /// The user's password hash.
    #[serde(skip)]
    pub password_hash: PasswordHash,
    /// When the user signed up.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the user's profile last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Normalise and check a user supplied email address.
///
/// The address is trimmed and lower cased. Display names such as
/// `Jo <jo@example.com>` are rejected.
///
/// # Errors
///
/// Returns [Error::InvalidField] if `email` is not a valid email address.
pub fn normalize_email(email: &str) -> Result<String, Error> {
    let email = email.trim().to_lowercase();

    if email.chars().count() > MAX_USER_TEXT_LENGTH {
        return Err(Error::InvalidField {
            field: "email",
            reason: format!("must be at most {MAX_USER_TEXT_LENGTH} characters"),
        });
    }

    let options = Options::default().without_display_text();
    match EmailAddress::parse_with_options(&email, options) {
        Ok(address) => Ok(address.email()),
        Err(error) => Err(Error::InvalidField {
            field: "email",
            reason: format!("is not an email address ({error})"),
        }),
    }
}

/// Create and insert a new user into the database.
///
/// `email` should already be normalized with [normalize_email].
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if another user has signed up with `email`,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    name: &str,
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(
            "INSERT INTO user (name, email, password, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             RETURNING id, name, first_name, last_name, email, password, created_at, updated_at",
        )?
        .query_row(
            (name.trim(), email, password_hash.as_str(), now),
            map_user_row,
        )
        .map_err(Error::from)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, name, first_name, last_name, email, password, created_at, updated_at
             FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(Error::from)
}

/// Get the user who signed up with `email`.
///
/// The lookup ignores case and surrounding whitespace.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has that email address.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    let email = email.trim().to_lowercase();

    connection
        .prepare(
            "SELECT id, name, first_name, last_name, email, password, created_at, updated_at
             FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(Error::from)
}

/// Replace the password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::UserNotFound] if there is no such user.
pub fn set_password(
    user_id: UserID,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1, updated_at = ?2 WHERE id = ?3",
        (
            password_hash.as_str(),
            OffsetDateTime::now_utc(),
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UserNotFound);
    }

    Ok(())
}

/// Map a database row to a [User].
///
/// Expects the columns in the order id, name, first_name, last_name, email,
/// password, created_at, updated_at.
pub(crate) fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(5)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
