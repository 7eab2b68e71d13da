//! Handler for creating an account.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    auth::{
        PasswordHash, ValidatedPassword, cookie::set_auth_cookie, sign_in::SessionResponse,
        sign_in::SignInState,
    },
    extract::Json,
    user::{User, create_user, normalize_email},
};

/// The details needed to create an account.
#[derive(Debug, Default, Deserialize)]
pub struct SignUpData {
    /// The name shown in the app.
    pub name: Option<String>,
    /// The address the user will sign in with.
    pub email: Option<String>,
    /// The plain text password.
    pub password: Option<String>,
}

/// A sign-up that passed validation, with the password already hashed.
#[derive(Debug)]
pub struct NewUser {
    name: String,
    email: String,
    password_hash: PasswordHash,
}

impl NewUser {
    /// Validate `data` and hash the password with `cost` rounds.
    ///
    /// Does not touch the database, so the slow hashing happens without
    /// holding the connection lock.
    ///
    /// # Errors
    ///
    /// Returns a:
    /// - [Error::MissingFields] if any field is absent or blank,
    /// - [Error::InvalidField] if the email is malformed or the name too long,
    /// - [Error::TooWeak] if the password is easy to guess.
    pub fn new(data: SignUpData, cost: u32) -> Result<Self, Error> {
        let (Some(name), Some(email), Some(password)) = (data.name, data.email, data.password)
        else {
            return Err(Error::MissingFields);
        };

        let name = name.trim();
        if name.is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(Error::MissingFields);
        }

        if name.chars().count() > 255 {
            return Err(Error::InvalidField {
                field: "name",
                reason: "must be at most 255 characters".to_owned(),
            });
        }

        let email = normalize_email(&email)?;
        let password = ValidatedPassword::new(&password, &[name, &email])?;
        let password_hash = PasswordHash::new(password, cost)?;

        Ok(Self {
            name: name.to_owned(),
            email,
            password_hash,
        })
    }

    /// Insert the user into the database.
    ///
    /// # Errors
    ///
    /// Returns [Error::DuplicateEmail] if the email is already registered.
    pub fn insert(self, connection: &Connection) -> Result<User, Error> {
        create_user(&self.name, &self.email, self.password_hash, connection)
    }
}

/// Validate `data` and create a new user, hashing the password with `cost` rounds.
///
/// # Errors
///
/// Returns the errors of [NewUser::new] and [NewUser::insert].
pub fn register_user(data: SignUpData, cost: u32, connection: &Connection) -> Result<User, Error> {
    NewUser::new(data, cost)?.insert(connection)
}

/// Handler for sign-up requests.
///
/// The new user is signed in straight away.
pub async fn sign_up_endpoint(
    State(state): State<SignInState>,
    jar: PrivateCookieJar,
    Json(data): Json<SignUpData>,
) -> Result<Response, Error> {
    let new_user = NewUser::new(data, PasswordHash::DEFAULT_COST)?;
    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        new_user.insert(&connection)?
    };

    tracing::info!("Created user {}", user.id);
    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((StatusCode::CREATED, jar, Json(SessionResponse { user })).into_response())
}
