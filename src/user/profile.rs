//! Reading and updating the signed in user's profile.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    extract::Json,
    field::{check_length, optional_text},
    user::{User, UserID, core::map_user_row, get_user_by_id},
};

/// The most characters a display name may have.
const MAX_NAME_LENGTH: usize = 255;

/// The changes a user may make to their profile.
///
/// Absent or blank first and last names clear the stored value.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// The user's given name.
    pub first_name: Option<String>,
    /// The user's family name.
    pub last_name: Option<String>,
    /// An explicit display name. Derived from the first and last name when absent.
    pub name: Option<String>,
}

/// The JSON body for profile responses.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// The profile as stored.
    pub user: User,
    /// A human readable status message.
    pub message: &'static str,
}

/// The state needed for the profile endpoints.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the profile of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::UserNotFound] if the user no longer exists.
pub fn get_profile(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    get_user_by_id(user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::UserNotFound,
        error => error,
    })
}

/// Apply `update` to the profile of the user with `user_id`.
///
/// The display name is the explicit non-blank `name` if given, otherwise the
/// first and last names joined by a space.
///
/// # Errors
///
/// Returns a:
/// - [Error::InvalidField] if the resulting display name is empty or too long,
/// - [Error::UserNotFound] if the user no longer exists,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn update_profile(
    user_id: UserID,
    update: ProfileUpdate,
    connection: &Connection,
) -> Result<User, Error> {
    let first_name = optional_text(update.first_name);
    let last_name = optional_text(update.last_name);
    let name = optional_text(update.name).unwrap_or_else(|| {
        format!(
            "{} {}",
            first_name.as_deref().unwrap_or_default(),
            last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_owned()
    });

    if name.is_empty() {
        return Err(Error::InvalidField {
            field: "name",
            reason: "must not be empty".to_owned(),
        });
    }

    check_length("name", &name, MAX_NAME_LENGTH)?;

    connection
        .prepare(
            "UPDATE user SET first_name = ?1, last_name = ?2, name = ?3, updated_at = ?4
             WHERE id = ?5
             RETURNING id, name, first_name, last_name, email, password, created_at, updated_at",
        )?
        .query_row(
            (
                first_name,
                last_name,
                name,
                OffsetDateTime::now_utc(),
                user_id.as_i64(),
            ),
            map_user_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UserNotFound,
            error => error.into(),
        })
}

/// A route handler for getting the signed in user's profile.
pub async fn get_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<ProfileResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_profile(user_id, &connection)?;

    Ok(Json(ProfileResponse {
        user,
        message: "Profile retrieved successfully",
    }))
}

/// A route handler for updating the signed in user's profile.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = update_profile(user_id, update, &connection)?;
    tracing::debug!("Updated profile for user {user_id}");

    Ok(Json(ProfileResponse {
        user,
        message: "Profile updated successfully",
    }))
}
