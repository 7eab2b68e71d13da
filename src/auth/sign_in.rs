//! Handlers for signing in and out of a session.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::{HxRedirect, HxRequest};
use rusqlite::Connection;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use time::Duration;

use crate::{
    AppState, Error,
    auth::cookie::{invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    extract::Json,
    user::{User, get_user_by_email},
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
pub const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to sign a user in.
#[derive(Debug, Clone)]
pub struct SignInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignInState> for Key {
    fn from_ref(state: &SignInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInData {
    /// The email address the user signed up with.
    pub email: Option<String>,
    /// The user's password.
    pub password: Option<String>,
    /// Keep the session alive for a week instead of the default duration.
    #[serde(default, deserialize_with = "deserialize_checkbox")]
    pub remember_me: bool,
    /// The page to send the user to after signing in from the log-in page.
    pub redirect_url: Option<String>,
}

/// Accept either a JSON boolean or the string an HTML checkbox submits.
fn deserialize_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Checkbox {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Checkbox>::deserialize(deserializer)? {
        Some(Checkbox::Bool(value)) => value,
        Some(Checkbox::Text(text)) => matches!(text.as_str(), "on" | "true" | "1"),
        None => false,
    })
}

/// The JSON body returned after signing in or up.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The signed in user.
    pub user: User,
}

/// Only allow redirects to pages on this site, and never back to the log-in page.
pub(crate) fn safe_redirect_url(raw_url: Option<&str>) -> Option<String> {
    let url = raw_url?.trim();
    let path = url.split_once('?').map_or(url, |(path, _)| path);

    if !url.starts_with('/') || url.starts_with("//") || path == endpoints::LOG_IN_VIEW {
        tracing::warn!("Ignoring unsafe redirect URL {url:?}");
        return None;
    }

    Some(url.to_owned())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Check `email` and `password` against the stored credentials.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if there is no user with `email` or the
/// password does not match. The two cases are not distinguished.
pub fn authenticate(email: &str, password: &str, connection: &Connection) -> Result<User, Error> {
    let user = find_user_for_sign_in(email, connection)?;

    verify_credentials(user, password)
}

/// Look up the user that signs in with `email`.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if there is no user with `email`.
fn find_user_for_sign_in(email: &str, connection: &Connection) -> Result<User, Error> {
    match get_user_by_email(email, connection) {
        Ok(user) => Ok(user),
        Err(Error::NotFound) => Err(Error::InvalidCredentials),
        Err(error) => Err(error),
    }
}

/// Check `password` against the hash stored for `user`.
///
/// Does not touch the database, so callers should release the connection lock
/// before calling this.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the password does not match.
pub fn verify_credentials(user: User, password: &str) -> Result<User, Error> {
    if user.password_hash.verify(password)? {
        Ok(user)
    } else {
        Err(Error::InvalidCredentials)
    }
}

/// Handler for sign-in requests.
///
/// On success the session cookie is set and the user is returned. HTMX
/// requests are also told to redirect to the dashboard, or the page the user
/// originally asked for.
pub async fn sign_in_endpoint(
    State(state): State<SignInState>,
    HxRequest(is_htmx): HxRequest,
    jar: PrivateCookieJar,
    Json(data): Json<SignInData>,
) -> Result<Response, Error> {
    let (Some(email), Some(password)) = (non_blank(data.email), non_blank(data.password)) else {
        return Err(Error::MissingFields);
    };

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        find_user_for_sign_in(&email, &connection)?
    };
    let user = verify_credentials(user, &password)?;

    let duration = if data.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };
    let jar = set_auth_cookie(jar, user.id, duration)?;
    tracing::info!("User {} signed in", user.id);

    let hx_redirect = is_htmx.then(|| {
        HxRedirect(
            safe_redirect_url(data.redirect_url.as_deref())
                .unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned()),
        )
    });

    Ok((jar, hx_redirect, Json(SessionResponse { user })).into_response())
}

/// Handler for API sign-out requests. Always succeeds.
pub async fn sign_out_endpoint(jar: PrivateCookieJar) -> Response {
    (
        invalidate_auth_cookie(jar),
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// Invalidate the session cookie and send the user to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    (
        invalidate_auth_cookie(jar),
        Redirect::to(endpoints::LOG_IN_VIEW),
    )
        .into_response()
}
