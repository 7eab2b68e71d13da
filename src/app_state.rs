//! The state shared by every fintrack route handler.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize, timezone::get_local_offset};

/// Shared state for the fintrack server.
///
/// Handlers take the slice they need through their own state structs, which
/// implement [FromRef] for this type.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Encrypts the session cookie.
    pub cookie_key: Key,

    /// How long a session lasts after the most recent authenticated request.
    pub cookie_duration: Duration,

    /// The canonical name of the timezone that decides what "today" is, e.g.
    /// "Pacific/Auckland". Used for default dates and export file names.
    pub local_timezone: String,

    /// The finance database. Handlers hold the lock for one store operation.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Set up the tables in `db_connection` and derive the cookie key from
    /// `cookie_secret`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or
    /// `local_timezone` is not a known timezone name.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

// `PrivateCookieJar` reads the key through this impl.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the session cookie key from the `SECRET` the server was started with.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::Error;

    use super::{AppState, create_cookie_key};

    #[test]
    fn cookie_key_depends_only_on_secret() {
        assert_eq!(
            create_cookie_key("correct horse").master(),
            create_cookie_key("correct horse").master()
        );
        assert_ne!(
            create_cookie_key("correct horse").master(),
            create_cookie_key("battery staple").master()
        );
    }

    #[test]
    fn new_initializes_database() {
        let state =
            AppState::new(Connection::open_in_memory().unwrap(), "secret", "Etc/UTC").unwrap();

        let connection = state.db_connection.lock().unwrap();
        let user_count: i64 = connection
            .query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(user_count, 0);
    }

    #[test]
    fn new_rejects_unknown_timezone() {
        let result = AppState::new(Connection::open_in_memory().unwrap(), "secret", "Mars/Olympus");

        assert!(
            matches!(result, Err(Error::InvalidTimezoneError(ref name)) if name == "Mars/Olympus"),
            "got {result:?}"
        );
    }
}
