use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState,
    auth::{COOKIE_TOKEN, PasswordHash, ValidatedPassword},
    build_router,
    db::initialize,
    endpoints,
    user::{User, create_user},
};

/// The password of the users created by [create_test_user] and [create_other_user].
pub(crate) const TEST_PASSWORD: &str = "averysecretandsecurepassword";

pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&conn).expect("Could not initialize database");
    conn
}

fn test_password_hash() -> PasswordHash {
    // The minimum bcrypt cost keeps the tests fast.
    PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
        .expect("Could not hash test password")
}

pub(crate) fn create_test_user(conn: &Connection) -> User {
    create_user("Test User", "test@example.com", test_password_hash(), conn)
        .expect("Could not create test user")
}

pub(crate) fn create_other_user(conn: &Connection, email: &str) -> User {
    create_user("Other User", email, test_password_hash(), conn)
        .expect("Could not create other user")
}

pub(crate) fn get_test_app_state() -> AppState {
    let conn = Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(conn, "nafstenoas", "Etc/UTC").expect("Could not create app state")
}

/// Create a test server for the full app with a registered user, and sign
/// that user in.
///
/// Returns the server, the app state, the signed in user and their session cookie.
pub(crate) async fn sign_in_test_server() -> (TestServer, AppState, User, Cookie<'static>) {
    let state = get_test_app_state();
    let user = create_test_user(&state.db_connection.lock().unwrap());
    let server =
        TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

    let response = server
        .post(endpoints::SIGN_IN_API)
        .json(&json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();
    let cookie = response.cookie(COOKIE_TOKEN);

    (server, state, user, cookie)
}
