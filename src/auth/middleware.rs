//! Authentication middleware that validates the session cookie, extends sessions, and rejects
//! or redirects unauthenticated requests.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use time::Duration;

use crate::{
    AppState, Error,
    auth::cookie::{extend_auth_cookie_duration_if_needed, verify_session},
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration by which each authenticated request extends the session.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Build the log-in page URL that sends the user back to `request`'s page afterwards.
fn log_in_redirect_url(request: &Request) -> String {
    let target = request
        .uri()
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .filter(|target| target.starts_with('/') && !target.starts_with("//"))
        .unwrap_or(endpoints::DASHBOARD_VIEW);

    match serde_urlencoded::to_string([("redirect_url", target)]) {
        Ok(query) => format!("{}?{}", endpoints::LOG_IN_VIEW, query),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

/// Checks for a valid session cookie before running the request.
///
/// On success the user ID is placed into the request extensions and the session is extended.
/// Otherwise the response from `reject` is returned and the handler never runs.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    reject: impl Fn(&Request) -> Response,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::<Key>::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}");
            return reject(&Request::from_parts(parts, body));
        }
    };

    let Some(user_id) = verify_session(&jar) else {
        return reject(&Request::from_parts(parts, body));
    };

    parts.extensions.insert(user_id);
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };

    // A session cookie set by the handler takes precedence.
    if !parts.headers.contains_key(SET_COOKIE) {
        for (key, val) in jar.into_response().headers().iter() {
            if key == SET_COOKIE {
                parts.headers.append(key, val.to_owned());
            }
        }
    }

    Response::from_parts(parts, body)
}

/// Middleware for the JSON API.
///
/// Requests without a valid session get a 401 JSON error response.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |_| {
        Error::Unauthenticated.into_response()
    })
    .await
}

/// Middleware for HTML pages.
///
/// Requests without a valid session are redirected to the log-in page, which
/// will send the user back to the page they asked for once they log in.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn page_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |request| {
        Redirect::to(&log_in_redirect_url(request)).into_response()
    })
    .await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Router,
        extract::State,
        middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use axum_test::TestServer;
    use sha2::Digest;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{COOKIE_TOKEN, auth_guard, cookie::set_auth_cookie, page_guard},
        endpoints,
        user::UserID,
    };

    use super::AuthState;

    async fn whoami(Extension(user_id): Extension<UserID>) -> String {
        user_id.to_string()
    }

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserID::new(1), state.cookie_duration)
    }

    const TEST_LOG_IN_ROUTE: &str = "/test_log_in";
    const TEST_PAGE_ROUTE: &str = "/protected";
    const TEST_API_ROUTE: &str = "/api/protected";

    fn get_test_server(cookie_duration: Duration) -> TestServer {
        let hash = sha2::Sha512::digest("nafstenoas");
        let state = AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration,
        };

        let app = Router::new()
            .route(TEST_PAGE_ROUTE, get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), page_guard))
            .merge(
                Router::new()
                    .route(TEST_API_ROUTE, get(whoami))
                    .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard)),
            )
            .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn valid_cookie_passes_user_id_to_handler() {
        let server = get_test_server(Duration::minutes(5));
        let token_cookie = server.post(TEST_LOG_IN_ROUTE).await.cookie(COOKIE_TOKEN);

        let response = server.get(TEST_API_ROUTE).add_cookie(token_cookie).await;

        response.assert_status_ok();
        response.assert_text("1");
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[tokio::test]
    async fn auth_guard_extends_valid_cookie_duration() {
        let server = get_test_server(Duration::minutes(5));
        let token_cookie = server.post(TEST_LOG_IN_ROUTE).await.cookie(COOKIE_TOKEN);

        let response = server.get(TEST_PAGE_ROUTE).add_cookie(token_cookie).await;

        response.assert_status_ok();
        let auth_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            auth_cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + Duration::minutes(5),
        );
        assert_eq!(auth_cookie.secure(), Some(true));
        assert_eq!(auth_cookie.http_only(), Some(true));
        assert_eq!(auth_cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn api_route_without_cookie_is_unauthorized() {
        let server = get_test_server(Duration::minutes(5));

        let response = server.get(TEST_API_ROUTE).await;

        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn api_route_with_invalid_cookie_is_unauthorized() {
        let server = get_test_server(Duration::minutes(5));

        let response = server
            .get(TEST_API_ROUTE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "FOOBAR")).build())
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn page_without_cookie_redirects_to_log_in() {
        let server = get_test_server(Duration::minutes(5));

        let response = server.get(TEST_PAGE_ROUTE).await;

        response.assert_status_see_other();
        let expected_query =
            serde_urlencoded::to_string([("redirect_url", TEST_PAGE_ROUTE)]).unwrap();
        let expected_location = format!("{}?{}", endpoints::LOG_IN_VIEW, expected_query);
        assert_eq!(response.header("location"), expected_location);
    }

    #[tokio::test]
    async fn page_with_expired_session_redirects_to_log_in() {
        let server = get_test_server(Duration::seconds(-1));
        let token_cookie = server.post(TEST_LOG_IN_ROUTE).await.cookie(COOKIE_TOKEN);

        let response = server.get(TEST_PAGE_ROUTE).add_cookie(token_cookie).await;

        response.assert_status_see_other();
    }
}
