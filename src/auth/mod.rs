//! Sessions, passwords and the handlers for signing in, up and out.

mod cookie;
mod log_in_page;
mod middleware;
mod password;
mod sign_in;
mod sign_up;
mod token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
pub use cookie::{DEFAULT_COOKIE_DURATION, extend_auth_cookie_duration_if_needed, verify_session};
pub use log_in_page::get_log_in_page;
pub use middleware::{auth_guard, page_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use sign_in::{get_log_out, sign_in_endpoint, sign_out_endpoint};
pub use sign_up::sign_up_endpoint;
