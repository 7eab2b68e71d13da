//! Fintrack is a web app for tracking personal income, expenses, budgets and
//! savings goals.
//!
//! This library provides a JSON REST API, an RPC surface that mirrors it for
//! typed clients, and a handful of server-rendered HTML pages with charts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod category;
mod dashboard;
mod database_id;
mod date;
mod db;
mod endpoints;
mod extract;
mod field;
mod goal;
mod html;
mod logging;
mod money;
mod navigation;
mod not_found;
mod pagination;
mod routing;
mod rpc;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, ValidatedPassword};
pub use budget::{BudgetPeriod, NewBudget, create_budget};
pub use category::{NewCategory, create_category};
pub use db::initialize as initialize_db;
pub use goal::{NewContribution, NewGoal, add_contribution, create_goal};
pub use logging::logging_middleware;
pub use money::Amount;
pub use routing::build_router;
pub use transaction::{NewTransaction, TransactionType, create_transaction};
pub use user::{User, UserID, create_user, get_user_by_email, set_password};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a valid session.
    #[error("Unauthorized")]
    Unauthenticated,

    /// The user provided an unknown email or a wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// One or more required fields were missing (or blank) in the request body.
    #[error("Missing required fields")]
    MissingFields,

    /// A delete request for a transaction did not specify which transaction.
    #[error("Transaction ID is required")]
    MissingTransactionId,

    /// A path parameter could not be parsed as an integer ID.
    ///
    /// The string names the kind of resource, e.g. "category".
    #[error("Invalid {0} ID")]
    InvalidId(&'static str),

    /// A field was present but its value is not acceptable.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// The name of the offending field as the client sent it.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The request body could not be parsed as the expected JSON.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// The query string could not be parsed.
    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),

    /// The user provided a password that is too easy to guess.
    #[error("Password is too weak: {0}")]
    TooWeak(String),

    /// The email address is already registered.
    #[error("Email is already registered")]
    DuplicateEmail,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("Not found")]
    NotFound,

    /// The signed in user no longer exists in the database.
    #[error("User not found")]
    UserNotFound,

    /// Tried to update a transaction that does not exist or belongs to someone else.
    #[error("Transaction not found")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist or belongs to someone else.
    #[error("Transaction not found")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist or belongs to someone else.
    #[error("Category not found")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist or belongs to someone else.
    #[error("Category not found")]
    DeleteMissingCategory,

    /// Tried to update a budget that does not exist or belongs to someone else.
    #[error("Budget not found")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist or belongs to someone else.
    #[error("Budget not found")]
    DeleteMissingBudget,

    /// Tried to update a savings goal that does not exist or belongs to someone else.
    #[error("Goal not found")]
    UpdateMissingGoal,

    /// Tried to delete a savings goal that does not exist or belongs to someone else.
    #[error("Goal not found")]
    DeleteMissingGoal,

    /// Tried to contribute to a savings goal that does not exist or belongs to someone else.
    #[error("Goal not found")]
    ContributeToMissingGoal,

    /// The RPC procedure name does not match any known procedure.
    #[error("Procedure not found: {0}")]
    ProcedureNotFound(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The CSV export could not be written.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that a client should receive for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::MissingFields
            | Error::MissingTransactionId
            | Error::InvalidId(_)
            | Error::InvalidField { .. }
            | Error::InvalidJson(_)
            | Error::InvalidQuery(_)
            | Error::TooWeak(_)
            | Error::DuplicateEmail => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::UserNotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::UpdateMissingBudget
            | Error::DeleteMissingBudget
            | Error::UpdateMissingGoal
            | Error::DeleteMissingGoal
            | Error::ContributeToMissingGoal
            | Error::ProcedureNotFound(_) => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_)
            | Error::CsvError(_)
            | Error::JSONSerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details are only meant for the server logs.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{Error, test_utils::parse_json_body};

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = Error::CsvError("disk on fire".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = parse_json_body(response).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn not_found_conflates_missing_and_not_owned() {
        let update = Error::UpdateMissingTransaction.into_response();
        let delete = Error::DeleteMissingTransaction.into_response();

        assert_eq!(update.status(), StatusCode::NOT_FOUND);
        assert_eq!(delete.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            parse_json_body(update).await["error"],
            "Transaction not found"
        );
    }

    #[test]
    fn missing_fields_is_a_bad_request() {
        assert_eq!(Error::MissingFields.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::MissingFields.to_string(), "Missing required fields");
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
