//! Request extractors whose rejections are reported with the crate's [Error] type.
//!
//! Axum's built-in extractors reject malformed requests with plain text bodies.
//! These wrappers make sure clients always receive the usual JSON error body.

use axum::{
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{Error, database_id::DatabaseId};

/// Like [axum::Json], but rejects with [Error::InvalidJson].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidJson(rejection.body_text())
    }
}

/// Like [axum::extract::Query], but rejects with [Error::InvalidQuery].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Query<T>(pub T);

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidQuery(rejection.body_text())
    }
}

/// A JSON body that only carries a status message, e.g. after a delete.
#[derive(Debug, PartialEq, Serialize)]
pub struct MessageResponse {
    /// A human readable status message.
    pub message: &'static str,
}

/// Parse the raw path parameter `raw` as a database ID.
///
/// # Errors
/// Returns [Error::InvalidId] naming `kind` if `raw` is not an integer.
pub fn parse_id(raw: &str, kind: &'static str) -> Result<DatabaseId, Error> {
    raw.trim().parse().map_err(|_| Error::InvalidId(kind))
}
