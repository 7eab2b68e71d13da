//! The fallback handler for requests that match no route.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::{Error, html::error_view};

/// Respond with a JSON error for API and RPC paths and an HTML page otherwise.
pub async fn get_404_not_found(uri: Uri) -> Response {
    let path = uri.path();

    if path.starts_with("/api/") || path.starts_with("/rpc/") {
        return Error::NotFound.into_response();
    }

    get_404_not_found_response()
}

/// The HTML page for a missing page.
pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Something's missing.",
            "Sorry, we can't find that page. You'll find lots to explore on the home page.",
        ),
    )
        .into_response()
}
