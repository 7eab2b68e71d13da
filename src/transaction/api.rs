//! The JSON route handlers for transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    extract::{Json, Query, parse_id},
    timezone::current_local_date,
    transaction::{
        CategoryBreakdown, Transaction, TransactionFilter, TransactionInput, TransactionQuery,
        TransactionSummary, create_transaction, delete_transaction, export_file_name,
        get_category_breakdown, get_export_rows, get_summary, list_transactions,
        update_transaction, write_csv,
    },
    user::UserID,
};

/// The state needed by the transaction API.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The timezone used to date CSV exports.
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string of a delete request.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// The ID of the transaction to delete, as sent by the client.
    pub id: Option<String>,
}

/// The response to a successful delete.
#[derive(Debug, PartialEq, Serialize)]
pub struct DeleteResponse {
    /// Always true.
    pub success: bool,
    /// The ID of the deleted transaction.
    pub id: TransactionId,
}

/// Parse the ID of a delete request.
///
/// # Errors
/// Returns [Error::MissingTransactionId] if no ID was given and
/// [Error::InvalidId] if it is not an integer.
pub fn parse_delete_id(query: DeleteQuery) -> Result<TransactionId, Error> {
    match query.id {
        Some(id) if !id.trim().is_empty() => parse_id(&id, "transaction"),
        _ => Err(Error::MissingTransactionId),
    }
}

/// A route handler for listing the signed in user's transactions.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = TransactionFilter::try_from(query)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    list_transactions(user_id, &filter, &connection).map(Json)
}

/// A route handler for recording a new transaction. Responds with 201 and the stored transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(input): Json<TransactionInput>,
) -> Result<Response, Error> {
    let new_transaction = input.validate()?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(user_id, new_transaction, &connection)?;
    tracing::debug!("User {user_id} created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}

/// A route handler for replacing the fields of a transaction.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(input): Json<TransactionInput>,
) -> Result<Json<Transaction>, Error> {
    let (id, update) = input.validate_update()?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_transaction(user_id, id, update, &connection).map(Json)
}

/// A route handler for deleting a transaction given by the `id` query parameter.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, Error> {
    let id = parse_delete_id(query)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(user_id, id, &connection)?;
    tracing::debug!("User {user_id} deleted transaction {id}");

    Ok(Json(DeleteResponse { success: true, id }))
}

/// A route handler for the income and expense totals.
pub async fn get_summary_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<TransactionSummary>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_summary(user_id, &connection).map(Json)
}

/// A route handler for the per-category transaction counts and totals.
pub async fn get_category_breakdown_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<CategoryBreakdown>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_category_breakdown(user_id, &connection).map(Json)
}

/// A route handler that downloads every transaction as a CSV file.
pub async fn export_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let rows = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_export_rows(user_id, &connection)?
    };

    let csv = write_csv(&rows)?;
    let file_name = export_file_name(current_local_date(&state.local_timezone)?);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .map_err(|error| Error::CsvError(error.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
