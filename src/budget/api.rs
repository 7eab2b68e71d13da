//! The JSON route handlers for budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    budget::{Budget, BudgetInput, create_budget, delete_budget, get_budgets, update_budget},
    extract::{Json, MessageResponse, parse_id},
    timezone::current_local_date,
    user::UserID,
};

/// The state needed by the budget API.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The timezone used for the default start date.
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The response to listing budgets.
#[derive(Debug, Serialize)]
pub struct BudgetsResponse {
    /// The user's budgets, latest start date first.
    pub budgets: Vec<Budget>,
    /// A human readable status message.
    pub message: &'static str,
}

/// The response to creating or updating a budget.
#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    /// The budget as stored.
    pub budget: Budget,
    /// A human readable status message.
    pub message: &'static str,
}

/// A route handler for listing the signed in user's budgets.
pub async fn list_budgets_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<BudgetsResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(Json(BudgetsResponse {
        budgets: get_budgets(user_id, &connection)?,
        message: "Budgets retrieved successfully",
    }))
}

/// A route handler for creating a budget. Responds with 201 and the stored budget.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Json(input): Json<BudgetInput>,
) -> Result<Response, Error> {
    let new_budget = input.validate(current_local_date(&state.local_timezone)?)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = create_budget(user_id, new_budget, &connection)?;
    tracing::debug!("User {user_id} created budget {}", budget.id);

    Ok((
        StatusCode::CREATED,
        Json(BudgetResponse {
            budget,
            message: "Budget created successfully",
        }),
    )
        .into_response())
}

/// A route handler for changing some of the fields of a budget.
pub async fn update_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<String>,
    Json(input): Json<BudgetInput>,
) -> Result<Json<BudgetResponse>, Error> {
    let budget_id = parse_id(&budget_id, "budget")?;
    let update = input.validate_update()?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(Json(BudgetResponse {
        budget: update_budget(user_id, budget_id, update, &connection)?,
        message: "Budget updated successfully",
    }))
}

/// A route handler for deleting a budget.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<String>,
) -> Result<Json<MessageResponse>, Error> {
    let budget_id = parse_id(&budget_id, "budget")?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_budget(user_id, budget_id, &connection)?;
    tracing::debug!("User {user_id} deleted budget {budget_id}");

    Ok(Json(MessageResponse {
        message: "Budget deleted successfully",
    }))
}
