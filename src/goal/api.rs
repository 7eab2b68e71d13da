//! The JSON route handlers for savings goals.

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
    extract::{Json, MessageResponse, parse_id},
    goal::{
        ContributionInput, Goal, GoalInput, add_contribution, create_goal, delete_goal, get_goals,
        update_goal,
    },
    timezone::current_local_date,
    user::UserID,
};

/// The state needed by the savings goal API.
#[derive(Debug, Clone)]
pub struct GoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The timezone used for the default contribution date.
    pub local_timezone: String,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The response to listing savings goals.
#[derive(Debug, Serialize)]
pub struct GoalsResponse {
    /// The user's goals, nearest deadline first.
    pub goals: Vec<Goal>,
    /// A human readable status message.
    pub message: &'static str,
}

/// The response to creating, updating or contributing to a savings goal.
#[derive(Debug, Serialize)]
pub struct GoalResponse {
    /// The goal as stored.
    pub goal: Goal,
    /// A human readable status message.
    pub message: &'static str,
}

/// A route handler for listing the signed in user's savings goals.
pub async fn list_goals_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<GoalsResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(Json(GoalsResponse {
        goals: get_goals(user_id, &connection)?,
        message: "Goals retrieved successfully",
    }))
}

/// A route handler for creating a savings goal. Responds with 201 and the stored goal.
pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Json(input): Json<GoalInput>,
) -> Result<Response, Error> {
    let new_goal = input.validate()?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = create_goal(user_id, new_goal, &connection)?;
    tracing::debug!("User {user_id} created goal {}", goal.id);

    Ok((
        StatusCode::CREATED,
        Json(GoalResponse {
            goal,
            message: "Goal created successfully",
        }),
    )
        .into_response())
}

/// A route handler for changing some of the fields of a savings goal.
pub async fn update_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<String>,
    Json(input): Json<GoalInput>,
) -> Result<Json<GoalResponse>, Error> {
    let goal_id = parse_id(&goal_id, "goal")?;
    let update = input.validate_update()?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(Json(GoalResponse {
        goal: update_goal(user_id, goal_id, update, &connection)?,
        message: "Goal updated successfully",
    }))
}

/// A route handler for deleting a savings goal and its contributions.
pub async fn delete_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<String>,
) -> Result<Json<MessageResponse>, Error> {
    let goal_id = parse_id(&goal_id, "goal")?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_goal(user_id, goal_id, &connection)?;
    tracing::debug!("User {user_id} deleted goal {goal_id}");

    Ok(Json(MessageResponse {
        message: "Goal deleted successfully",
    }))
}

/// A route handler for adding money to (or taking money out of) a savings goal.
///
/// Responds with 201 and the goal with its new total.
pub async fn contribute_to_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<String>,
    Json(input): Json<ContributionInput>,
) -> Result<Response, Error> {
    let goal_id = parse_id(&goal_id, "goal")?;
    let contribution = input.validate(current_local_date(&state.local_timezone)?)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let (goal, contribution) = add_contribution(user_id, goal_id, contribution, &connection)?;
    tracing::debug!(
        "User {user_id} added contribution {} to goal {goal_id}",
        contribution.id
    );

    Ok((
        StatusCode::CREATED,
        Json(GoalResponse {
            goal,
            message: "Contribution added successfully",
        }),
    )
        .into_response())
}
