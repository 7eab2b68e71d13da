//! A remote procedure call surface over the same operations as the JSON API.
//!
//! Clients POST a JSON input to `/rpc/{procedure}`, e.g. `/rpc/transactions.getSummary`
//! or `/rpc/transactions/getSummary`, and receive the procedure's output as JSON.
//! Errors use the same status codes and `{"error": ...}` bodies as the REST routes.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use time::{Date, Duration};

use crate::{
    AppState, Error,
    auth::{extend_auth_cookie_duration_if_needed, verify_session},
    budget::{
        BudgetInput, BudgetResponse, BudgetsResponse, create_budget, delete_budget, get_budgets,
        update_budget,
    },
    category::{
        CategoriesResponse, CategoryInput, CategoryResponse, create_category, delete_category,
        get_categories, update_category,
    },
    database_id::DatabaseId,
    extract::{Json, MessageResponse},
    goal::{
        ContributionInput, GoalInput, GoalResponse, GoalsResponse, add_contribution, create_goal,
        delete_goal, get_goals, update_goal,
    },
    timezone::current_local_date,
    transaction::{
        DeleteResponse, TransactionFilter, TransactionInput, TransactionQuery, create_transaction,
        delete_transaction, get_category_breakdown, get_export_rows, get_summary,
        list_transactions, update_transaction,
    },
    user::{ProfileResponse, ProfileUpdate, User, UserID, get_profile, update_profile},
};

/// The state needed by the RPC endpoint.
///
/// The session cookie is read with the app's cookie key through [PrivateCookieJar].
#[derive(Debug, Clone)]
pub struct RpcState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The timezone used for default dates.
    pub local_timezone: String,
    /// The duration by which each authenticated call extends the session.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for RpcState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

/// Every procedure a client may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    /// Check that the server is up. The only procedure that needs no session.
    HealthCheck,
    /// Echo the signed in user.
    PrivateData,
    /// List transactions with optional filters.
    GetTransactions,
    /// Record a transaction.
    CreateTransaction,
    /// Replace the fields of a transaction.
    UpdateTransaction,
    /// Delete a transaction.
    DeleteTransaction,
    /// Income and expense totals.
    GetSummary,
    /// Transaction counts and totals grouped by category label.
    GetTransactionCategories,
    /// Every transaction as an export row.
    ExportTransactions,
    /// List categories with their spending figures.
    ListCategories,
    /// Create a category.
    CreateCategory,
    /// Change some fields of a category.
    UpdateCategory,
    /// Delete a category.
    DeleteCategory,
    /// List budgets with their spent amounts.
    ListBudgets,
    /// Create a budget.
    CreateBudget,
    /// Change some fields of a budget.
    UpdateBudget,
    /// Delete a budget.
    DeleteBudget,
    /// List savings goals with their saved amounts.
    ListGoals,
    /// Create a savings goal.
    CreateGoal,
    /// Change some fields of a savings goal.
    UpdateGoal,
    /// Delete a savings goal.
    DeleteGoal,
    /// Add a contribution to a savings goal.
    ContributeToGoal,
    /// Get the signed in user's profile.
    GetProfile,
    /// Update the signed in user's profile.
    UpdateProfile,
}

impl Procedure {
    /// Look up a procedure by name. Segments may be separated by dots or slashes.
    ///
    /// # Errors
    /// Returns [Error::ProcedureNotFound] if no procedure has that name.
    pub fn parse(name: &str) -> Result<Self, Error> {
        let name = name.trim_matches('/').replace('/', ".");

        let procedure = match name.as_str() {
            "healthCheck" => Procedure::HealthCheck,
            "privateData" => Procedure::PrivateData,
            "transactions.getTransactions" => Procedure::GetTransactions,
            "transactions.createTransaction" => Procedure::CreateTransaction,
            "transactions.updateTransaction" => Procedure::UpdateTransaction,
            "transactions.deleteTransaction" => Procedure::DeleteTransaction,
            "transactions.getSummary" => Procedure::GetSummary,
            "transactions.getCategories" => Procedure::GetTransactionCategories,
            "transactions.exportTransactions" => Procedure::ExportTransactions,
            "categories.list" => Procedure::ListCategories,
            "categories.create" => Procedure::CreateCategory,
            "categories.update" => Procedure::UpdateCategory,
            "categories.delete" => Procedure::DeleteCategory,
            "budgets.list" => Procedure::ListBudgets,
            "budgets.create" => Procedure::CreateBudget,
            "budgets.update" => Procedure::UpdateBudget,
            "budgets.delete" => Procedure::DeleteBudget,
            "goals.list" => Procedure::ListGoals,
            "goals.create" => Procedure::CreateGoal,
            "goals.update" => Procedure::UpdateGoal,
            "goals.delete" => Procedure::DeleteGoal,
            "goals.contribute" => Procedure::ContributeToGoal,
            "user.getProfile" => Procedure::GetProfile,
            "user.updateProfile" => Procedure::UpdateProfile,
            _ => return Err(Error::ProcedureNotFound(name)),
        };

        Ok(procedure)
    }
}

/// The input of procedures that act on one row.
#[derive(Debug, Default, Deserialize)]
struct IdInput {
    id: Option<DatabaseId>,
}

/// The input of partial updates: the row's ID next to the fields to change.
#[derive(Debug, Deserialize)]
struct UpdateInput<T> {
    id: Option<DatabaseId>,
    #[serde(flatten)]
    fields: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributeInput {
    goal_id: Option<DatabaseId>,
    #[serde(flatten)]
    contribution: ContributionInput,
}

#[derive(Debug, Serialize)]
struct PrivateData {
    message: &'static str,
    user: User,
}

/// Parse the request body as the input of a procedure.
///
/// An empty body is treated as an empty object so that procedures without
/// required input can be called without one.
fn parse_input<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(body).map_err(|error| Error::InvalidJson(error.to_string()))?
    };

    let value = match value {
        Value::Null => Value::Object(Map::new()),
        value => value,
    };

    serde_json::from_value(value).map_err(|error| Error::InvalidJson(error.to_string()))
}

fn output<T: Serialize>(value: T) -> Result<Response, Error> {
    Ok(Json(value).into_response())
}

/// Run `procedure` for the signed in user `user_id` with the raw JSON `body`.
///
/// # Errors
/// Returns the error of the underlying operation, or [Error::InvalidJson] if
/// `body` does not match the procedure's input.
pub fn dispatch(
    procedure: Procedure,
    user_id: UserID,
    body: &[u8],
    today: Date,
    connection: &Connection,
) -> Result<Response, Error> {
    match procedure {
        Procedure::HealthCheck => output("OK"),
        Procedure::PrivateData => output(PrivateData {
            message: "This is private",
            user: get_profile(user_id, connection)?,
        }),
        Procedure::GetTransactions => {
            let filter = TransactionFilter::try_from(parse_input::<TransactionQuery>(body)?)?;
            output(list_transactions(user_id, &filter, connection)?)
        }
        Procedure::CreateTransaction => {
            let new_transaction = parse_input::<TransactionInput>(body)?.validate()?;
            output(create_transaction(user_id, new_transaction, connection)?)
        }
        Procedure::UpdateTransaction => {
            let (id, update) = parse_input::<TransactionInput>(body)?.validate_update()?;
            output(update_transaction(user_id, id, update, connection)?)
        }
        Procedure::DeleteTransaction => {
            let id = parse_input::<IdInput>(body)?
                .id
                .ok_or(Error::MissingTransactionId)?;
            delete_transaction(user_id, id, connection)?;
            output(DeleteResponse { success: true, id })
        }
        Procedure::GetSummary => output(get_summary(user_id, connection)?),
        Procedure::GetTransactionCategories => {
            output(get_category_breakdown(user_id, connection)?)
        }
        Procedure::ExportTransactions => output(get_export_rows(user_id, connection)?),
        Procedure::ListCategories => output(CategoriesResponse {
            categories: get_categories(user_id, today, connection)?,
            message: "Categories retrieved successfully",
        }),
        Procedure::CreateCategory => {
            let new_category = parse_input::<CategoryInput>(body)?.validate()?;
            output(CategoryResponse {
                category: create_category(user_id, new_category, today, connection)?,
                message: "Category created successfully",
            })
        }
        Procedure::UpdateCategory => {
            let input = parse_input::<UpdateInput<CategoryInput>>(body)?;
            let id = input.id.ok_or(Error::MissingFields)?;
            let update = input.fields.validate_update()?;
            output(CategoryResponse {
                category: update_category(user_id, id, update, today, connection)?,
                message: "Category updated successfully",
            })
        }
        Procedure::DeleteCategory => {
            let id = parse_input::<IdInput>(body)?.id.ok_or(Error::MissingFields)?;
            delete_category(user_id, id, connection)?;
            output(MessageResponse {
                message: "Category deleted successfully",
            })
        }
        Procedure::ListBudgets => output(BudgetsResponse {
            budgets: get_budgets(user_id, connection)?,
            message: "Budgets retrieved successfully",
        }),
        Procedure::CreateBudget => {
            let new_budget = parse_input::<BudgetInput>(body)?.validate(today)?;
            output(BudgetResponse {
                budget: create_budget(user_id, new_budget, connection)?,
                message: "Budget created successfully",
            })
        }
        Procedure::UpdateBudget => {
            let input = parse_input::<UpdateInput<BudgetInput>>(body)?;
            let id = input.id.ok_or(Error::MissingFields)?;
            let update = input.fields.validate_update()?;
            output(BudgetResponse {
                budget: update_budget(user_id, id, update, connection)?,
                message: "Budget updated successfully",
            })
        }
        Procedure::DeleteBudget => {
            let id = parse_input::<IdInput>(body)?.id.ok_or(Error::MissingFields)?;
            delete_budget(user_id, id, connection)?;
            output(MessageResponse {
                message: "Budget deleted successfully",
            })
        }
        Procedure::ListGoals => output(GoalsResponse {
            goals: get_goals(user_id, connection)?,
            message: "Goals retrieved successfully",
        }),
        Procedure::CreateGoal => {
            let new_goal = parse_input::<GoalInput>(body)?.validate()?;
            output(GoalResponse {
                goal: create_goal(user_id, new_goal, connection)?,
                message: "Goal created successfully",
            })
        }
        Procedure::UpdateGoal => {
            let input = parse_input::<UpdateInput<GoalInput>>(body)?;
            let id = input.id.ok_or(Error::MissingFields)?;
            let update = input.fields.validate_update()?;
            output(GoalResponse {
                goal: update_goal(user_id, id, update, connection)?,
                message: "Goal updated successfully",
            })
        }
        Procedure::DeleteGoal => {
            let id = parse_input::<IdInput>(body)?.id.ok_or(Error::MissingFields)?;
            delete_goal(user_id, id, connection)?;
            output(MessageResponse {
                message: "Goal deleted successfully",
            })
        }
        Procedure::ContributeToGoal => {
            let input = parse_input::<ContributeInput>(body)?;
            let goal_id = input.goal_id.ok_or(Error::MissingFields)?;
            let contribution = input.contribution.validate(today)?;
            let (goal, _) = add_contribution(user_id, goal_id, contribution, connection)?;
            output(GoalResponse {
                goal,
                message: "Contribution added successfully",
            })
        }
        Procedure::GetProfile => output(ProfileResponse {
            user: get_profile(user_id, connection)?,
            message: "Profile retrieved successfully",
        }),
        Procedure::UpdateProfile => {
            let update = parse_input::<ProfileUpdate>(body)?;
            output(ProfileResponse {
                user: update_profile(user_id, update, connection)?,
                message: "Profile updated successfully",
            })
        }
    }
}

/// A route handler that runs the procedure named in the path.
///
/// Every procedure except `healthCheck` requires a valid session cookie, and
/// calling one extends the session like the JSON API does.
pub async fn rpc_endpoint(
    State(state): State<RpcState>,
    jar: PrivateCookieJar,
    Path(procedure): Path<String>,
    body: Bytes,
) -> Result<Response, Error> {
    let procedure = Procedure::parse(&procedure)?;

    if procedure == Procedure::HealthCheck {
        return output("OK");
    }

    let user_id = verify_session(&jar).ok_or(Error::Unauthenticated)?;
    tracing::debug!("User {user_id} called {procedure:?}");
    let result = run_procedure(&state, procedure, user_id, &body);

    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error:?}. Rolling back cookie jar.");
            jar
        }
    };

    Ok((jar, result).into_response())
}

fn run_procedure(
    state: &RpcState,
    procedure: Procedure,
    user_id: UserID,
    body: &[u8],
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    dispatch(procedure, user_id, body, today, &connection)
}
