//! Database operations for budgets.

use rusqlite::{Connection, Row, named_params};
use time::OffsetDateTime;

use crate::{
    Error,
    budget::{Budget, BudgetUpdate, NewBudget, check_date_range},
    database_id::BudgetId,
    user::UserID,
};

const SELECT_BUDGETS: &str = "SELECT
        b.id, b.category, b.budget_amount, b.period, b.color, b.start_date, b.end_date,
        b.user_id, b.created_at, b.updated_at,
        COALESCE((
            SELECT SUM(-t.amount) FROM \"transaction\" t
            WHERE t.user_id = b.user_id
                AND t.category = b.category
                AND t.type = 'expense'
                AND t.date BETWEEN b.start_date AND b.end_date
        ), 0)
    FROM budget b
    WHERE b.user_id = :user_id AND (:budget_id IS NULL OR b.id = :budget_id)
    ORDER BY b.start_date DESC, b.id DESC";

fn select_budgets(
    user_id: UserID,
    budget_id: Option<BudgetId>,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(SELECT_BUDGETS)?
        .query_map(
            named_params! { ":user_id": user_id.as_i64(), ":budget_id": budget_id },
            map_budget_row,
        )?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Retrieve the budgets of the user `user_id`, latest start date first, with
/// the amount spent in each.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    select_budgets(user_id, None, connection)
}

/// Retrieve the budget `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(user_id: UserID, id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    select_budgets(user_id, Some(id), connection)?
        .pop()
        .ok_or(Error::NotFound)
}

/// Create a budget owned by `user_id` and return it as stored.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_budget(
    user_id: UserID,
    new_budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection.execute(
        "INSERT INTO budget
         (category, budget_amount, period, color, start_date, end_date, user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        (
            new_budget.category,
            new_budget.budget_amount,
            new_budget.period,
            new_budget.color,
            new_budget.start_date,
            new_budget.end_date,
            user_id.as_i64(),
            OffsetDateTime::now_utc(),
        ),
    )?;

    get_budget(user_id, connection.last_insert_rowid(), connection)
}

/// Apply `update` to the budget `id` owned by `user_id` and return it as stored.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingBudget] if `id` does not refer to a budget owned by `user_id`,
/// - [Error::InvalidField] if the updated budget would end before it starts,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    user_id: UserID,
    id: BudgetId,
    update: BudgetUpdate,
    connection: &Connection,
) -> Result<Budget, Error> {
    let current = get_budget(user_id, id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingBudget,
        error => error,
    })?;

    let start_date = update.start_date.unwrap_or(current.start_date);
    let end_date = update.end_date.unwrap_or(current.end_date);
    check_date_range(start_date, end_date)?;

    let rows_affected = connection.execute(
        "UPDATE budget SET
            category = :category,
            budget_amount = :budget_amount,
            period = :period,
            color = :color,
            start_date = :start_date,
            end_date = :end_date,
            updated_at = :updated_at
         WHERE id = :id AND user_id = :user_id",
        named_params! {
            ":category": update.category.unwrap_or(current.category),
            ":budget_amount": update.budget_amount.unwrap_or(current.budget_amount),
            ":period": update.period.unwrap_or(current.period),
            ":color": update.color.unwrap_or(current.color),
            ":start_date": start_date,
            ":end_date": end_date,
            ":updated_at": OffsetDateTime::now_utc(),
            ":id": id,
            ":user_id": user_id.as_i64(),
        },
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    get_budget(user_id, id, connection)
}

/// Delete the budget `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(user_id: UserID, id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Initialize the budget table and indexes.
///
/// # Errors
/// Returns an error if the table cannot be created.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,
            budget_amount INTEGER NOT NULL CHECK (budget_amount > 0),
            period TEXT NOT NULL CHECK (period IN ('weekly', 'monthly', 'yearly')),
            color TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (end_date >= start_date),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_budget_user_start ON budget(user_id, start_date DESC);",
    )
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        budget_amount: row.get(2)?,
        period: row.get(3)?,
        color: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        user_id: UserID::new(row.get(7)?),
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        spent_amount: row.get(10)?,
    })
}
