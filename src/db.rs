//! Sets up the application's SQLite database.

use rusqlite::{Connection, Row, functions::FunctionFlags};

use crate::{
    budget::create_budget_table, category::create_category_table, goal::create_goal_tables,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the tables for every domain model if they do not already exist.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if any table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    register_functions(connection)?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_category_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_goal_tables(&transaction)?;

    transaction.commit()
}

/// Add the SQL functions the queries rely on to `connection`.
///
/// `unicode_lower(text)` lower cases all of `text`, whereas SQLite's built-in
/// `lower` only folds ASCII letters. NULL stays NULL.
fn register_functions(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            let text = context.get::<Option<String>>(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}

/// Read the non-negative count in column `index` of `row`.
///
/// # Errors
/// Returns an error if the column is not an integer or is negative.
pub(crate) fn get_count(row: &Row, index: usize) -> Result<u64, rusqlite::Error> {
    let count: i64 = row.get(index)?;

    u64::try_from(count).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(index, count))
}
