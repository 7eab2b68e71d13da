//! Queries that aggregate a user's transactions for the dashboard charts.

use rusqlite::Connection;

use crate::{Error, money::Amount, user::UserID};

/// The total spent under one category label.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategoryExpense {
    /// The category label.
    pub category: String,
    /// The sum of the expenses with the label, as a positive amount.
    pub total: Amount,
}

/// Sum the expenses of `user_id` per category label, largest total first.
///
/// Income is left out so the totals describe where money went.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub(super) fn expenses_by_category(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryExpense>, Error> {
    connection
        .prepare(
            "SELECT category, SUM(-amount) AS total
             FROM \"transaction\"
             WHERE user_id = ?1 AND amount < 0
             GROUP BY category
             ORDER BY total DESC, category ASC",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok(CategoryExpense {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?
        .map(|expense_result| expense_result.map_err(Error::SqlError))
        .collect()
}
