//! Totals over a user's transactions.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    db::get_count,
    money::{Amount, float_format},
    user::UserID,
};

/// Income and expense totals across all of a user's transactions.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    /// The sum of all income.
    #[serde(with = "float_format")]
    pub total_income: Amount,
    /// The sum of all expenses as a positive amount.
    #[serde(with = "float_format")]
    pub total_expenses: Amount,
    /// Income minus expenses.
    #[serde(with = "float_format")]
    pub net_balance: Amount,
    /// The number of transactions.
    pub transaction_count: u64,
}

/// The number and total of a user's transactions with one category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    /// The category label.
    pub category: String,
    /// The number of transactions with the label.
    pub count: u64,
    /// The signed sum of the transactions with the label.
    #[serde(with = "float_format")]
    pub total_amount: Amount,
}

/// Sum the income and expenses of the user `user_id` in a single pass.
///
/// A user without transactions gets a summary of zeros.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_summary(user_id: UserID, connection: &Connection) -> Result<TransactionSummary, Error> {
    let (total_income, total_expenses, transaction_count) = connection.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN amount > 0 THEN amount ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN amount < 0 THEN -amount ELSE 0 END), 0),
            COUNT(*)
         FROM \"transaction\"
         WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| {
            Ok((
                row.get::<_, Amount>(0)?,
                row.get::<_, Amount>(1)?,
                get_count(row, 2)?,
            ))
        },
    )?;

    Ok(TransactionSummary {
        total_income,
        total_expenses,
        net_balance: total_income - total_expenses,
        transaction_count,
    })
}

/// Group the transactions of the user `user_id` by category label.
///
/// Groups are ordered by the number of transactions, most first, and then by label.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_category_breakdown(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryBreakdown>, Error> {
    connection
        .prepare(
            "SELECT category, COUNT(*) AS count, SUM(amount)
             FROM \"transaction\"
             WHERE user_id = ?1
             GROUP BY category
             ORDER BY count DESC, category ASC",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok(CategoryBreakdown {
                category: row.get(0)?,
                count: get_count(row, 1)?,
                total_amount: row.get(2)?,
            })
        })?
        .map(|breakdown_result| breakdown_result.map_err(Error::SqlError))
        .collect()
}
