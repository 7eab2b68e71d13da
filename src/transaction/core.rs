//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::TransactionId,
    date::date_format,
    money::Amount,
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned. Stored with a positive amount.
    Income,
    /// Money spent. Stored with a negative amount.
    Expense,
}

impl TransactionType {
    /// The lower case name used in JSON, SQL and CSV.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Parse "income" or "expense".
    ///
    /// # Errors
    /// Returns [Error::InvalidField] naming `field` for any other value.
    pub fn parse(field: &'static str, text: &str) -> Result<Self, Error> {
        match text.trim() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidField {
                field,
                reason: format!("'{other}' is not one of income or expense"),
            }),
        }
    }

    /// Give `amount` the sign for this type: positive for income and negative for expenses.
    ///
    /// The sign of `amount` itself is ignored.
    pub fn signed(self, amount: Amount) -> Amount {
        match self {
            TransactionType::Income => amount.abs(),
            TransactionType::Expense => -amount.abs(),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The label of the category the transaction belongs to.
    pub category: String,
    /// The signed amount: positive for income and negative for expenses.
    pub amount: Amount,
    /// When the transaction happened.
    #[serde(with = "date_format")]
    pub date: Date,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated fields of a transaction that is about to be created or updated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category label.
    pub category: String,
    /// The amount. Only the magnitude is used, the sign comes from `transaction_type`.
    pub amount: Amount,
    /// When the transaction happened.
    pub date: Date,
    /// Whether money was earned or spent.
    pub transaction_type: TransactionType,
}

impl NewTransaction {
    /// The amount as it will be stored.
    pub fn signed_amount(&self) -> Amount {
        self.transaction_type.signed(self.amount)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, description, category, amount, date, type, user_id, created_at, updated_at";

/// Create a new transaction owned by `user_id`.
///
/// The stored amount is negative for expenses and positive for income.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let amount = new_transaction.signed_amount();
    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\"
             (description, category, amount, date, type, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                new_transaction.description,
                new_transaction.category,
                amount,
                new_transaction.date,
                new_transaction.transaction_type,
                user_id.as_i64(),
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_transaction_row)
        .map_err(Error::from)
}

/// Replace the fields of the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    update: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let amount = update.signed_amount();

    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET description = ?1, category = ?2, amount = ?3, date = ?4, type = ?5, updated_at = ?6
             WHERE id = ?7 AND user_id = ?8
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                update.description,
                update.category,
                amount,
                update.date,
                update.transaction_type,
                OffsetDateTime::now_utc(),
                id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                amount INTEGER NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CHECK ((type = 'income' AND amount > 0) OR (type = 'expense' AND amount < 0)),
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    // Matches the list ordering so paging does not need a sort.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date
         ON \"transaction\"(user_id, date DESC, created_at DESC, id DESC);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order of `TRANSACTION_COLUMNS`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        transaction_type: row.get(5)?,
        user_id: UserID::new(row.get(6)?),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        money::Amount,
        test_utils::{create_other_user, create_test_user, get_test_connection},
        transaction::{
            NewTransaction, TransactionType, create_transaction, delete_transaction,
            update_transaction,
        },
    };

    use super::get_transaction;

    fn coffee() -> NewTransaction {
        NewTransaction {
            description: "Coffee".to_owned(),
            category: "Food".to_owned(),
            amount: Amount::from_cents(450),
            date: date!(2025 - 01 - 02),
            transaction_type: TransactionType::Expense,
        }
    }

    #[test]
    fn expenses_are_stored_negative() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);

        let transaction = create_transaction(user.id, coffee(), &conn).unwrap();

        assert_eq!(transaction.amount, Amount::from_cents(-450));
        assert_eq!(transaction.user_id, user.id);
        assert_eq!(transaction.created_at, transaction.updated_at);
        assert_eq!(get_transaction(user.id, transaction.id, &conn), Ok(transaction));
    }

    #[test]
    fn income_is_stored_positive_even_if_sent_negative() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let salary = NewTransaction {
            description: "Salary".to_owned(),
            category: "Work".to_owned(),
            amount: Amount::from_cents(-100_000),
            date: date!(2025 - 01 - 01),
            transaction_type: TransactionType::Income,
        };

        let transaction = create_transaction(user.id, salary, &conn).unwrap();

        assert_eq!(transaction.amount, Amount::from_cents(100_000));
    }

    #[test]
    fn update_recomputes_sign_and_keeps_identity() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let created = create_transaction(user.id, coffee(), &conn).unwrap();

        let updated = update_transaction(
            user.id,
            created.id,
            NewTransaction {
                description: "Refund".to_owned(),
                transaction_type: TransactionType::Income,
                ..coffee()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.user_id, created.user_id);
        assert_eq!(updated.description, "Refund");
        assert_eq!(updated.amount, Amount::from_cents(450));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn update_of_other_users_transaction_is_not_found() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn);
        let other = create_other_user(&conn, "other@example.com");
        let created = create_transaction(owner.id, coffee(), &conn).unwrap();

        let result = update_transaction(
            other.id,
            created.id,
            NewTransaction {
                description: "Hijacked".to_owned(),
                ..coffee()
            },
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
        assert_eq!(get_transaction(owner.id, created.id, &conn), Ok(created));
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let created = create_transaction(user.id, coffee(), &conn).unwrap();

        delete_transaction(user.id, created.id, &conn).unwrap();

        assert_eq!(
            get_transaction(user.id, created.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_of_other_users_transaction_is_not_found() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn);
        let other = create_other_user(&conn, "other@example.com");
        let created = create_transaction(owner.id, coffee(), &conn).unwrap();

        let result = delete_transaction(other.id, created.id, &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(get_transaction(owner.id, created.id, &conn), Ok(created));
    }

    #[test]
    fn get_hides_other_users_transactions() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn);
        let other = create_other_user(&conn, "other@example.com");
        let created = create_transaction(owner.id, coffee(), &conn).unwrap();

        assert_eq!(
            get_transaction(other.id, created.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn signed_ignores_input_sign() {
        let amount = Amount::from_cents(-123);

        assert_eq!(
            TransactionType::Income.signed(amount),
            Amount::from_cents(123)
        );
        assert_eq!(
            TransactionType::Expense.signed(Amount::from_cents(123)),
            Amount::from_cents(-123)
        );
    }
}
