//! Exporting a user's transactions as CSV.

use rusqlite::Connection;
use serde::Serialize;
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error,
    database_id::TransactionId,
    date::{date_format, format_date},
    money::Amount,
    transaction::TransactionType,
    user::UserID,
};

const CSV_HEADER: &str = "ID,Description,Category,Amount,Date,Type,Created At\n";

/// One exported transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// What the transaction was for.
    pub description: String,
    /// The category label.
    pub category: String,
    /// The signed amount.
    pub amount: Amount,
    /// When the transaction happened.
    #[serde(with = "date_format")]
    pub date: Date,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Get every transaction of the user `user_id` in export order: newest date
/// first, then newest creation time, then highest ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_export_rows(user_id: UserID, connection: &Connection) -> Result<Vec<ExportRow>, Error> {
    connection
        .prepare(
            "SELECT id, description, category, amount, date, type, created_at
             FROM \"transaction\"
             WHERE user_id = ?1
             ORDER BY date DESC, created_at DESC, id DESC",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok(ExportRow {
                id: row.get(0)?,
                description: row.get(1)?,
                category: row.get(2)?,
                amount: row.get(3)?,
                date: row.get(4)?,
                transaction_type: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .map(|row_result| row_result.map_err(Error::SqlError))
        .collect()
}

/// Write `rows` as CSV text with a header line.
///
/// Every field of a row is quoted, and quotes inside fields are doubled. The
/// header line is not quoted.
///
/// # Errors
/// Returns [Error::CsvError] if the CSV could not be written.
pub fn write_csv(rows: &[ExportRow]) -> Result<String, Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(CSV_HEADER.as_bytes().to_vec());

    for row in rows {
        let created_at = row
            .created_at
            .format(&Rfc3339)
            .map_err(|error| Error::CsvError(error.to_string()))?;

        writer
            .write_record([
                row.id.to_string(),
                row.description.clone(),
                row.category.clone(),
                row.amount.to_string(),
                format_date(row.date),
                row.transaction_type.to_string(),
                created_at,
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}

/// The download file name for an export made on `today`.
pub fn export_file_name(today: Date) -> String {
    format!("transactions-{}.csv", format_date(today))
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use crate::{
        money::Amount,
        test_utils::{create_other_user, create_test_user, get_test_connection},
        transaction::{NewTransaction, TransactionType, create_transaction},
    };

    use super::{ExportRow, export_file_name, get_export_rows, write_csv};

    #[test]
    fn csv_has_header_and_quoted_fields() {
        let rows = [ExportRow {
            id: 3,
            description: "Dinner \"Chez Nous\", Paris".to_owned(),
            category: "Food & Dining".to_owned(),
            amount: Amount::from_cents(-4_250),
            date: date!(2024 - 12 - 11),
            transaction_type: TransactionType::Expense,
            created_at: datetime!(2024-12-11 18:30:00 UTC),
        }];

        let csv = write_csv(&rows).unwrap();

        assert_eq!(
            csv,
            "ID,Description,Category,Amount,Date,Type,Created At\n\
             \"3\",\"Dinner \"\"Chez Nous\"\", Paris\",\"Food & Dining\",\"-42.50\",\"2024-12-11\",\"expense\",\"2024-12-11T18:30:00Z\"\n"
        );
    }

    #[test]
    fn empty_export_is_just_the_header() {
        let csv = write_csv(&[]).unwrap();

        assert_eq!(csv, "ID,Description,Category,Amount,Date,Type,Created At\n");
    }

    #[test]
    fn rows_are_newest_first_and_scoped_to_user() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let other = create_other_user(&conn, "other@example.com");
        for (user_id, description, date) in [
            (user.id, "old", date!(2024 - 01 - 01)),
            (user.id, "new", date!(2024 - 06 - 01)),
            (other.id, "theirs", date!(2024 - 03 - 01)),
        ] {
            create_transaction(
                user_id,
                NewTransaction {
                    description: description.to_owned(),
                    category: "Misc".to_owned(),
                    amount: Amount::from_cents(100),
                    date,
                    transaction_type: TransactionType::Income,
                },
                &conn,
            )
            .unwrap();
        }

        let rows = get_export_rows(user.id, &conn).unwrap();

        let descriptions: Vec<_> = rows.iter().map(|row| row.description.as_str()).collect();
        assert_eq!(descriptions, ["new", "old"]);
    }

    #[test]
    fn file_name_uses_date() {
        assert_eq!(
            export_file_name(date!(2025 - 02 - 03)),
            "transactions-2025-02-03.csv"
        );
    }
}
