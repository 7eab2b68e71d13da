//! Searching, filtering and paging through a user's transactions.

use rusqlite::{Connection, named_params};
use serde::Deserialize;

use crate::{
    Error,
    db::get_count,
    transaction::{Transaction, TransactionType, core::map_transaction_row},
    user::UserID,
};

/// The number of transactions returned when the client does not ask for a limit.
pub const DEFAULT_LIMIT: u32 = 50;

/// The largest page of transactions a client may ask for.
pub const MAX_LIMIT: u32 = 100;

/// The category filter value that matches every category.
const ALL_CATEGORIES: &str = "All";

/// The type filter value that matches both income and expenses.
const ALL_TYPES: &str = "all";

/// The raw query string of a list request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionQuery {
    /// Text to look for in the description.
    pub search: Option<String>,
    /// Only include transactions with this category label. "All" matches every category.
    pub category: Option<String>,
    /// One of "income", "expense" or "all".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// The maximum number of transactions to return.
    pub limit: Option<i64>,
    /// The number of transactions to skip.
    pub offset: Option<i64>,
}

/// A validated [TransactionQuery].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions whose description contains this text, ignoring case.
    pub search: Option<String>,
    /// Only include transactions with this category label.
    pub category: Option<String>,
    /// Only include transactions of this type.
    pub transaction_type: Option<TransactionType>,
    /// The maximum number of transactions to return, between 1 and [MAX_LIMIT].
    pub limit: u32,
    /// The number of transactions to skip.
    pub offset: u32,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            transaction_type: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

impl TryFrom<TransactionQuery> for TransactionFilter {
    type Error = Error;

    fn try_from(query: TransactionQuery) -> Result<Self, Self::Error> {
        let limit = match query.limit {
            None => DEFAULT_LIMIT,
            Some(limit) => u32::try_from(limit)
                .ok()
                .filter(|limit| (1..=MAX_LIMIT).contains(limit))
                .ok_or_else(|| Error::InvalidField {
                    field: "limit",
                    reason: format!("must be between 1 and {MAX_LIMIT}"),
                })?,
        };

        let offset = match query.offset {
            None => 0,
            Some(offset) => u32::try_from(offset).map_err(|_| Error::InvalidField {
                field: "offset",
                reason: "must not be negative".to_owned(),
            })?,
        };

        let transaction_type = match non_empty(query.transaction_type) {
            None => None,
            Some(text) if text == ALL_TYPES => None,
            Some(text) => Some(TransactionType::parse("type", &text)?),
        };

        Ok(Self {
            search: non_empty(query.search),
            category: non_empty(query.category).filter(|category| category != ALL_CATEGORIES),
            transaction_type,
            limit,
            offset,
        })
    }
}

/// Escape the LIKE wildcards in `text` so that it matches literally.
///
/// The escaped text must be used with `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

/// Lower case and escape the search text to compare with `unicode_lower(description)`.
fn search_pattern(search: &str) -> String {
    escape_like(&search.to_lowercase())
}

// `unicode_lower` is registered by `db::initialize`.
const FILTER_CLAUSE: &str = "user_id = :user_id
    AND (:search IS NULL OR unicode_lower(description) LIKE '%' || :search || '%' ESCAPE '\\')
    AND (:category IS NULL OR category = :category)
    AND (:type IS NULL OR type = :type)";

/// Get a page of the transactions owned by `user_id` that match `filter`.
///
/// Transactions are ordered by date, then creation time, then ID, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let search = filter.search.as_deref().map(search_pattern);

    connection
        .prepare(&format!(
            "SELECT id, description, category, amount, date, type, user_id, created_at, updated_at
             FROM \"transaction\"
             WHERE {FILTER_CLAUSE}
             ORDER BY date DESC, created_at DESC, id DESC
             LIMIT :limit OFFSET :offset"
        ))?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":search": search,
                ":category": filter.category,
                ":type": filter.transaction_type,
                ":limit": filter.limit,
                ":offset": filter.offset,
            },
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Count the transactions owned by `user_id` that match `filter`, ignoring the
/// limit and offset.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn count_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let search = filter.search.as_deref().map(search_pattern);

    connection
        .query_row(
            &format!("SELECT COUNT(*) FROM \"transaction\" WHERE {FILTER_CLAUSE}"),
            named_params! {
                ":user_id": user_id.as_i64(),
                ":search": search,
                ":category": filter.category,
                ":type": filter.transaction_type,
            },
            |row| get_count(row, 0),
        )
        .map_err(Error::SqlError)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        Error,
        money::Amount,
        test_utils::{create_other_user, create_test_user, get_test_connection},
        transaction::{NewTransaction, TransactionType, create_transaction},
        user::UserID,
    };

    use super::{
        TransactionFilter, TransactionQuery, count_transactions, escape_like, list_transactions,
    };

    fn insert(
        user_id: UserID,
        description: &str,
        category: &str,
        cents: i64,
        date: Date,
        transaction_type: TransactionType,
        conn: &Connection,
    ) -> i64 {
        create_transaction(
            user_id,
            NewTransaction {
                description: description.to_owned(),
                category: category.to_owned(),
                amount: Amount::from_cents(cents),
                date,
                transaction_type,
            },
            conn,
        )
        .unwrap()
        .id
    }

    fn descriptions(user_id: UserID, filter: &TransactionFilter, conn: &Connection) -> Vec<String> {
        list_transactions(user_id, filter, conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.description)
            .collect()
    }

    fn query(
        search: Option<&str>,
        category: Option<&str>,
        transaction_type: Option<&str>,
    ) -> TransactionFilter {
        TransactionQuery {
            search: search.map(str::to_owned),
            category: category.map(str::to_owned),
            transaction_type: transaction_type.map(str::to_owned),
            ..Default::default()
        }
        .try_into()
        .unwrap()
    }

    #[test]
    fn query_defaults() {
        let filter = TransactionFilter::try_from(TransactionQuery::default()).unwrap();

        assert_eq!(filter, TransactionFilter::default());
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
    }

    #[test]
    fn all_means_no_filter() {
        assert_eq!(query(None, Some("All"), Some("all")), TransactionFilter::default());
    }

    #[test]
    fn query_rejects_out_of_range_paging_and_unknown_type() {
        for (limit, offset) in [(Some(0), None), (Some(101), None), (None, Some(-1))] {
            let result = TransactionFilter::try_from(TransactionQuery {
                limit,
                offset,
                ..Default::default()
            });

            assert!(
                matches!(result, Err(Error::InvalidField { .. })),
                "limit {limit:?} offset {offset:?} gave {result:?}"
            );
        }

        let result = TransactionFilter::try_from(TransactionQuery {
            transaction_type: Some("transfer".to_owned()),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::InvalidField { field: "type", .. })));
    }

    #[test]
    fn list_orders_newest_first_and_breaks_ties_by_creation() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let day = date!(2025 - 03 - 01);
        insert(user.id, "older", "Food", 100, day.previous_day().unwrap(), TransactionType::Expense, &conn);
        insert(user.id, "first", "Food", 100, day, TransactionType::Expense, &conn);
        insert(user.id, "second", "Food", 100, day, TransactionType::Expense, &conn);

        let got = descriptions(user.id, &TransactionFilter::default(), &conn);

        assert_eq!(got, ["second", "first", "older"]);
    }

    #[test]
    fn pages_are_disjoint_and_contiguous() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let start = date!(2025 - 01 - 01);
        for i in 0..7 {
            insert(
                user.id,
                &format!("t{i}"),
                "Food",
                100 + i,
                start + time::Duration::days(i % 3),
                TransactionType::Expense,
                &conn,
            );
        }
        let everything = list_transactions(user.id, &TransactionFilter::default(), &conn).unwrap();

        let page = |offset| TransactionFilter {
            limit: 3,
            offset,
            ..Default::default()
        };
        let first = list_transactions(user.id, &page(0), &conn).unwrap();
        let second = list_transactions(user.id, &page(3), &conn).unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 3);
        assert_eq!(first, everything[0..3]);
        assert_eq!(second, everything[3..6]);
    }

    #[test]
    fn search_is_case_insensitive_and_combines_with_filters() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let day = date!(2025 - 01 - 01);
        insert(user.id, "Morning COFFEE", "Food", 450, day, TransactionType::Expense, &conn);
        insert(user.id, "coffee beans", "Groceries", 1200, day, TransactionType::Expense, &conn);
        insert(user.id, "Coffee refund", "Food", 450, day, TransactionType::Income, &conn);
        insert(user.id, "Tea", "Food", 300, day, TransactionType::Expense, &conn);

        let mut all = descriptions(user.id, &query(Some("coffee"), None, None), &conn);
        all.sort();
        assert_eq!(all, ["Coffee refund", "Morning COFFEE", "coffee beans"]);

        assert_eq!(
            descriptions(user.id, &query(Some("coffee"), Some("Food"), Some("expense")), &conn),
            ["Morning COFFEE"]
        );
        assert_eq!(
            count_transactions(user.id, &query(Some("coffee"), Some("Food"), None), &conn),
            Ok(2)
        );
    }

    #[test]
    fn search_folds_case_of_non_ascii_letters() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let day = date!(2025 - 01 - 01);
        insert(user.id, "Café latte", "Food", 520, day, TransactionType::Expense, &conn);
        insert(user.id, "ÖLÇEK rental", "Tools", 900, day, TransactionType::Expense, &conn);
        insert(user.id, "Cafe au lait", "Food", 480, day, TransactionType::Expense, &conn);

        assert_eq!(descriptions(user.id, &query(Some("CAFÉ"), None, None), &conn), ["Café latte"]);
        assert_eq!(
            descriptions(user.id, &query(Some("ölçek"), None, None), &conn),
            ["ÖLÇEK rental"]
        );
        assert_eq!(count_transactions(user.id, &query(Some("café"), None, None), &conn), Ok(1));
    }

    #[test]
    fn search_wildcards_match_literally() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let day = date!(2025 - 01 - 01);
        insert(user.id, "100% juice", "Food", 100, day, TransactionType::Expense, &conn);
        insert(user.id, "1000 mints", "Food", 100, day, TransactionType::Expense, &conn);
        insert(user.id, "snake_case", "Food", 100, day, TransactionType::Expense, &conn);
        insert(user.id, "snakeXcase", "Food", 100, day, TransactionType::Expense, &conn);

        assert_eq!(descriptions(user.id, &query(Some("0%"), None, None), &conn), ["100% juice"]);
        assert_eq!(descriptions(user.id, &query(Some("e_c"), None, None), &conn), ["snake_case"]);
    }

    #[test]
    fn list_only_returns_own_transactions() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let other = create_other_user(&conn, "other@example.com");
        let day = date!(2025 - 01 - 01);
        insert(user.id, "mine", "Food", 100, day, TransactionType::Expense, &conn);
        insert(other.id, "theirs", "Food", 100, day, TransactionType::Expense, &conn);

        assert_eq!(descriptions(user.id, &TransactionFilter::default(), &conn), ["mine"]);
        assert_eq!(count_transactions(other.id, &TransactionFilter::default(), &conn), Ok(1));
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like(r"a%b_c\d"), r"a\%b\_c\\d");
    }
}
