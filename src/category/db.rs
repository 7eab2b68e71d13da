//! Database operations for categories.

use rusqlite::{Connection, Row, named_params};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    category::{Category, CategoryUpdate, NewCategory},
    database_id::CategoryId,
    db::get_count,
    date::{add_months, first_of_month},
    money::Amount,
    user::UserID,
};

// The rollups join transactions by label. A category without transactions
// still gets one row from the LEFT JOIN, with NULL transaction columns.
const SELECT_CATEGORIES: &str = "SELECT
        c.id, c.name, c.color, c.icon, c.description, c.user_id, c.created_at, c.updated_at,
        COALESCE(SUM(CASE WHEN t.type = 'expense' THEN -t.amount ELSE 0 END), 0),
        COUNT(t.id),
        COALESCE(SUM(CASE WHEN t.type = 'expense' THEN 1 ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN t.type = 'expense' AND t.date >= :this_month AND t.date < :next_month
            THEN -t.amount ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN t.type = 'expense' AND t.date >= :last_month AND t.date < :this_month
            THEN -t.amount ELSE 0 END), 0)
    FROM category c
    LEFT JOIN \"transaction\" t ON t.user_id = c.user_id AND t.category = c.name
    WHERE c.user_id = :user_id AND (:category_id IS NULL OR c.id = :category_id)
    GROUP BY c.id
    ORDER BY c.name ASC, c.id ASC";

/// The first days of last month, this month and next month, relative to `today`.
fn month_starts(today: Date) -> Result<(Date, Date, Date), Error> {
    let this_month = first_of_month(today);
    let out_of_range = || Error::InvalidField {
        field: "date",
        reason: format!("{today} is too close to the end of the calendar"),
    };
    let last_month = add_months(this_month, -1).ok_or_else(out_of_range)?;
    let next_month = add_months(this_month, 1).ok_or_else(out_of_range)?;

    Ok((last_month, this_month, next_month))
}

fn select_categories(
    user_id: UserID,
    category_id: Option<CategoryId>,
    today: Date,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let (last_month, this_month, next_month) = month_starts(today)?;

    connection
        .prepare(SELECT_CATEGORIES)?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":category_id": category_id,
                ":last_month": last_month,
                ":this_month": this_month,
                ":next_month": next_month,
            },
            map_category_row,
        )?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Retrieve the categories of the user `user_id` ordered by name, with their
/// spending figures as of `today`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_categories(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    select_categories(user_id, None, today, connection)
}

/// Retrieve the category `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a category owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category(
    user_id: UserID,
    id: CategoryId,
    today: Date,
    connection: &Connection,
) -> Result<Category, Error> {
    select_categories(user_id, Some(id), today, connection)?
        .pop()
        .ok_or(Error::NotFound)
}

/// Create a category owned by `user_id` and return it as stored.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_category(
    user_id: UserID,
    new_category: NewCategory,
    today: Date,
    connection: &Connection,
) -> Result<Category, Error> {
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO category (name, color, icon, description, user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        (
            new_category.name,
            new_category.color,
            new_category.icon,
            new_category.description,
            user_id.as_i64(),
            now,
        ),
    )?;

    get_category(user_id, connection.last_insert_rowid(), today, connection)
}

/// Apply `update` to the category `id` owned by `user_id` and return it as stored.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingCategory] if `id` does not refer to a category owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_category(
    user_id: UserID,
    id: CategoryId,
    update: CategoryUpdate,
    today: Date,
    connection: &Connection,
) -> Result<Category, Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET
            name = COALESCE(:name, name),
            color = COALESCE(:color, color),
            icon = COALESCE(:icon, icon),
            description = CASE WHEN :set_description THEN :description ELSE description END,
            updated_at = :updated_at
         WHERE id = :id AND user_id = :user_id",
        named_params! {
            ":name": update.name,
            ":color": update.color,
            ":icon": update.icon,
            ":set_description": update.description.is_some(),
            ":description": update.description.flatten(),
            ":updated_at": OffsetDateTime::now_utc(),
            ":id": id,
            ":user_id": user_id.as_i64(),
        },
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    get_category(user_id, id, today, connection)
}

/// Delete the category `id` owned by `user_id`.
///
/// Transactions that use the category's name keep their label.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if `id` does not refer to a category owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(
    user_id: UserID,
    id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
///
/// # Errors
/// Returns an error if the table cannot be created.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            icon TEXT NOT NULL,
            description TEXT,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_name ON category(user_id, name);",
    )
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let total_spent: i64 = row.get(8)?;
    let expense_count: i64 = row.get(10)?;
    let this_month: i64 = row.get(11)?;
    let last_month: i64 = row.get(12)?;

    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
        description: row.get(4)?,
        user_id: UserID::new(row.get(5)?),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        total_spent: Amount::from_cents(total_spent),
        transaction_count: get_count(row, 9)?,
        avg_transaction: average_cents(total_spent, expense_count),
        monthly_trend: monthly_trend(this_month, last_month),
    })
}

/// The mean of `count` expenses totalling `total_cents`, rounded to the nearest cent.
fn average_cents(total_cents: i64, count: i64) -> Amount {
    if count == 0 {
        return Amount::ZERO;
    }

    Amount::from_cents((total_cents + count / 2) / count)
}

/// The percentage change from `last_month` to `this_month`, rounded to two places.
fn monthly_trend(this_month: i64, last_month: i64) -> f64 {
    if last_month == 0 {
        return 0.0;
    }

    let percent = (this_month - last_month) as f64 / last_month as f64 * 100.0;

    (percent * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{
        Error,
        category::{CategoryUpdate, NewCategory},
        money::Amount,
        test_utils::{create_other_user, create_test_user, get_test_connection},
        transaction::{NewTransaction, TransactionType, create_transaction},
        user::UserID,
    };

    use super::{
        average_cents, create_category, delete_category, get_categories, get_category,
        monthly_trend, update_category,
    };

    const TODAY: Date = date!(2025 - 03 - 15);

    fn groceries() -> NewCategory {
        NewCategory {
            name: "Groceries".to_owned(),
            color: "#22c55e".to_owned(),
            icon: "cart".to_owned(),
            description: Some("Food for the week".to_owned()),
        }
    }

    fn spend(
        user_id: UserID,
        category: &str,
        cents: i64,
        date: Date,
        transaction_type: TransactionType,
        connection: &rusqlite::Connection,
    ) {
        create_transaction(
            user_id,
            NewTransaction {
                description: "test".to_owned(),
                category: category.to_owned(),
                amount: Amount::from_cents(cents),
                date,
                transaction_type,
            },
            connection,
        )
        .expect("Could not create transaction");
    }

    #[test]
    fn new_category_has_zero_rollups() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);

        let category = create_category(user.id, groceries(), TODAY, &connection).unwrap();

        assert!(category.id > 0);
        assert_eq!(category.name, "Groceries");
        assert_eq!(category.total_spent, Amount::ZERO);
        assert_eq!(category.transaction_count, 0);
        assert_eq!(category.avg_transaction, Amount::ZERO);
        assert_eq!(category.monthly_trend, 0.0);
        assert_eq!(category.created_at, category.updated_at);
    }

    #[test]
    fn rollups_follow_matching_transactions() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let category = create_category(user.id, groceries(), TODAY, &connection).unwrap();
        let expense = TransactionType::Expense;
        spend(user.id, "Groceries", 10_000, date!(2025 - 02 - 10), expense, &connection);
        spend(user.id, "Groceries", 10_000, date!(2025 - 03 - 01), expense, &connection);
        spend(user.id, "Groceries", 5_000, date!(2025 - 03 - 12), expense, &connection);
        spend(user.id, "Groceries", 2_000, date!(2025 - 03 - 02), TransactionType::Income, &connection);
        spend(user.id, "Rent", 99_999, date!(2025 - 03 - 02), expense, &connection);

        let category = get_category(user.id, category.id, TODAY, &connection).unwrap();

        assert_eq!(category.total_spent, Amount::from_cents(25_000));
        assert_eq!(category.transaction_count, 4);
        assert_eq!(category.avg_transaction, Amount::from_cents(8_333));
        assert_eq!(category.monthly_trend, 50.0);
    }

    #[test]
    fn rollups_ignore_other_users_transactions() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let other = create_other_user(&connection, "other@example.com");
        let category = create_category(user.id, groceries(), TODAY, &connection).unwrap();
        spend(other.id, "Groceries", 1_000, TODAY, TransactionType::Expense, &connection);

        let category = get_category(user.id, category.id, TODAY, &connection).unwrap();

        assert_eq!(category.transaction_count, 0);
    }

    #[test]
    fn list_is_ordered_by_name_and_scoped() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let other = create_other_user(&connection, "other@example.com");
        for name in ["Travel", "Bills", "Groceries"] {
            let category = NewCategory {
                name: name.to_owned(),
                ..groceries()
            };
            create_category(user.id, category, TODAY, &connection).unwrap();
        }
        create_category(other.id, groceries(), TODAY, &connection).unwrap();

        let names: Vec<_> = get_categories(user.id, TODAY, &connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name)
            .collect();

        assert_eq!(names, ["Bills", "Groceries", "Travel"]);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let category = create_category(user.id, groceries(), TODAY, &connection).unwrap();

        let updated = update_category(
            user.id,
            category.id,
            CategoryUpdate {
                color: Some("#000000".to_owned()),
                description: Some(None),
                ..Default::default()
            },
            TODAY,
            &connection,
        )
        .unwrap();

        assert_eq!(updated.name, "Groceries");
        assert_eq!(updated.icon, "cart");
        assert_eq!(updated.color, "#000000");
        assert_eq!(updated.description, None);
        assert!(updated.updated_at >= category.updated_at);
    }

    #[test]
    fn cannot_touch_another_users_category() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let other = create_other_user(&connection, "other@example.com");
        let category = create_category(user.id, groceries(), TODAY, &connection).unwrap();
        let rename = CategoryUpdate {
            name: Some("Mine now".to_owned()),
            ..Default::default()
        };

        assert_eq!(
            update_category(other.id, category.id, rename, TODAY, &connection),
            Err(Error::UpdateMissingCategory)
        );
        assert_eq!(
            delete_category(other.id, category.id, &connection),
            Err(Error::DeleteMissingCategory)
        );
        assert_eq!(
            get_category(user.id, category.id, TODAY, &connection).map(|c| c.name),
            Ok("Groceries".to_owned())
        );
    }

    #[test]
    fn delete_removes_category() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let category = create_category(user.id, groceries(), TODAY, &connection).unwrap();

        delete_category(user.id, category.id, &connection).unwrap();

        assert_eq!(
            get_category(user.id, category.id, TODAY, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn averages_round_to_nearest_cent() {
        assert_eq!(average_cents(0, 0), Amount::ZERO);
        assert_eq!(average_cents(1_000, 3), Amount::from_cents(333));
        assert_eq!(average_cents(2_000, 3), Amount::from_cents(667));
    }

    #[test]
    fn trend_is_rounded_percentage() {
        assert_eq!(monthly_trend(500, 0), 0.0);
        assert_eq!(monthly_trend(0, 500), -100.0);
        assert_eq!(monthly_trend(1_000, 300), 233.33);
    }
}
