//! Database operations for savings goals and their contributions.

use rusqlite::{Connection, OptionalExtension, Row, named_params};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::GoalId,
    goal::{Goal, GoalContribution, GoalUpdate, NewContribution, NewGoal},
    user::UserID,
};

const SELECT_GOALS: &str = "SELECT
        g.id, g.name, g.target_amount, g.deadline, g.category, g.icon, g.color,
        g.monthly_target, g.user_id, g.created_at, g.updated_at,
        COALESCE((SELECT SUM(c.amount) FROM goal_contribution c WHERE c.goal_id = g.id), 0)
    FROM savings_goal g
    WHERE g.user_id = :user_id AND (:goal_id IS NULL OR g.id = :goal_id)
    ORDER BY g.deadline ASC, g.id ASC";

fn select_goals(
    user_id: UserID,
    goal_id: Option<GoalId>,
    connection: &Connection,
) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(SELECT_GOALS)?
        .query_map(
            named_params! { ":user_id": user_id.as_i64(), ":goal_id": goal_id },
            map_goal_row,
        )?
        .map(|maybe_goal| maybe_goal.map_err(Error::from))
        .collect()
}

/// Retrieve the savings goals of the user `user_id`, nearest deadline first,
/// with the amount saved towards each.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_goals(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    select_goals(user_id, None, connection)
}

/// Retrieve the savings goal `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a goal owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_goal(user_id: UserID, id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    select_goals(user_id, Some(id), connection)?
        .pop()
        .ok_or(Error::NotFound)
}

/// Create a savings goal owned by `user_id` and return it as stored.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_goal(user_id: UserID, new_goal: NewGoal, connection: &Connection) -> Result<Goal, Error> {
    connection.execute(
        "INSERT INTO savings_goal
         (name, target_amount, deadline, category, icon, color, monthly_target,
          user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        (
            new_goal.name,
            new_goal.target_amount,
            new_goal.deadline,
            new_goal.category,
            new_goal.icon,
            new_goal.color,
            new_goal.monthly_target,
            user_id.as_i64(),
            OffsetDateTime::now_utc(),
        ),
    )?;

    get_goal(user_id, connection.last_insert_rowid(), connection)
}

/// Apply `update` to the savings goal `id` owned by `user_id` and return it as stored.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingGoal] if `id` does not refer to a goal owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_goal(
    user_id: UserID,
    id: GoalId,
    update: GoalUpdate,
    connection: &Connection,
) -> Result<Goal, Error> {
    let rows_affected = connection.execute(
        "UPDATE savings_goal SET
            name = COALESCE(:name, name),
            target_amount = COALESCE(:target_amount, target_amount),
            deadline = COALESCE(:deadline, deadline),
            category = COALESCE(:category, category),
            icon = COALESCE(:icon, icon),
            color = COALESCE(:color, color),
            monthly_target = COALESCE(:monthly_target, monthly_target),
            updated_at = :updated_at
         WHERE id = :id AND user_id = :user_id",
        named_params! {
            ":name": update.name,
            ":target_amount": update.target_amount,
            ":deadline": update.deadline,
            ":category": update.category,
            ":icon": update.icon,
            ":color": update.color,
            ":monthly_target": update.monthly_target,
            ":updated_at": OffsetDateTime::now_utc(),
            ":id": id,
            ":user_id": user_id.as_i64(),
        },
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    get_goal(user_id, id, connection)
}

/// Delete the savings goal `id` owned by `user_id` along with its contributions.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingGoal] if `id` does not refer to a goal owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_goal(user_id: UserID, id: GoalId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM savings_goal WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

/// Record a contribution to the savings goal `goal_id` owned by `user_id` and
/// return the goal with its new total.
///
/// # Errors
/// This function will return a:
/// - [Error::ContributeToMissingGoal] if `goal_id` does not refer to a goal owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_contribution(
    user_id: UserID,
    goal_id: GoalId,
    contribution: NewContribution,
    connection: &Connection,
) -> Result<(Goal, GoalContribution), Error> {
    let goal_exists = connection
        .query_row(
            "SELECT 1 FROM savings_goal WHERE id = ?1 AND user_id = ?2",
            (goal_id, user_id.as_i64()),
            |_| Ok(()),
        )
        .optional()?
        .is_some();

    if !goal_exists {
        return Err(Error::ContributeToMissingGoal);
    }

    let contribution = connection
        .prepare(
            "INSERT INTO goal_contribution (goal_id, amount, date, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, goal_id, amount, date, created_at",
        )?
        .query_row(
            (
                goal_id,
                contribution.amount,
                contribution.date,
                OffsetDateTime::now_utc(),
            ),
            map_contribution_row,
        )?;

    Ok((get_goal(user_id, goal_id, connection)?, contribution))
}

/// Initialize the savings goal and contribution tables.
///
/// # Errors
/// Returns an error if the tables cannot be created.
pub fn create_goal_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS savings_goal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            target_amount INTEGER NOT NULL CHECK (target_amount > 0),
            deadline TEXT NOT NULL,
            category TEXT NOT NULL,
            icon TEXT NOT NULL,
            color TEXT NOT NULL,
            monthly_target INTEGER NOT NULL DEFAULT 0 CHECK (monthly_target >= 0),
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_savings_goal_user_deadline
            ON savings_goal(user_id, deadline);

        CREATE TABLE IF NOT EXISTS goal_contribution (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            goal_id INTEGER NOT NULL,
            amount INTEGER NOT NULL CHECK (amount != 0),
            date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(goal_id) REFERENCES savings_goal(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_goal_contribution_goal ON goal_contribution(goal_id);",
    )
}

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        target_amount: row.get(2)?,
        deadline: row.get(3)?,
        category: row.get(4)?,
        icon: row.get(5)?,
        color: row.get(6)?,
        monthly_target: row.get(7)?,
        user_id: UserID::new(row.get(8)?),
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        current_amount: row.get(11)?,
    })
}

fn map_contribution_row(row: &Row) -> Result<GoalContribution, rusqlite::Error> {
    Ok(GoalContribution {
        id: row.get(0)?,
        goal_id: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        goal::{GoalUpdate, NewContribution, NewGoal},
        money::Amount,
        test_utils::{create_other_user, create_test_user, get_test_connection},
    };

    use super::{add_contribution, create_goal, delete_goal, get_goal, get_goals, update_goal};

    fn holiday() -> NewGoal {
        NewGoal {
            name: "Holiday".to_owned(),
            target_amount: Amount::from_cents(200_000),
            deadline: date!(2025 - 12 - 01),
            category: "Travel".to_owned(),
            icon: "plane".to_owned(),
            color: "#3b82f6".to_owned(),
            monthly_target: Amount::from_cents(20_000),
        }
    }

    fn contribution(cents: i64) -> NewContribution {
        NewContribution {
            amount: Amount::from_cents(cents),
            date: date!(2025 - 06 - 01),
        }
    }

    #[test]
    fn current_amount_is_sum_of_contributions() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let goal = create_goal(user.id, holiday(), &connection).unwrap();
        assert_eq!(goal.current_amount, Amount::ZERO);

        add_contribution(user.id, goal.id, contribution(50_000), &connection).unwrap();
        add_contribution(user.id, goal.id, contribution(25_000), &connection).unwrap();
        let (goal, withdrawal) =
            add_contribution(user.id, goal.id, contribution(-10_000), &connection).unwrap();

        assert_eq!(goal.current_amount, Amount::from_cents(65_000));
        assert_eq!(withdrawal.amount, Amount::from_cents(-10_000));
        assert_eq!(withdrawal.goal_id, goal.id);
        assert_eq!(goal.percent_complete(), 32.5);
        assert!(!goal.is_complete());
    }

    #[test]
    fn list_is_nearest_deadline_first() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let later = create_goal(user.id, holiday(), &connection).unwrap();
        let sooner = create_goal(
            user.id,
            NewGoal {
                deadline: date!(2025 - 07 - 01),
                ..holiday()
            },
            &connection,
        )
        .unwrap();

        let ids: Vec<_> = get_goals(user.id, &connection)
            .unwrap()
            .into_iter()
            .map(|goal| goal.id)
            .collect();

        assert_eq!(ids, [sooner.id, later.id]);
    }

    #[test]
    fn cannot_contribute_to_another_users_goal() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let other = create_other_user(&connection, "other@example.com");
        let goal = create_goal(user.id, holiday(), &connection).unwrap();

        let result = add_contribution(other.id, goal.id, contribution(100), &connection);

        assert_eq!(result, Err(Error::ContributeToMissingGoal));
        assert_eq!(
            get_goal(user.id, goal.id, &connection).unwrap().current_amount,
            Amount::ZERO
        );
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let goal = create_goal(user.id, holiday(), &connection).unwrap();

        let updated = update_goal(
            user.id,
            goal.id,
            GoalUpdate {
                name: Some("Big holiday".to_owned()),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.name, "Big holiday");
        assert_eq!(updated.target_amount, goal.target_amount);
        assert_eq!(updated.deadline, goal.deadline);
        assert_eq!(updated.monthly_target, goal.monthly_target);
    }

    #[test]
    fn other_users_cannot_change_goal() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let other = create_other_user(&connection, "other@example.com");
        let goal = create_goal(user.id, holiday(), &connection).unwrap();

        assert_eq!(
            update_goal(other.id, goal.id, GoalUpdate::default(), &connection),
            Err(Error::UpdateMissingGoal)
        );
        assert_eq!(
            delete_goal(other.id, goal.id, &connection),
            Err(Error::DeleteMissingGoal)
        );
    }

    #[test]
    fn delete_removes_contributions() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let goal = create_goal(user.id, holiday(), &connection).unwrap();
        add_contribution(user.id, goal.id, contribution(100), &connection).unwrap();

        delete_goal(user.id, goal.id, &connection).unwrap();

        let remaining: i64 = connection
            .query_row("SELECT COUNT(*) FROM goal_contribution", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
        assert_eq!(get_goal(user.id, goal.id, &connection), Err(Error::NotFound));
    }
}
