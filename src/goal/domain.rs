//! Core savings goal domain types and the validation of client input.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{DatabaseId, GoalId},
    date::{date_format, parse_date},
    field::{check_length, optional_text, parse_color, required_text, updated_text},
    money::Amount,
    user::UserID,
};

/// The longest goal name, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// The longest category label a goal may have, in characters.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// The longest icon token, in characters.
pub const MAX_ICON_LENGTH: usize = 50;

/// The category of a goal created without one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// The icon of a goal created without one.
pub const DEFAULT_ICON: &str = "target";

/// The color of a goal created without one.
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// Something the user is saving towards, e.g. an emergency fund or a holiday.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// What the user is saving for.
    pub name: String,
    /// How much the user wants to save.
    pub target_amount: Amount,
    /// The sum of the contributions so far.
    pub current_amount: Amount,
    /// When the user wants to reach the target.
    #[serde(with = "date_format")]
    pub deadline: Date,
    /// A free-form label for grouping goals.
    pub category: String,
    /// The name of the icon for displaying the goal.
    pub icon: String,
    /// A CSS hex color for displaying the goal.
    pub color: String,
    /// How much the user plans to put aside each month.
    pub monthly_target: Amount,
    /// The user that owns the goal.
    pub user_id: UserID,
    /// When the goal was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the goal was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Goal {
    /// How much of the target has been saved, as a percentage capped at 100.
    pub fn percent_complete(&self) -> f64 {
        if self.target_amount == Amount::ZERO || self.current_amount.is_negative() {
            return 0.0;
        }

        let percent =
            self.current_amount.cents() as f64 * 100.0 / self.target_amount.cents() as f64;

        percent.min(100.0)
    }

    /// Whether the contributions have reached the target.
    pub fn is_complete(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}

/// Money put towards, or taken out of, a savings goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalContribution {
    /// The ID of the contribution.
    pub id: DatabaseId,
    /// The goal the contribution belongs to.
    pub goal_id: GoalId,
    /// The amount saved. Negative for withdrawals.
    pub amount: Amount,
    /// When the money was saved.
    #[serde(with = "date_format")]
    pub date: Date,
    /// When the contribution was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The validated fields of a new goal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    /// What the user is saving for.
    pub name: String,
    /// How much the user wants to save.
    pub target_amount: Amount,
    /// When the user wants to reach the target.
    pub deadline: Date,
    /// A free-form label.
    pub category: String,
    /// The name of an icon.
    pub icon: String,
    /// A CSS hex color.
    pub color: String,
    /// How much the user plans to put aside each month.
    pub monthly_target: Amount,
}

/// The validated changes of a partial goal update. `None` keeps the stored value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GoalUpdate {
    /// The new name.
    pub name: Option<String>,
    /// The new target.
    pub target_amount: Option<Amount>,
    /// The new deadline.
    pub deadline: Option<Date>,
    /// The new category label.
    pub category: Option<String>,
    /// The new icon.
    pub icon: Option<String>,
    /// The new color.
    pub color: Option<String>,
    /// The new monthly target.
    pub monthly_target: Option<Amount>,
}

/// The raw fields of a create or update request.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalInput {
    /// What the user is saving for.
    pub name: Option<String>,
    /// How much the user wants to save.
    pub target_amount: Option<Decimal>,
    /// When the user wants to reach the target.
    pub deadline: Option<String>,
    /// A free-form label, defaults to "Other".
    pub category: Option<String>,
    /// The name of an icon, defaults to "target".
    pub icon: Option<String>,
    /// A CSS hex color, defaults to blue.
    pub color: Option<String>,
    /// How much the user plans to put aside each month, defaults to zero.
    pub monthly_target: Option<Decimal>,
}

impl GoalInput {
    /// Check the fields of a new goal, filling in the defaults.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::MissingFields] if the name, target amount or deadline is absent,
    /// - [Error::InvalidField] if a field is malformed, the target is not positive or
    ///   the monthly target is negative.
    pub fn validate(self) -> Result<NewGoal, Error> {
        let name = required_text(self.name)?;
        let deadline = required_text(self.deadline)?;
        let target_amount = self.target_amount.ok_or(Error::MissingFields)?;
        let category = optional_text(self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());
        let icon = optional_text(self.icon).unwrap_or_else(|| DEFAULT_ICON.to_owned());
        let color = match optional_text(self.color) {
            Some(color) => parse_color("color", &color)?,
            None => DEFAULT_COLOR.to_owned(),
        };
        let monthly_target = match self.monthly_target {
            Some(amount) => Amount::parse_non_negative("monthlyTarget", amount)?,
            None => Amount::ZERO,
        };

        check_length("name", &name, MAX_NAME_LENGTH)?;
        check_length("category", &category, MAX_CATEGORY_LENGTH)?;
        check_length("icon", &icon, MAX_ICON_LENGTH)?;

        Ok(NewGoal {
            name,
            target_amount: Amount::parse_positive("targetAmount", target_amount)?,
            deadline: parse_date("deadline", &deadline)?,
            category,
            icon,
            color,
            monthly_target,
        })
    }

    /// Check the fields of a partial update.
    ///
    /// # Errors
    /// Returns [Error::InvalidField] if a given field is blank or malformed.
    pub fn validate_update(self) -> Result<GoalUpdate, Error> {
        let target_amount = match self.target_amount {
            Some(amount) => Some(Amount::parse_positive("targetAmount", amount)?),
            None => None,
        };
        let deadline = match self.deadline {
            Some(deadline) => Some(parse_date("deadline", &deadline)?),
            None => None,
        };
        let color = match self.color {
            Some(color) => Some(parse_color("color", &color)?),
            None => None,
        };
        let monthly_target = match self.monthly_target {
            Some(amount) => Some(Amount::parse_non_negative("monthlyTarget", amount)?),
            None => None,
        };

        Ok(GoalUpdate {
            name: updated_text("name", self.name, MAX_NAME_LENGTH)?,
            target_amount,
            deadline,
            category: updated_text("category", self.category, MAX_CATEGORY_LENGTH)?,
            icon: updated_text("icon", self.icon, MAX_ICON_LENGTH)?,
            color,
            monthly_target,
        })
    }
}

/// The raw fields of a contribution request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ContributionInput {
    /// The amount saved. Negative for withdrawals.
    pub amount: Option<Decimal>,
    /// When the money was saved, defaults to today.
    pub date: Option<String>,
}

/// The validated fields of a new contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContribution {
    /// The amount saved. Negative for withdrawals.
    pub amount: Amount,
    /// When the money was saved.
    pub date: Date,
}

impl ContributionInput {
    /// Check the fields of a contribution, dating it `today` if no date is given.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::MissingFields] if the amount is absent,
    /// - [Error::InvalidField] if the amount is zero or the date is malformed.
    pub fn validate(self, today: Date) -> Result<NewContribution, Error> {
        let amount = self.amount.ok_or(Error::MissingFields)?;
        let date = match optional_text(self.date) {
            Some(date) => parse_date("date", &date)?,
            None => today,
        };

        Ok(NewContribution {
            amount: Amount::parse("amount", amount)?,
            date,
        })
    }
}
