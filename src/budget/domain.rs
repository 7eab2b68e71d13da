//! Core budget domain types and the validation of client input.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::{
    Error,
    database_id::BudgetId,
    date::{add_months, date_format, parse_date},
    field::{check_length, parse_color, required_text, updated_text},
    money::Amount,
    user::UserID,
};

/// The longest category label a budget may have, in characters.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// How long a budget runs for when no end date is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Seven days.
    Weekly,
    /// One calendar month.
    Monthly,
    /// One calendar year.
    Yearly,
}

impl BudgetPeriod {
    /// The lower case name used in JSON and SQL.
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    /// Parse "weekly", "monthly" or "yearly".
    ///
    /// # Errors
    /// Returns [Error::InvalidField] naming `field` for any other value.
    pub fn parse(field: &'static str, text: &str) -> Result<Self, Error> {
        match text.trim() {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(Error::InvalidField {
                field,
                reason: format!("'{other}' is not one of weekly, monthly or yearly"),
            }),
        }
    }

    /// The last day of a period that starts on `start_date`.
    ///
    /// A monthly budget from 1 March ends on 31 March, a weekly one on 7 March.
    ///
    /// # Errors
    /// Returns [Error::InvalidField] if the end date is past the supported range of dates.
    pub fn end_date(self, start_date: Date) -> Result<Date, Error> {
        let next_start = match self {
            BudgetPeriod::Weekly => start_date.checked_add(Duration::weeks(1)),
            BudgetPeriod::Monthly => add_months(start_date, 1),
            BudgetPeriod::Yearly => add_months(start_date, 12),
        };

        next_start
            .and_then(|date| date.previous_day())
            .ok_or_else(|| Error::InvalidField {
                field: "startDate",
                reason: format!("{start_date} is too far in the future"),
            })
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        BudgetPeriod::parse("period", value.as_str()?).map_err(|_| FromSqlError::InvalidType)
    }
}

/// A spending limit for one category label over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The category label the budget limits.
    pub category: String,
    /// The most the user wants to spend in the date range.
    pub budget_amount: Amount,
    /// The sum of the magnitudes of the matching expenses in the date range.
    pub spent_amount: Amount,
    /// How long the budget runs for.
    pub period: BudgetPeriod,
    /// A CSS hex color for displaying the budget.
    pub color: String,
    /// The first day the budget covers.
    #[serde(with = "date_format")]
    pub start_date: Date,
    /// The last day the budget covers.
    #[serde(with = "date_format")]
    pub end_date: Date,
    /// The user that owns the budget.
    pub user_id: UserID,
    /// When the budget was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the budget was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Budget {
    /// The share of the budget that has been spent, as a percentage.
    ///
    /// May exceed 100 when the budget is overspent.
    pub fn percent_spent(&self) -> f64 {
        if self.budget_amount == Amount::ZERO {
            return 0.0;
        }

        self.spent_amount.cents() as f64 * 100.0 / self.budget_amount.cents() as f64
    }

    /// How much is left to spend. Negative when overspent.
    pub fn remaining(&self) -> Amount {
        self.budget_amount - self.spent_amount
    }
}

/// The validated fields of a new budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The category label the budget limits.
    pub category: String,
    /// The most the user wants to spend.
    pub budget_amount: Amount,
    /// How long the budget runs for.
    pub period: BudgetPeriod,
    /// A CSS hex color.
    pub color: String,
    /// The first day the budget covers.
    pub start_date: Date,
    /// The last day the budget covers.
    pub end_date: Date,
}

/// The validated changes of a partial budget update. `None` keeps the stored value.
///
/// The date range is checked against the stored dates when the update is applied.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BudgetUpdate {
    /// The new category label.
    pub category: Option<String>,
    /// The new limit.
    pub budget_amount: Option<Amount>,
    /// The new period.
    pub period: Option<BudgetPeriod>,
    /// The new color.
    pub color: Option<String>,
    /// The new first day.
    pub start_date: Option<Date>,
    /// The new last day.
    pub end_date: Option<Date>,
}

/// The raw fields of a create or update request.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    /// The category label the budget limits.
    pub category: Option<String>,
    /// The most the user wants to spend.
    pub budget_amount: Option<Decimal>,
    /// One of "weekly", "monthly" or "yearly".
    pub period: Option<String>,
    /// A CSS hex color.
    pub color: Option<String>,
    /// The first day, defaults to today.
    pub start_date: Option<String>,
    /// The last day, defaults to the end of the first period.
    pub end_date: Option<String>,
}

/// Check that a budget does not end before it starts.
///
/// # Errors
/// Returns [Error::InvalidField] for the end date if it is before `start_date`.
pub fn check_date_range(start_date: Date, end_date: Date) -> Result<(), Error> {
    if end_date < start_date {
        return Err(Error::InvalidField {
            field: "endDate",
            reason: "must not be before the start date".to_owned(),
        });
    }

    Ok(())
}

fn optional_date(field: &'static str, text: Option<String>) -> Result<Option<Date>, Error> {
    match text {
        Some(text) if !text.trim().is_empty() => parse_date(field, &text).map(Some),
        _ => Ok(None),
    }
}

impl BudgetInput {
    /// Check the fields of a new budget, filling in the default dates.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::MissingFields] if the category, amount, period or color is absent,
    /// - [Error::InvalidField] if a field is malformed, the amount is not positive
    ///   or the end date is before the start date.
    pub fn validate(self, today: Date) -> Result<NewBudget, Error> {
        let category = required_text(self.category)?;
        let period = required_text(self.period)?;
        let color = required_text(self.color)?;
        let budget_amount = self.budget_amount.ok_or(Error::MissingFields)?;

        check_length("category", &category, MAX_CATEGORY_LENGTH)?;
        let period = BudgetPeriod::parse("period", &period)?;
        let start_date = optional_date("startDate", self.start_date)?.unwrap_or(today);
        let end_date = match optional_date("endDate", self.end_date)? {
            Some(end_date) => end_date,
            None => period.end_date(start_date)?,
        };
        check_date_range(start_date, end_date)?;

        Ok(NewBudget {
            category,
            budget_amount: Amount::parse_positive("budgetAmount", budget_amount)?,
            period,
            color: parse_color("color", &color)?,
            start_date,
            end_date,
        })
    }

    /// Check the fields of a partial update.
    ///
    /// # Errors
    /// Returns [Error::InvalidField] if a given field is blank or malformed.
    pub fn validate_update(self) -> Result<BudgetUpdate, Error> {
        let budget_amount = match self.budget_amount {
            Some(amount) => Some(Amount::parse_positive("budgetAmount", amount)?),
            None => None,
        };
        let period = match self.period {
            Some(period) => Some(BudgetPeriod::parse("period", &period)?),
            None => None,
        };
        let color = match self.color {
            Some(color) => Some(parse_color("color", &color)?),
            None => None,
        };

        Ok(BudgetUpdate {
            category: updated_text("category", self.category, MAX_CATEGORY_LENGTH)?,
            budget_amount,
            period,
            color,
            start_date: optional_date("startDate", self.start_date)?,
            end_date: optional_date("endDate", self.end_date)?,
        })
    }
}
