//! Core category domain types and the validation of client input.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::CategoryId,
    field::{check_length, optional_text, parse_color, required_text, updated_text},
    money::Amount,
    user::UserID,
};

/// The longest category name, in characters.
///
/// Matches the longest category label a transaction may have.
pub const MAX_NAME_LENGTH: usize = 100;

/// The longest icon token, in characters.
pub const MAX_ICON_LENGTH: usize = 50;

/// The longest category description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// A user defined category for grouping transactions (e.g., 'Groceries', 'Salary').
///
/// Transactions refer to a category by its name. The spending figures are
/// computed from the matching transactions whenever the category is read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The label that transactions use to refer to this category.
    pub name: String,
    /// A CSS hex color for displaying the category.
    pub color: String,
    /// The name of the icon for displaying the category.
    pub icon: String,
    /// An optional note about what belongs in the category.
    pub description: Option<String>,
    /// The sum of the magnitudes of the category's expenses.
    pub total_spent: Amount,
    /// The number of transactions with the category's label, income included.
    pub transaction_count: u64,
    /// The mean expense, or zero if there are no expenses.
    pub avg_transaction: Amount,
    /// The percentage change of this month's expenses compared to last month's.
    ///
    /// Zero when nothing was spent last month.
    pub monthly_trend: f64,
    /// The user that owns the category.
    pub user_id: UserID,
    /// When the category was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the category was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated fields of a new category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The label that transactions use to refer to this category.
    pub name: String,
    /// A CSS hex color.
    pub color: String,
    /// The name of an icon.
    pub icon: String,
    /// An optional note.
    pub description: Option<String>,
}

/// The validated changes of a partial category update.
///
/// `None` keeps the stored value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategoryUpdate {
    /// The new name.
    pub name: Option<String>,
    /// The new color.
    pub color: Option<String>,
    /// The new icon.
    pub icon: Option<String>,
    /// The new description. `Some(None)` clears it.
    pub description: Option<Option<String>>,
}

/// The raw fields of a create or update request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CategoryInput {
    /// The label that transactions use to refer to this category.
    pub name: Option<String>,
    /// A CSS hex color.
    pub color: Option<String>,
    /// The name of an icon.
    pub icon: Option<String>,
    /// An optional note.
    pub description: Option<String>,
}

impl CategoryInput {
    /// Check the fields of a new category.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::MissingFields] if the name, color or icon is absent or blank,
    /// - [Error::InvalidField] if a field is too long or the color is not a hex color.
    pub fn validate(self) -> Result<NewCategory, Error> {
        let name = required_text(self.name)?;
        let color = required_text(self.color)?;
        let icon = required_text(self.icon)?;
        let description = optional_text(self.description);

        check_length("name", &name, MAX_NAME_LENGTH)?;
        check_length("icon", &icon, MAX_ICON_LENGTH)?;
        if let Some(description) = &description {
            check_length("description", description, MAX_DESCRIPTION_LENGTH)?;
        }

        Ok(NewCategory {
            name,
            color: parse_color("color", &color)?,
            icon,
            description,
        })
    }

    /// Check the fields of a partial update. Absent fields keep their value
    /// and a blank description clears the stored one.
    ///
    /// # Errors
    /// Returns [Error::InvalidField] if a given name, color or icon is blank,
    /// too long or malformed.
    pub fn validate_update(self) -> Result<CategoryUpdate, Error> {
        let color = match self.color {
            Some(color) => Some(parse_color("color", &color)?),
            None => None,
        };
        let description = match self.description {
            Some(description) => {
                let description = optional_text(Some(description));
                if let Some(description) = &description {
                    check_length("description", description, MAX_DESCRIPTION_LENGTH)?;
                }
                Some(description)
            }
            None => None,
        };

        Ok(CategoryUpdate {
            name: updated_text("name", self.name, MAX_NAME_LENGTH)?,
            color,
            icon: updated_text("icon", self.icon, MAX_ICON_LENGTH)?,
            description,
        })
    }
}
