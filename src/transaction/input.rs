//! Validation of transaction fields sent by clients.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};

use crate::{
    Error,
    database_id::TransactionId,
    date::parse_date,
    field::{check_length, required_text},
    money::Amount,
    transaction::{NewTransaction, TransactionType},
};

/// The longest description a transaction may have, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// The longest category label a transaction may have, in characters.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// The raw fields of a create or update request.
///
/// Every field is optional here so that a missing field is reported as
/// [Error::MissingFields] instead of a JSON parsing error.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionInput {
    /// The transaction to update. Ignored when creating.
    #[serde(default, deserialize_with = "number_or_numeric_text")]
    pub id: Option<TransactionId>,
    /// What the transaction was for.
    pub description: Option<String>,
    /// The category label.
    pub category: Option<String>,
    /// The amount. Only the magnitude is used.
    pub amount: Option<Decimal>,
    /// The date as "YYYY-MM-DD" or an RFC 3339 timestamp.
    pub date: Option<String>,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Number(TransactionId),
    Text(String),
}

// HTML forms sent with json-enc carry every value as a string.
fn number_or_numeric_text<'de, D>(deserializer: D) -> Result<Option<TransactionId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IdValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdValue::Number(id)) => Ok(Some(id)),
        Some(IdValue::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid transaction ID \"{text}\""))),
    }
}

impl TransactionInput {
    /// Check that every field is present and valid.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::MissingFields] if any field is absent or blank,
    /// - [Error::InvalidField] if a field is present but malformed, e.g. a zero amount.
    pub fn validate(self) -> Result<NewTransaction, Error> {
        let description = required_text(self.description)?;
        let category = required_text(self.category)?;
        let date = required_text(self.date)?;
        let transaction_type = required_text(self.transaction_type)?;
        let amount = self.amount.ok_or(Error::MissingFields)?;

        check_length("description", &description, MAX_DESCRIPTION_LENGTH)?;
        check_length("category", &category, MAX_CATEGORY_LENGTH)?;

        Ok(NewTransaction {
            description,
            category,
            amount: Amount::parse("amount", amount)?.abs(),
            date: parse_date("date", &date)?,
            transaction_type: TransactionType::parse("type", &transaction_type)?,
        })
    }

    /// Like [TransactionInput::validate], but also requires the ID of the
    /// transaction to update.
    ///
    /// # Errors
    /// Returns [Error::MissingFields] if the ID is absent, otherwise the errors
    /// of [TransactionInput::validate].
    pub fn validate_update(self) -> Result<(TransactionId, NewTransaction), Error> {
        let id = self.id.ok_or(Error::MissingFields)?;

        Ok((id, self.validate()?))
    }
}
