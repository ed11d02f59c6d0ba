//! Expense records and the detail view returned by the write operations.
//!
//! Every expense points at exactly one bank account; the account's
//! `balance_minor` is adjusted in the same database transaction that writes
//! the expense row, so the two can never drift apart.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, bank_accounts, categories, subcategories};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    BankTransfer,
    Mobile,
    Other,
}

impl PaymentMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::Mobile => "mobile",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "bank_transfer" => Ok(Self::BankTransfer),
            "mobile" => Ok(Self::Mobile),
            "other" => Ok(Self::Other),
            unknown => Err(EngineError::MissingField(format!(
                "invalid payment method: {unknown}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub amount_minor: i64,
    pub category_id: String,
    pub subcategory_id: Option<String>,
    pub bank_account_id: String,
    pub description: String,
    pub occurred_at: DateTimeUtc,
    pub payment_method: String,
    /// JSON-encoded list of free-form tag strings.
    pub tags: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
    #[sea_orm(
        belongs_to = "super::subcategories::Entity",
        from = "Column::SubcategoryId",
        to = "super::subcategories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Subcategories,
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    BankAccounts,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::subcategories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcategories.def()
    }
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn encode_tags(tags: &[String]) -> ResultEngine<String> {
    serde_json::to_string(tags)
        .map_err(|err| EngineError::MissingField(format!("invalid tags: {err}")))
}

/// Tolerant decode: rows written before the tags column carried JSON come
/// back as an empty list instead of failing the whole read.
#[must_use]
pub fn decode_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// An expense together with the rows it references, as returned by the
/// create/update/delete operations and the read side.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpenseDetail {
    pub expense: Model,
    pub category: categories::Model,
    pub subcategory: Option<subcategories::Model>,
    pub bank_account: bank_accounts::Model,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        let encoded = encode_tags(&["food".to_string(), "travel".to_string()]).unwrap();
        assert_eq!(decode_tags(&encoded), vec!["food", "travel"]);
    }

    #[test]
    fn malformed_tags_decode_to_empty() {
        assert!(decode_tags("not json").is_empty());
        assert!(decode_tags("").is_empty());
    }
}
