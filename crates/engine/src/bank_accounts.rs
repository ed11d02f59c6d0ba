//! The module contains the `BankAccount` struct and its entity.
//!
//! A bank account carries a denormalized `balance_minor` that the expense
//! operations keep in sync: after every committed expense write the balance
//! equals the initial balance minus the sum of the expenses pointing at the
//! account.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    Credit,
    Cash,
}

impl AccountType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
            Self::Cash => "cash",
        }
    }
}

impl TryFrom<&str> for AccountType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit" => Ok(Self::Credit),
            "cash" => Ok(Self::Cash),
            other => Err(EngineError::MissingField(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

/// A bank account owned by a single user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub bank_name: String,
    pub account_number: Option<String>,
    pub account_type: AccountType,
    pub balance_minor: i64,
    pub currency: Currency,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub bank_name: String,
    pub account_number: Option<String>,
    pub account_type: String,
    pub balance_minor: i64,
    pub currency: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Subject",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankAccount> for ActiveModel {
    fn from(value: &BankAccount) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            bank_name: ActiveValue::Set(value.bank_name.clone()),
            account_number: ActiveValue::Set(value.account_number.clone()),
            account_type: ActiveValue::Set(value.account_type.as_str().to_string()),
            balance_minor: ActiveValue::Set(value.balance_minor),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            is_active: ActiveValue::Set(value.is_active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_type_codes_round_trip() {
        for kind in [
            AccountType::Checking,
            AccountType::Savings,
            AccountType::Credit,
            AccountType::Cash,
        ] {
            assert_eq!(AccountType::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(AccountType::try_from("offshore").is_err());
    }
}
