//! Bank account CRUD.
//!
//! Create and update are the user-driven edit path: they may set
//! `balance_minor` directly. Deletion is refused while expenses still point
//! at the account, so a balance can never orphan its history.

use sea_orm::{ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BankAccount, EngineError, NewBankAccountCmd, ResultEngine, UpdateBankAccountCmd,
    bank_accounts, expenses,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// List the user's accounts with the number of expenses on each.
    pub async fn list_bank_accounts(
        &self,
        user_id: &str,
    ) -> ResultEngine<Vec<(bank_accounts::Model, u64)>> {
        with_tx!(self, |db_tx| {
            let rows = bank_accounts::Entity::find()
                .filter(bank_accounts::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(bank_accounts::Column::Name)
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(rows.len());
            for account in rows {
                let count = self.expense_count_for_account(&db_tx, &account.id).await?;
                out.push((account, count));
            }
            Ok(out)
        })
    }

    pub async fn get_bank_account(
        &self,
        user_id: &str,
        account_id: Uuid,
    ) -> ResultEngine<bank_accounts::Model> {
        with_tx!(self, |db_tx| {
            self.require_bank_account(&db_tx, user_id, account_id).await
        })
    }

    pub async fn create_bank_account(
        &self,
        cmd: NewBankAccountCmd,
    ) -> ResultEngine<bank_accounts::Model> {
        let account = BankAccount {
            id: Uuid::new_v4(),
            user_id: cmd.user_id,
            name: normalize_required_name(&cmd.name, "bank_account")?,
            bank_name: normalize_required_name(&cmd.bank_name, "bank")?,
            account_number: normalize_optional_text(cmd.account_number.as_deref()),
            account_type: cmd.account_type,
            balance_minor: cmd.balance_minor,
            currency: cmd.currency,
            is_active: true,
        };
        with_tx!(self, |db_tx| {
            let model = bank_accounts::ActiveModel::from(&account)
                .insert(&db_tx)
                .await?;
            Ok(model)
        })
    }

    pub async fn update_bank_account(
        &self,
        cmd: UpdateBankAccountCmd,
    ) -> ResultEngine<bank_accounts::Model> {
        with_tx!(self, |db_tx| {
            let existing = self
                .require_bank_account(&db_tx, &cmd.user_id, cmd.account_id)
                .await?;

            let mut patch = bank_accounts::ActiveModel {
                id: ActiveValue::Set(existing.id.clone()),
                ..Default::default()
            };
            if let Some(name) = cmd.name.as_deref() {
                patch.name = ActiveValue::Set(normalize_required_name(name, "bank_account")?);
            }
            if let Some(bank_name) = cmd.bank_name.as_deref() {
                patch.bank_name = ActiveValue::Set(normalize_required_name(bank_name, "bank")?);
            }
            if let Some(account_number) = cmd.account_number.as_deref() {
                patch.account_number =
                    ActiveValue::Set(normalize_optional_text(Some(account_number)));
            }
            if let Some(account_type) = cmd.account_type {
                patch.account_type = ActiveValue::Set(account_type.as_str().to_string());
            }
            if let Some(balance_minor) = cmd.balance_minor {
                patch.balance_minor = ActiveValue::Set(balance_minor);
            }
            if let Some(currency) = cmd.currency {
                patch.currency = ActiveValue::Set(currency.code().to_string());
            }
            if let Some(is_active) = cmd.is_active {
                patch.is_active = ActiveValue::Set(is_active);
            }

            let model = patch.update(&db_tx).await?;
            Ok(model)
        })
    }

    /// Delete an account. Refused while expenses still reference it.
    pub async fn delete_bank_account(
        &self,
        user_id: &str,
        account_id: Uuid,
    ) -> ResultEngine<bank_accounts::Model> {
        with_tx!(self, |db_tx| {
            let account = self.require_bank_account(&db_tx, user_id, account_id).await?;
            let count = self.expense_count_for_account(&db_tx, &account.id).await?;
            if count > 0 {
                return Err(EngineError::InUse(format!(
                    "bank_account has {count} expenses"
                )));
            }
            bank_accounts::Entity::delete_by_id(account.id.clone())
                .exec(&db_tx)
                .await?;
            Ok(account)
        })
    }

    async fn expense_count_for_account(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: &str,
    ) -> ResultEngine<u64> {
        expenses::Entity::find()
            .filter(expenses::Column::BankAccountId.eq(account_id.to_string()))
            .count(db_tx)
            .await
            .map_err(Into::into)
    }
}
