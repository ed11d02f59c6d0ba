//! Expense writes and reads.
//!
//! The three write paths (create, update, delete) are the only code that
//! touches `bank_accounts.balance_minor` besides the user-driven account
//! edit. Each runs as a single database transaction: the expense row and the
//! balance adjustment land together or not at all, and the balance is always
//! re-read inside the open transaction before being written back.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CreateExpenseCmd, EngineError, ExpenseDetail, ResultEngine, SubcategoryPatch,
    UpdateExpenseCmd, bank_accounts, categories, expenses, subcategories,
};

use super::{Engine, ensure_positive_amount, parse_key, with_tx};

/// Optional filters for the expense list, combined with AND.
#[derive(Clone, Debug, Default)]
pub struct ExpenseFilter {
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub bank_account_id: Option<Uuid>,
    pub occurred_after: Option<DateTime<Utc>>,
    pub occurred_before: Option<DateTime<Utc>>,
}

impl ExpenseFilter {
    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn subcategory_id(mut self, subcategory_id: Uuid) -> Self {
        self.subcategory_id = Some(subcategory_id);
        self
    }

    #[must_use]
    pub fn bank_account_id(mut self, bank_account_id: Uuid) -> Self {
        self.bank_account_id = Some(bank_account_id);
        self
    }

    #[must_use]
    pub fn occurred_after(mut self, occurred_after: DateTime<Utc>) -> Self {
        self.occurred_after = Some(occurred_after);
        self
    }

    #[must_use]
    pub fn occurred_before(mut self, occurred_before: DateTime<Utc>) -> Self {
        self.occurred_before = Some(occurred_before);
        self
    }
}

impl Engine {
    /// Create an expense and debit its bank account, atomically.
    pub async fn create_expense(&self, cmd: CreateExpenseCmd) -> ResultEngine<ExpenseDetail> {
        with_tx!(self, |db_tx| {
            ensure_positive_amount(cmd.amount_minor)?;
            let category = self
                .require_category(&db_tx, &cmd.user_id, cmd.category_id)
                .await?;
            let subcategory = match cmd.subcategory_id {
                Some(id) => Some(self.require_subcategory(&db_tx, &cmd.user_id, id).await?),
                None => None,
            };
            ensure_subcategory_matches(subcategory.as_ref(), &category)?;
            self.require_bank_account(&db_tx, &cmd.user_id, cmd.bank_account_id)
                .await?;

            let expense = expenses::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(cmd.user_id.clone()),
                amount_minor: ActiveValue::Set(cmd.amount_minor),
                category_id: ActiveValue::Set(category.id.clone()),
                subcategory_id: ActiveValue::Set(subcategory.as_ref().map(|s| s.id.clone())),
                bank_account_id: ActiveValue::Set(cmd.bank_account_id.to_string()),
                description: ActiveValue::Set(cmd.description.clone()),
                occurred_at: ActiveValue::Set(cmd.occurred_at),
                payment_method: ActiveValue::Set(cmd.payment_method.as_str().to_string()),
                tags: ActiveValue::Set(expenses::encode_tags(&cmd.tags)?),
            }
            .insert(&db_tx)
            .await?;

            let bank_account = self
                .apply_balance_delta(&db_tx, &cmd.user_id, cmd.bank_account_id, -cmd.amount_minor)
                .await?;

            Ok(ExpenseDetail {
                expense,
                category,
                subcategory,
                bank_account,
            })
        })
    }

    /// Partially update an expense, reconciling the affected balances.
    ///
    /// When the expense stays on the same account a single delta of
    /// `-(new - old)` is written (skipped when zero). When it moves between
    /// accounts the old account is credited the old amount and the new
    /// account debited the new amount, as two independent row updates.
    pub async fn update_expense(&self, cmd: UpdateExpenseCmd) -> ResultEngine<ExpenseDetail> {
        with_tx!(self, |db_tx| {
            let existing = self
                .require_expense(&db_tx, &cmd.user_id, cmd.expense_id)
                .await?;

            let category = match cmd.category_id {
                Some(id) => self.require_category(&db_tx, &cmd.user_id, id).await?,
                None => {
                    let id = parse_key(&existing.category_id, "category not exists")?;
                    self.require_category(&db_tx, &cmd.user_id, id).await?
                }
            };
            let subcategory = match cmd.subcategory {
                SubcategoryPatch::Clear => None,
                SubcategoryPatch::Set(id) => {
                    Some(self.require_subcategory(&db_tx, &cmd.user_id, id).await?)
                }
                SubcategoryPatch::Keep => match existing.subcategory_id.as_deref() {
                    Some(raw) => {
                        let id = parse_key(raw, "subcategory not exists")?;
                        Some(self.require_subcategory(&db_tx, &cmd.user_id, id).await?)
                    }
                    None => None,
                },
            };
            ensure_subcategory_matches(subcategory.as_ref(), &category)?;

            let new_amount = cmd.amount_minor.unwrap_or(existing.amount_minor);
            ensure_positive_amount(new_amount)?;
            let old_account_id = parse_key(&existing.bank_account_id, "bank_account not exists")?;
            let new_account_id = cmd.bank_account_id.unwrap_or(old_account_id);

            let bank_account = if new_account_id == old_account_id {
                let delta = new_amount - existing.amount_minor;
                if delta == 0 {
                    self.require_bank_account(&db_tx, &cmd.user_id, old_account_id)
                        .await?
                } else {
                    self.apply_balance_delta(&db_tx, &cmd.user_id, old_account_id, -delta)
                        .await?
                }
            } else {
                self.apply_balance_delta(
                    &db_tx,
                    &cmd.user_id,
                    old_account_id,
                    existing.amount_minor,
                )
                .await?;
                self.apply_balance_delta(&db_tx, &cmd.user_id, new_account_id, -new_amount)
                    .await?
            };

            let mut patch = expenses::ActiveModel {
                id: ActiveValue::Set(existing.id.clone()),
                amount_minor: ActiveValue::Set(new_amount),
                category_id: ActiveValue::Set(category.id.clone()),
                subcategory_id: ActiveValue::Set(subcategory.as_ref().map(|s| s.id.clone())),
                bank_account_id: ActiveValue::Set(new_account_id.to_string()),
                ..Default::default()
            };
            if let Some(description) = cmd.description.clone() {
                patch.description = ActiveValue::Set(description);
            }
            if let Some(occurred_at) = cmd.occurred_at {
                patch.occurred_at = ActiveValue::Set(occurred_at);
            }
            if let Some(payment_method) = cmd.payment_method {
                patch.payment_method = ActiveValue::Set(payment_method.as_str().to_string());
            }
            if let Some(tags) = cmd.tags.as_deref() {
                patch.tags = ActiveValue::Set(expenses::encode_tags(tags)?);
            }
            let expense = patch.update(&db_tx).await?;

            Ok(ExpenseDetail {
                expense,
                category,
                subcategory,
                bank_account,
            })
        })
    }

    /// Delete an expense and credit its amount back to the account.
    pub async fn delete_expense(
        &self,
        user_id: &str,
        expense_id: Uuid,
    ) -> ResultEngine<ExpenseDetail> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, user_id, expense_id).await?;
            let account_id = parse_key(&expense.bank_account_id, "bank_account not exists")?;
            let category_id = parse_key(&expense.category_id, "category not exists")?;
            let category = self.require_category(&db_tx, user_id, category_id).await?;
            let subcategory = match expense.subcategory_id.as_deref() {
                Some(raw) => {
                    let id = parse_key(raw, "subcategory not exists")?;
                    Some(self.require_subcategory(&db_tx, user_id, id).await?)
                }
                None => None,
            };

            expenses::Entity::delete_by_id(expense.id.clone())
                .exec(&db_tx)
                .await?;
            let bank_account = self
                .apply_balance_delta(&db_tx, user_id, account_id, expense.amount_minor)
                .await?;

            Ok(ExpenseDetail {
                expense,
                category,
                subcategory,
                bank_account,
            })
        })
    }

    /// Fetch one expense with its relations.
    pub async fn get_expense(
        &self,
        user_id: &str,
        expense_id: Uuid,
    ) -> ResultEngine<ExpenseDetail> {
        with_tx!(self, |db_tx| {
            let expense = self.require_expense(&db_tx, user_id, expense_id).await?;
            let detail = self.attach_relations(&db_tx, user_id, expense).await?;
            Ok(detail)
        })
    }

    /// List expenses newest first, with relations attached.
    pub async fn list_expenses(
        &self,
        user_id: &str,
        filter: ExpenseFilter,
    ) -> ResultEngine<Vec<ExpenseDetail>> {
        with_tx!(self, |db_tx| {
            let mut query = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(expenses::Column::OccurredAt);
            if let Some(id) = filter.category_id {
                query = query.filter(expenses::Column::CategoryId.eq(id.to_string()));
            }
            if let Some(id) = filter.subcategory_id {
                query = query.filter(expenses::Column::SubcategoryId.eq(id.to_string()));
            }
            if let Some(id) = filter.bank_account_id {
                query = query.filter(expenses::Column::BankAccountId.eq(id.to_string()));
            }
            if let Some(after) = filter.occurred_after {
                query = query.filter(expenses::Column::OccurredAt.gte(after));
            }
            if let Some(before) = filter.occurred_before {
                query = query.filter(expenses::Column::OccurredAt.lte(before));
            }

            let rows = query.all(&db_tx).await?;
            let mut details = Vec::with_capacity(rows.len());
            for expense in rows {
                details.push(self.attach_relations(&db_tx, user_id, expense).await?);
            }
            Ok(details)
        })
    }

    /// Re-read the account balance inside the open transaction and write it
    /// back with the delta applied.
    async fn apply_balance_delta(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        account_id: Uuid,
        delta_minor: i64,
    ) -> ResultEngine<bank_accounts::Model> {
        let account = self.require_bank_account(db_tx, user_id, account_id).await?;
        let updated = bank_accounts::ActiveModel {
            id: ActiveValue::Set(account.id.clone()),
            balance_minor: ActiveValue::Set(account.balance_minor + delta_minor),
            ..Default::default()
        }
        .update(db_tx)
        .await?;
        Ok(updated)
    }

    async fn attach_relations(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        expense: expenses::Model,
    ) -> ResultEngine<ExpenseDetail> {
        let category_id = parse_key(&expense.category_id, "category not exists")?;
        let category = self.require_category(db_tx, user_id, category_id).await?;
        let subcategory = match expense.subcategory_id.as_deref() {
            Some(raw) => {
                let id = parse_key(raw, "subcategory not exists")?;
                Some(self.require_subcategory(db_tx, user_id, id).await?)
            }
            None => None,
        };
        let account_id = parse_key(&expense.bank_account_id, "bank_account not exists")?;
        let bank_account = self.require_bank_account(db_tx, user_id, account_id).await?;
        Ok(ExpenseDetail {
            expense,
            category,
            subcategory,
            bank_account,
        })
    }
}

fn ensure_subcategory_matches(
    subcategory: Option<&subcategories::Model>,
    category: &categories::Model,
) -> ResultEngine<()> {
    if let Some(sub) = subcategory
        && sub.category_id != category.id
    {
        return Err(EngineError::CategoryMismatch(format!(
            "subcategory {} does not belong to category {}",
            sub.id, category.id
        )));
    }
    Ok(())
}
