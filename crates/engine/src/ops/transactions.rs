//! Standalone income/expense records. These never touch account balances.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    NewTransactionCmd, ResultEngine, TransactionKind, UpdateTransactionCmd, transactions,
};

use super::{Engine, ensure_positive_amount, normalize_optional_text, normalize_required_name, with_tx};

/// Optional filters for the transaction list, combined with AND.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub occurred_after: Option<DateTime<Utc>>,
    pub occurred_before: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
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
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: TransactionFilter,
    ) -> ResultEngine<Vec<transactions::Model>> {
        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(transactions::Column::OccurredAt);
            if let Some(kind) = filter.kind {
                query = query.filter(transactions::Column::Kind.eq(kind.as_str().to_string()));
            }
            if let Some(category) = filter.category.as_deref() {
                query = query.filter(transactions::Column::Category.eq(category.to_string()));
            }
            if let Some(after) = filter.occurred_after {
                query = query.filter(transactions::Column::OccurredAt.gte(after));
            }
            if let Some(before) = filter.occurred_before {
                query = query.filter(transactions::Column::OccurredAt.lte(before));
            }
            let rows = query.all(&db_tx).await?;
            Ok(rows)
        })
    }

    pub async fn get_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        with_tx!(self, |db_tx| {
            self.require_transaction(&db_tx, user_id, transaction_id)
                .await
        })
    }

    pub async fn create_transaction(
        &self,
        cmd: NewTransactionCmd,
    ) -> ResultEngine<transactions::Model> {
        ensure_positive_amount(cmd.amount_minor)?;
        let category = normalize_required_name(&cmd.category, "transaction category")?;
        with_tx!(self, |db_tx| {
            let model = transactions::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(cmd.user_id.clone()),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(cmd.amount_minor),
                category: ActiveValue::Set(category.clone()),
                description: ActiveValue::Set(normalize_optional_text(cmd.description.as_deref())),
                occurred_at: ActiveValue::Set(cmd.occurred_at),
            }
            .insert(&db_tx)
            .await?;
            Ok(model)
        })
    }

    pub async fn update_transaction(
        &self,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<transactions::Model> {
        with_tx!(self, |db_tx| {
            let existing = self
                .require_transaction(&db_tx, &cmd.user_id, cmd.transaction_id)
                .await?;
            let mut patch = transactions::ActiveModel {
                id: ActiveValue::Set(existing.id.clone()),
                ..Default::default()
            };
            if let Some(kind) = cmd.kind {
                patch.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(amount_minor) = cmd.amount_minor {
                ensure_positive_amount(amount_minor)?;
                patch.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(category) = cmd.category.as_deref() {
                patch.category =
                    ActiveValue::Set(normalize_required_name(category, "transaction category")?);
            }
            if let Some(description) = cmd.description.as_deref() {
                patch.description = ActiveValue::Set(normalize_optional_text(Some(description)));
            }
            if let Some(occurred_at) = cmd.occurred_at {
                patch.occurred_at = ActiveValue::Set(occurred_at);
            }
            let model = patch.update(&db_tx).await?;
            Ok(model)
        })
    }

    pub async fn delete_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        with_tx!(self, |db_tx| {
            let transaction = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            transactions::Entity::delete_by_id(transaction.id.clone())
                .exec(&db_tx)
                .await?;
            Ok(transaction)
        })
    }
}
