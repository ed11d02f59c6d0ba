//! Budget CRUD.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{NewBudgetCmd, ResultEngine, UpdateBudgetCmd, budgets};

use super::{Engine, ensure_positive_amount, normalize_required_name, with_tx};

impl Engine {
    pub async fn list_budgets(&self, user_id: &str) -> ResultEngine<Vec<budgets::Model>> {
        with_tx!(self, |db_tx| {
            let rows = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(budgets::Column::Category)
                .all(&db_tx)
                .await?;
            Ok(rows)
        })
    }

    pub async fn create_budget(&self, cmd: NewBudgetCmd) -> ResultEngine<budgets::Model> {
        ensure_positive_amount(cmd.amount_minor)?;
        let category = normalize_required_name(&cmd.category, "budget category")?;
        with_tx!(self, |db_tx| {
            let model = budgets::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(cmd.user_id.clone()),
                category: ActiveValue::Set(category.clone()),
                amount_minor: ActiveValue::Set(cmd.amount_minor),
                period: ActiveValue::Set(cmd.period.as_str().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(model)
        })
    }

    pub async fn update_budget(&self, cmd: UpdateBudgetCmd) -> ResultEngine<budgets::Model> {
        with_tx!(self, |db_tx| {
            let existing = self
                .require_budget(&db_tx, &cmd.user_id, cmd.budget_id)
                .await?;
            let mut patch = budgets::ActiveModel {
                id: ActiveValue::Set(existing.id.clone()),
                ..Default::default()
            };
            if let Some(category) = cmd.category.as_deref() {
                patch.category =
                    ActiveValue::Set(normalize_required_name(category, "budget category")?);
            }
            if let Some(amount_minor) = cmd.amount_minor {
                ensure_positive_amount(amount_minor)?;
                patch.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(period) = cmd.period {
                patch.period = ActiveValue::Set(period.as_str().to_string());
            }
            let model = patch.update(&db_tx).await?;
            Ok(model)
        })
    }

    pub async fn delete_budget(
        &self,
        user_id: &str,
        budget_id: Uuid,
    ) -> ResultEngine<budgets::Model> {
        with_tx!(self, |db_tx| {
            let budget = self.require_budget(&db_tx, user_id, budget_id).await?;
            budgets::Entity::delete_by_id(budget.id.clone())
                .exec(&db_tx)
                .await?;
            Ok(budget)
        })
    }
}
