//! Category CRUD. Deletion is refused while subcategories or expenses exist.

use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, categories, expenses, subcategories};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// A category with its dependent-record counts, as shown in listings.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySummary {
    pub category: categories::Model,
    pub subcategory_count: u64,
    pub expense_count: u64,
}

impl Engine {
    pub async fn list_categories(&self, user_id: &str) -> ResultEngine<Vec<CategorySummary>> {
        with_tx!(self, |db_tx| {
            let rows = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(rows.len());
            for category in rows {
                let subcategory_count = self
                    .subcategory_count_for_category(&db_tx, &category.id)
                    .await?;
                let expense_count = self.expense_count_for_category(&db_tx, &category.id).await?;
                out.push(CategorySummary {
                    category,
                    subcategory_count,
                    expense_count,
                });
            }
            Ok(out)
        })
    }

    pub async fn get_category(
        &self,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, user_id, category_id).await
        })
    }

    pub async fn create_category(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> ResultEngine<categories::Model> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name.clone()),
                description: ActiveValue::Set(normalize_optional_text(description)),
                icon: ActiveValue::Set(normalize_optional_text(icon)),
            }
            .insert(&db_tx)
            .await?;
            Ok(model)
        })
    }

    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> ResultEngine<categories::Model> {
        with_tx!(self, |db_tx| {
            let existing = self.require_category(&db_tx, user_id, category_id).await?;
            let mut patch = categories::ActiveModel {
                id: ActiveValue::Set(existing.id.clone()),
                ..Default::default()
            };
            if let Some(name) = name {
                patch.name = ActiveValue::Set(normalize_required_name(name, "category")?);
            }
            if description.is_some() {
                patch.description = ActiveValue::Set(normalize_optional_text(description));
            }
            if icon.is_some() {
                patch.icon = ActiveValue::Set(normalize_optional_text(icon));
            }
            let model = patch.update(&db_tx).await?;
            Ok(model)
        })
    }

    /// Delete a category. Refused while subcategories or expenses depend on it.
    pub async fn delete_category(
        &self,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        with_tx!(self, |db_tx| {
            let category = self.require_category(&db_tx, user_id, category_id).await?;
            let subcategory_count = self
                .subcategory_count_for_category(&db_tx, &category.id)
                .await?;
            if subcategory_count > 0 {
                return Err(EngineError::InUse(format!(
                    "category has {subcategory_count} subcategories"
                )));
            }
            let expense_count = self.expense_count_for_category(&db_tx, &category.id).await?;
            if expense_count > 0 {
                return Err(EngineError::InUse(format!(
                    "category has {expense_count} expenses"
                )));
            }
            categories::Entity::delete_by_id(category.id.clone())
                .exec(&db_tx)
                .await?;
            Ok(category)
        })
    }

    async fn subcategory_count_for_category(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: &str,
    ) -> ResultEngine<u64> {
        subcategories::Entity::find()
            .filter(subcategories::Column::CategoryId.eq(category_id.to_string()))
            .count(db_tx)
            .await
            .map_err(Into::into)
    }

    async fn expense_count_for_category(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: &str,
    ) -> ResultEngine<u64> {
        expenses::Entity::find()
            .filter(expenses::Column::CategoryId.eq(category_id.to_string()))
            .count(db_tx)
            .await
            .map_err(Into::into)
    }
}
