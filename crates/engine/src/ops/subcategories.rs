//! Subcategory CRUD. The parent category must belong to the same user, both
//! at creation and when an update moves the subcategory.

use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, expenses, subcategories};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    pub async fn list_subcategories(
        &self,
        user_id: &str,
        category_id: Option<Uuid>,
    ) -> ResultEngine<Vec<subcategories::Model>> {
        with_tx!(self, |db_tx| {
            let mut query = subcategories::Entity::find()
                .filter(subcategories::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(subcategories::Column::Name);
            if let Some(id) = category_id {
                self.require_category(&db_tx, user_id, id).await?;
                query = query.filter(subcategories::Column::CategoryId.eq(id.to_string()));
            }
            let rows = query.all(&db_tx).await?;
            Ok(rows)
        })
    }

    pub async fn get_subcategory(
        &self,
        user_id: &str,
        subcategory_id: Uuid,
    ) -> ResultEngine<subcategories::Model> {
        with_tx!(self, |db_tx| {
            self.require_subcategory(&db_tx, user_id, subcategory_id)
                .await
        })
    }

    pub async fn create_subcategory(
        &self,
        user_id: &str,
        category_id: Uuid,
        name: &str,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> ResultEngine<subcategories::Model> {
        let name = normalize_required_name(name, "subcategory")?;
        with_tx!(self, |db_tx| {
            let category = self.require_category(&db_tx, user_id, category_id).await?;
            let model = subcategories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                category_id: ActiveValue::Set(category.id.clone()),
                name: ActiveValue::Set(name.clone()),
                description: ActiveValue::Set(normalize_optional_text(description)),
                icon: ActiveValue::Set(normalize_optional_text(icon)),
            }
            .insert(&db_tx)
            .await?;
            Ok(model)
        })
    }

    pub async fn update_subcategory(
        &self,
        user_id: &str,
        subcategory_id: Uuid,
        category_id: Option<Uuid>,
        name: Option<&str>,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> ResultEngine<subcategories::Model> {
        with_tx!(self, |db_tx| {
            let existing = self
                .require_subcategory(&db_tx, user_id, subcategory_id)
                .await?;
            let mut patch = subcategories::ActiveModel {
                id: ActiveValue::Set(existing.id.clone()),
                ..Default::default()
            };
            if let Some(id) = category_id {
                let category = self.require_category(&db_tx, user_id, id).await?;
                patch.category_id = ActiveValue::Set(category.id);
            }
            if let Some(name) = name {
                patch.name = ActiveValue::Set(normalize_required_name(name, "subcategory")?);
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

    /// Delete a subcategory. Refused while expenses still reference it.
    pub async fn delete_subcategory(
        &self,
        user_id: &str,
        subcategory_id: Uuid,
    ) -> ResultEngine<subcategories::Model> {
        with_tx!(self, |db_tx| {
            let subcategory = self
                .require_subcategory(&db_tx, user_id, subcategory_id)
                .await?;
            let count = self
                .expense_count_for_subcategory(&db_tx, &subcategory.id)
                .await?;
            if count > 0 {
                return Err(EngineError::InUse(format!(
                    "subcategory has {count} expenses"
                )));
            }
            subcategories::Entity::delete_by_id(subcategory.id.clone())
                .exec(&db_tx)
                .await?;
            Ok(subcategory)
        })
    }

    async fn expense_count_for_subcategory(
        &self,
        db_tx: &DatabaseTransaction,
        subcategory_id: &str,
    ) -> ResultEngine<u64> {
        expenses::Entity::find()
            .filter(expenses::Column::SubcategoryId.eq(subcategory_id.to_string()))
            .count(db_tx)
            .await
            .map_err(Into::into)
    }
}
