//! User-scoped lookups.
//!
//! Every operation resolves its targets through these helpers, so a record
//! belonging to another user is indistinguishable from one that does not
//! exist.

use sea_orm::{DatabaseTransaction, EntityTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, bank_accounts, budgets, categories, expenses, subcategories,
    transactions, users,
};

use super::Engine;

/// Generates a `require_*` method that loads a record scoped to its owner.
macro_rules! impl_owned_by_user {
    ($require_fn:ident, $entity:path, $user_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: &str,
            target_id: Uuid,
        ) -> ResultEngine<<$entity as EntityTrait>::Model> {
            <$entity>::find_by_id(target_id.to_string())
                .filter($user_col.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_owned_by_user!(
        require_bank_account,
        bank_accounts::Entity,
        bank_accounts::Column::UserId,
        "bank_account not exists"
    );

    impl_owned_by_user!(
        require_category,
        categories::Entity,
        categories::Column::UserId,
        "category not exists"
    );

    impl_owned_by_user!(
        require_subcategory,
        subcategories::Entity,
        subcategories::Column::UserId,
        "subcategory not exists"
    );

    impl_owned_by_user!(
        require_expense,
        expenses::Entity,
        expenses::Column::UserId,
        "expense not exists"
    );

    impl_owned_by_user!(
        require_transaction,
        transactions::Entity,
        transactions::Column::UserId,
        "transaction not exists"
    );

    impl_owned_by_user!(
        require_budget,
        budgets::Entity,
        budgets::Column::UserId,
        "budget not exists"
    );

    pub(super) async fn find_user(
        &self,
        db: &DatabaseTransaction,
        subject: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find_by_id(subject.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        subject: &str,
    ) -> ResultEngine<users::Model> {
        self.find_user(db, subject)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}
