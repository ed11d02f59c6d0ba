//! User sync and profile.

use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{ResultEngine, users};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Find or create the user row for an identity subject.
    ///
    /// Called by the identity layer on every authenticated request, so it has
    /// to be idempotent: an existing row is returned untouched.
    pub async fn sync_user(
        &self,
        subject: &str,
        email: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> ResultEngine<users::Model> {
        with_tx!(self, |db_tx| {
            if let Some(existing) = self.find_user(&db_tx, subject).await? {
                return Ok(existing);
            }
            let model = users::ActiveModel {
                subject: ActiveValue::Set(subject.to_string()),
                email: ActiveValue::Set(normalize_optional_text(email)),
                first_name: ActiveValue::Set(normalize_optional_text(first_name)),
                last_name: ActiveValue::Set(normalize_optional_text(last_name)),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(model)
        })
    }

    pub async fn current_user(&self, subject: &str) -> ResultEngine<users::Model> {
        with_tx!(self, |db_tx| { self.require_user(&db_tx, subject).await })
    }

    pub async fn update_profile(
        &self,
        subject: &str,
        email: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> ResultEngine<users::Model> {
        with_tx!(self, |db_tx| {
            let existing = self.require_user(&db_tx, subject).await?;
            let mut patch = users::ActiveModel {
                subject: ActiveValue::Set(existing.subject.clone()),
                ..Default::default()
            };
            if email.is_some() {
                patch.email = ActiveValue::Set(normalize_optional_text(email));
            }
            if first_name.is_some() {
                patch.first_name = ActiveValue::Set(normalize_optional_text(first_name));
            }
            if last_name.is_some() {
                patch.last_name = ActiveValue::Set(normalize_optional_text(last_name));
            }
            let model = patch.update(&db_tx).await?;
            Ok(model)
        })
    }
}
