//! Users table.
//!
//! Rows are created lazily by [`Engine::sync_user`]; the primary key is the
//! opaque `subject` string handed over by the identity layer, so the engine
//! never needs to know how authentication happened.
//!
//! [`Engine::sync_user`]: crate::Engine::sync_user

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub subject: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
