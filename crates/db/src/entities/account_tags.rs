//! `SeaORM` Entity for account_tags table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account_tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_account_tags::Entity")]
    AccountAccountTags,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        super::account_account_tags::Relation::Accounts.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::account_account_tags::Relation::AccountTags.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
