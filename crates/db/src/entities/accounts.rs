//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type_id: Option<Uuid>,
    pub currency_code: Option<String>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Companies,
    #[sea_orm(
        belongs_to = "super::account_types::Entity",
        from = "Column::AccountTypeId",
        to = "super::account_types::Column::Id"
    )]
    AccountTypes,
    #[sea_orm(has_many = "super::move_lines::Entity")]
    MoveLines,
    #[sea_orm(has_many = "super::account_account_tags::Entity")]
    AccountAccountTags,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::account_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountTypes.def()
    }
}

impl Related<super::move_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MoveLines.def()
    }
}

impl Related<super::account_tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::account_account_tags::Relation::AccountTags.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::account_account_tags::Relation::Accounts.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
