//! `SeaORM` Entity for analytic_tags table.
//!
//! Tags without a company are shared by every company.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "analytic_tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::move_line_analytic_tags::Entity")]
    MoveLineAnalyticTags,
}

impl Related<super::move_line_analytic_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MoveLineAnalyticTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
