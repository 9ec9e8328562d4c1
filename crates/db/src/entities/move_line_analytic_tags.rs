//! `SeaORM` Entity for move_line_analytic_tags link table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "move_line_analytic_tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub move_line_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub analytic_tag_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::move_lines::Entity",
        from = "Column::MoveLineId",
        to = "super::move_lines::Column::Id"
    )]
    MoveLines,
    #[sea_orm(
        belongs_to = "super::analytic_tags::Entity",
        from = "Column::AnalyticTagId",
        to = "super::analytic_tags::Column::Id"
    )]
    AnalyticTags,
}

impl Related<super::move_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MoveLines.def()
    }
}

impl Related<super::analytic_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnalyticTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
