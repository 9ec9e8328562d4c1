//! `SeaORM` Entity for financial_report_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{DisplayDetail, ReportLineStyle, ReportLineType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_report_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub sequence: i32,
    pub report_type: ReportLineType,
    pub report_reference_id: Option<Uuid>,
    pub sign: i16,
    pub style: ReportLineStyle,
    pub display_detail: DisplayDetail,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
    #[sea_orm(has_many = "super::report_line_accounts::Entity")]
    ReportLineAccounts,
    #[sea_orm(has_many = "super::report_line_account_types::Entity")]
    ReportLineAccountTypes,
}

impl Related<super::report_line_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportLineAccounts.def()
    }
}

impl Related<super::report_line_account_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportLineAccountTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
