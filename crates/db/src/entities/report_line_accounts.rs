//! `SeaORM` Entity for report_line_accounts link table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report_line_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub report_line_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::financial_report_lines::Entity",
        from = "Column::ReportLineId",
        to = "super::financial_report_lines::Column::Id"
    )]
    FinancialReportLines,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::financial_report_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialReportLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
