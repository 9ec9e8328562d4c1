//! `SeaORM` active enums mapped to `PostgreSQL` enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "move_state")]
pub enum MoveState {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "report_line_type")]
pub enum ReportLineType {
    #[sea_orm(string_value = "sum")]
    Sum,
    #[sea_orm(string_value = "accounts")]
    Accounts,
    #[sea_orm(string_value = "account_type")]
    AccountType,
    #[sea_orm(string_value = "account_report")]
    AccountReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "report_line_style")]
pub enum ReportLineStyle {
    #[sea_orm(string_value = "automatic")]
    Automatic,
    #[sea_orm(string_value = "main_title")]
    MainTitle,
    #[sea_orm(string_value = "title")]
    Title,
    #[sea_orm(string_value = "subtitle")]
    Subtitle,
    #[sea_orm(string_value = "normal")]
    Normal,
    #[sea_orm(string_value = "italic")]
    Italic,
    #[sea_orm(string_value = "smallest")]
    Smallest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "display_detail")]
pub enum DisplayDetail {
    #[sea_orm(string_value = "no_detail")]
    NoDetail,
    #[sea_orm(string_value = "detail_flat")]
    DetailFlat,
    #[sea_orm(string_value = "detail_with_hierarchy")]
    DetailWithHierarchy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "currency_position")]
pub enum CurrencyPosition {
    #[sea_orm(string_value = "before")]
    Before,
    #[sea_orm(string_value = "after")]
    After,
}
