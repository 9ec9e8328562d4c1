//! `SeaORM` entities for the reporting schema.

pub mod prelude;

pub mod account_account_tags;
pub mod account_tags;
pub mod account_types;
pub mod accounts;
pub mod analytic_accounts;
pub mod analytic_tags;
pub mod companies;
pub mod currencies;
pub mod financial_report_lines;
pub mod journals;
pub mod move_line_analytic_tags;
pub mod move_lines;
pub mod moves;
pub mod operating_units;
pub mod report_line_account_types;
pub mod report_line_accounts;
pub mod sea_orm_active_enums;
