//! Entity re-exports.

pub use super::account_account_tags::Entity as AccountAccountTags;
pub use super::account_tags::Entity as AccountTags;
pub use super::account_types::Entity as AccountTypes;
pub use super::accounts::Entity as Accounts;
pub use super::analytic_accounts::Entity as AnalyticAccounts;
pub use super::analytic_tags::Entity as AnalyticTags;
pub use super::companies::Entity as Companies;
pub use super::currencies::Entity as Currencies;
pub use super::financial_report_lines::Entity as FinancialReportLines;
pub use super::journals::Entity as Journals;
pub use super::move_line_analytic_tags::Entity as MoveLineAnalyticTags;
pub use super::move_lines::Entity as MoveLines;
pub use super::moves::Entity as Moves;
pub use super::operating_units::Entity as OperatingUnits;
pub use super::report_line_account_types::Entity as ReportLineAccountTypes;
pub use super::report_line_accounts::Entity as ReportLineAccounts;
