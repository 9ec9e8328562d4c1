//! Report data types.

use std::collections::BTreeSet;

use ledgerlens_shared::types::{
    AccountId, AccountTagId, AccountTypeId, Currency, MoneyFormat, round2,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::filter::FilterSet;
use super::ledger::LedgerLine;
use super::rollup::ReportResultLine;

/// Which accounts appear in an account listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Every account, with or without lines.
    All,
    /// Accounts with at least one line.
    #[default]
    Movement,
    /// Accounts whose balance is not zero in their currency.
    NotZero,
}

/// Which journal entries feed the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMove {
    /// Posted entries only.
    #[default]
    Posted,
    /// Draft and posted entries.
    All,
}

impl TargetMove {
    /// Returns true if entries in `status` are included.
    #[must_use]
    pub const fn accepts(self, status: MoveStatus) -> bool {
        match self {
            Self::Posted => matches!(status, MoveStatus::Posted),
            Self::All => true,
        }
    }

    /// Capitalized label used in filter summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Posted => "Posted",
            Self::All => "All",
        }
    }
}

/// State of the journal entry a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveStatus {
    /// Not yet posted.
    Draft,
    /// Posted to the ledger.
    Posted,
}

/// Whether debit and credit columns are shown next to the balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebitCredit {
    /// Debit, Credit and Balance columns.
    Show,
    /// Balance column only.
    #[default]
    Hide,
}

/// Chart of accounts entry as seen by the reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type, used by account-type report lines.
    pub account_type_id: Option<AccountTypeId>,
    /// Account tags.
    pub tag_ids: BTreeSet<AccountTagId>,
    /// Account currency, or the company currency.
    pub currency: Currency,
}

/// Per-account aggregate of ledger lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountAggregate {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type_id: Option<AccountTypeId>,
    /// Sum of rounded line debits.
    pub debit: Decimal,
    /// Sum of rounded line credits.
    pub credit: Decimal,
    /// Rounded balance of the last line.
    pub balance: Decimal,
    /// Contributing lines, in ledger order.
    pub lines: Vec<LedgerLine>,
}

impl AccountAggregate {
    /// Creates an aggregate with no lines.
    #[must_use]
    pub fn empty(account: &AccountInfo) -> Self {
        Self {
            account_id: account.id,
            account_code: account.code.clone(),
            account_name: account.name.clone(),
            account_type_id: account.account_type_id,
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            balance: Decimal::ZERO,
            lines: Vec::new(),
        }
    }
}

/// Totals over the listed accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    /// Sum of account debits.
    pub debit_total: Decimal,
    /// Sum of account credits.
    pub credit_total: Decimal,
    /// Rounded debit total minus rounded credit total.
    pub debit_balance: Decimal,
}

impl ReportTotals {
    /// Computes totals over account aggregates.
    #[must_use]
    pub fn from_aggregates(aggregates: &[AccountAggregate]) -> Self {
        let debit_total: Decimal = aggregates.iter().map(|a| a.debit).sum();
        let credit_total: Decimal = aggregates.iter().map(|a| a.credit).sum();
        Self {
            debit_total,
            credit_total,
            debit_balance: round2(debit_total) - round2(credit_total),
        }
    }
}

/// General ledger report payload.
#[derive(Debug, Clone, Serialize)]
pub struct GeneralLedgerReport {
    /// Report title.
    pub name: String,
    /// Applied filters.
    pub filters: FilterSet,
    /// Accounts with their lines.
    pub report_lines: Vec<AccountAggregate>,
    /// Sum of account debits.
    pub debit_total: Decimal,
    /// Sum of account credits.
    pub credit_total: Decimal,
    /// Rounded debit total minus rounded credit total.
    pub debit_balance: Decimal,
    /// Company currency display settings.
    pub currency: MoneyFormat,
}

/// Hierarchical financial report payload (Balance Sheet, Profit and Loss).
#[derive(Debug, Clone, Serialize)]
pub struct FinancialReport {
    /// Report name.
    pub name: String,
    /// Applied filters.
    pub filters: FilterSet,
    /// Accounts with their lines.
    pub report_lines: Vec<AccountAggregate>,
    /// Sum of account debits.
    pub debit_total: Decimal,
    /// Sum of account credits.
    pub credit_total: Decimal,
    /// Rounded debit total minus rounded credit total.
    pub debit_balance: Decimal,
    /// Company currency display settings.
    pub currency: MoneyFormat,
    /// Rolled-up report lines in display order.
    pub bs_lines: Vec<ReportResultLine>,
}
