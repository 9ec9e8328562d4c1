//! Filter resolution.
//!
//! A `FilterSelection` is what the caller asked for; a `FilterCatalog` is what
//! the company has. Resolution turns the pair into the display payload
//! (`FilterSet`), the account universe and a `LedgerQuery`.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use ledgerlens_shared::types::{
    AccountId, AccountTagId, AnalyticAccountId, AnalyticTagId, CompanyId, JournalId,
    OperatingUnitId,
};
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use super::ledger::LedgerQuery;
use super::types::{AccountInfo, DebitCredit, DisplayMode, TargetMove};

/// Label shown for a dimension with no selection.
pub const ALL_LABEL: &str = "All";

/// Filters requested by the caller. Empty lists mean "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    /// Journals.
    pub journal_ids: Vec<JournalId>,
    /// Accounts.
    pub account_ids: Vec<AccountId>,
    /// Account tags; narrows the account universe.
    pub account_tag_ids: Vec<AccountTagId>,
    /// Analytic accounts.
    pub analytic_ids: Vec<AnalyticAccountId>,
    /// Analytic tags.
    pub analytic_tag_ids: Vec<AnalyticTagId>,
    /// Operating units.
    pub operating_unit_ids: Vec<OperatingUnitId>,
    /// First included date.
    pub date_from: Option<NaiveDate>,
    /// Last included date.
    pub date_to: Option<NaiveDate>,
    /// Posted only, or all entries.
    pub target_move: TargetMove,
    /// Account display mode.
    pub display_account: DisplayMode,
    /// Debit/Credit columns toggle.
    pub debit_credit: DebitCredit,
}

/// Selectable record shown in a filter drop-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedOption<I> {
    /// Record ID.
    pub id: I,
    /// Display name.
    pub name: String,
    /// Short code, for records that have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<I> NamedOption<I> {
    /// Option without a code.
    pub fn new(id: I, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
        }
    }

    /// Option with a short code.
    pub fn with_code(id: I, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: Some(code.into()),
        }
    }

    fn code_or_name(&self) -> String {
        self.code.clone().unwrap_or_else(|| self.name.clone())
    }
}

/// Everything a company can be filtered by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCatalog {
    /// Company.
    pub company_id: CompanyId,
    /// Company display name.
    pub company_name: String,
    /// Company journals.
    pub journals: Vec<NamedOption<JournalId>>,
    /// Company chart of accounts.
    pub accounts: Vec<AccountInfo>,
    /// Account tags.
    pub account_tags: Vec<NamedOption<AccountTagId>>,
    /// Analytic accounts.
    pub analytic_accounts: Vec<NamedOption<AnalyticAccountId>>,
    /// Analytic tags.
    pub analytic_tags: Vec<NamedOption<AnalyticTagId>>,
    /// Operating units.
    pub operating_units: Vec<NamedOption<OperatingUnitId>>,
}

/// Filter payload returned with every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Selected journal codes, or `["All"]`.
    pub journals: Vec<String>,
    /// Selected account codes, or `["All"]`.
    pub accounts: Vec<String>,
    /// Selected account tag names, or `["All"]`.
    pub account_tags: Vec<String>,
    /// Selected analytic account names, or `["All"]`.
    pub analytics: Vec<String>,
    /// Selected analytic tag names, or `["All"]`.
    pub analytic_tags: Vec<String>,
    /// Selected operating unit codes, or `["All"]`.
    pub operating_units: Vec<String>,
    /// Journal options.
    pub journals_list: Vec<NamedOption<JournalId>>,
    /// Account options.
    pub accounts_list: Vec<NamedOption<AccountId>>,
    /// Account tag options.
    pub account_tag_list: Vec<NamedOption<AccountTagId>>,
    /// Analytic account options.
    pub analytic_list: Vec<NamedOption<AnalyticAccountId>>,
    /// Analytic tag options.
    pub analytic_tag_list: Vec<NamedOption<AnalyticTagId>>,
    /// Operating unit options.
    pub operating_unit_list: Vec<NamedOption<OperatingUnitId>>,
    /// Company.
    pub company_id: CompanyId,
    /// Company display name.
    pub company_name: String,
    /// First included date.
    pub date_from: Option<NaiveDate>,
    /// Last included date.
    pub date_to: Option<NaiveDate>,
    /// Target move.
    pub target_move: TargetMove,
    /// Account display mode.
    pub display_account: DisplayMode,
    /// Debit/Credit columns toggle.
    pub debit_credit: DebitCredit,
}

impl FilterSet {
    /// Target move label as displayed ("Posted" or "All").
    #[must_use]
    pub const fn target_move_label(&self) -> &'static str {
        self.target_move.label()
    }
}

/// Output of filter resolution.
#[derive(Debug, Clone)]
pub struct ResolvedFilters {
    /// Display payload.
    pub filters: FilterSet,
    /// Account universe in chart order.
    pub accounts: Vec<AccountInfo>,
    /// Ledger predicate.
    pub query: LedgerQuery,
}

/// Keeps the catalog records that were selected, or all of them when the
/// selection is empty. Returns the kept records and whether a selection applied.
fn narrow<I, T, F>(selected: &[I], records: &[T], id_of: F) -> (Vec<T>, bool)
where
    I: Ord + Copy,
    T: Clone,
    F: Fn(&T) -> I,
{
    if selected.is_empty() {
        return (records.to_vec(), false);
    }
    let wanted: BTreeSet<I> = selected.iter().copied().collect();
    let kept = records
        .iter()
        .filter(|&record| wanted.contains(&id_of(record)))
        .cloned()
        .collect();
    (kept, true)
}

fn labels<I>(options: &[NamedOption<I>], selected: bool, by_code: bool) -> Vec<String> {
    if !selected {
        return vec![ALL_LABEL.to_string()];
    }
    options
        .iter()
        .map(|option| {
            if by_code {
                option.code_or_name()
            } else {
                option.name.clone()
            }
        })
        .collect()
}

fn restriction<I: Ord + Copy>(options: &[NamedOption<I>], selected: bool) -> Option<BTreeSet<I>> {
    selected.then(|| options.iter().map(|option| option.id).collect())
}

/// Resolves a selection against the company catalog.
///
/// Every multi-select dimension defaults to the whole catalog when empty and
/// narrows to exactly the known selected records otherwise. Account tags
/// narrow the account universe to accounts carrying any selected tag.
///
/// # Errors
///
/// Returns `InvalidDateRange` if `date_from` is after `date_to`.
pub fn resolve_filters(
    selection: &FilterSelection,
    catalog: &FilterCatalog,
) -> Result<ResolvedFilters, ReportError> {
    if let (Some(start), Some(end)) = (selection.date_from, selection.date_to)
        && start > end
    {
        return Err(ReportError::InvalidDateRange { start, end });
    }

    let (journals, journals_selected) = narrow(&selection.journal_ids, &catalog.journals, |j| j.id);
    let (account_tags, tags_selected) =
        narrow(&selection.account_tag_ids, &catalog.account_tags, |t| t.id);
    let (analytics, analytics_selected) = narrow(
        &selection.analytic_ids,
        &catalog.analytic_accounts,
        |a| a.id,
    );
    let (analytic_tags, analytic_tags_selected) = narrow(
        &selection.analytic_tag_ids,
        &catalog.analytic_tags,
        |t| t.id,
    );
    let (operating_units, units_selected) = narrow(
        &selection.operating_unit_ids,
        &catalog.operating_units,
        |u| u.id,
    );

    let tag_ids: BTreeSet<AccountTagId> = account_tags.iter().map(|t| t.id).collect();
    let tagged: Vec<AccountInfo> = catalog
        .accounts
        .iter()
        .filter(|account| !tags_selected || !account.tag_ids.is_disjoint(&tag_ids))
        .cloned()
        .collect();
    let (accounts, accounts_selected) = narrow(&selection.account_ids, &tagged, |a| a.id);

    let accounts_list: Vec<NamedOption<AccountId>> = accounts
        .iter()
        .map(|account| NamedOption::with_code(account.id, &account.name, &account.code))
        .collect();

    let query = LedgerQuery {
        date_from: selection.date_from,
        date_to: selection.date_to,
        target_move: selection.target_move,
        accounts: accounts.iter().map(|account| account.id).collect(),
        journals: restriction(&journals, journals_selected),
        analytics: restriction(&analytics, analytics_selected),
        analytic_tags: restriction(&analytic_tags, analytic_tags_selected),
        operating_units: restriction(&operating_units, units_selected),
    };

    let filters = FilterSet {
        journals: labels(&journals, journals_selected, true),
        accounts: labels(&accounts_list, accounts_selected, true),
        account_tags: labels(&account_tags, tags_selected, false),
        analytics: labels(&analytics, analytics_selected, false),
        analytic_tags: labels(&analytic_tags, analytic_tags_selected, false),
        operating_units: labels(&operating_units, units_selected, true),
        journals_list: journals,
        accounts_list,
        account_tag_list: account_tags,
        analytic_list: analytics,
        analytic_tag_list: analytic_tags,
        operating_unit_list: operating_units,
        company_id: catalog.company_id,
        company_name: catalog.company_name.clone(),
        date_from: selection.date_from,
        date_to: selection.date_to,
        target_move: selection.target_move,
        display_account: selection.display_account,
        debit_credit: selection.debit_credit,
    };

    Ok(ResolvedFilters {
        filters,
        accounts,
        query,
    })
}
