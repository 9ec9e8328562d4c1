//! Report generation service.

use ledgerlens_shared::types::MoneyFormat;
use tracing::{debug, info};

use super::aggregator::AccountAggregator;
use super::error::ReportError;
use super::export::SpreadsheetLayout;
use super::filter::{FilterCatalog, FilterSelection, ResolvedFilters, resolve_filters};
use super::ledger::{LedgerLine, LedgerSource, merge_running_balances};
use super::rollup::RollupEngine;
use super::tree::{ReportTree, ReportTreeSource};
use super::types::{FinancialReport, GeneralLedgerReport, ReportTotals};

/// Title of the general ledger report.
pub const GENERAL_LEDGER_TITLE: &str = "General Ledger";

/// Service for generating financial reports.
///
/// The `build_*` functions are pure: they take resolved filters and lines
/// already fetched, so async callers can fetch first and compute afterwards.
/// The other functions fetch from a synchronous `LedgerSource`.
pub struct ReportService;

impl ReportService {
    /// Generates the general ledger: every account in the filter universe with
    /// its lines, opening with an initial-balance line when `date_from` is set.
    pub fn general_ledger<L>(
        ledger: &L,
        catalog: &FilterCatalog,
        selection: &FilterSelection,
        money: &MoneyFormat,
    ) -> Result<GeneralLedgerReport, ReportError>
    where
        L: LedgerSource + ?Sized,
    {
        let resolved = resolve_filters(selection, catalog)?;
        if resolved.accounts.is_empty() {
            return Err(ReportError::NoAccountsFound);
        }
        let initial = ledger.initial_balances(&resolved.query)?;
        let lines = ledger.query(&resolved.query)?;
        Self::build_general_ledger(resolved, initial, lines, money)
    }

    /// Generates a hierarchical report (Balance Sheet, Profit and Loss) for the
    /// first report tree whose root name contains `report_name`.
    pub fn financial_report<L, T>(
        ledger: &L,
        trees: &T,
        catalog: &FilterCatalog,
        report_name: &str,
        selection: &FilterSelection,
        money: &MoneyFormat,
    ) -> Result<FinancialReport, ReportError>
    where
        L: LedgerSource + ?Sized,
        T: ReportTreeSource + ?Sized,
    {
        let resolved = resolve_filters(selection, catalog)?;
        if resolved.accounts.is_empty() {
            return Err(ReportError::NoAccountsFound);
        }
        let tree = trees.load_tree(report_name)?;
        let lines = ledger.query(&resolved.query)?;
        Self::build_financial_report(report_name, resolved, &tree, lines, money)
    }

    /// Builds the general ledger from fetched lines.
    pub fn build_general_ledger(
        resolved: ResolvedFilters,
        initial: Vec<LedgerLine>,
        lines: Vec<LedgerLine>,
        money: &MoneyFormat,
    ) -> Result<GeneralLedgerReport, ReportError> {
        let line_count = lines.len();
        let merged = merge_running_balances(initial, lines);
        let report_lines = AccountAggregator::aggregate(
            merged,
            &resolved.accounts,
            resolved.filters.display_account,
        )?;
        let totals = ReportTotals::from_aggregates(&report_lines);

        info!(
            company_id = %resolved.filters.company_id,
            lines = line_count,
            accounts = report_lines.len(),
            "Generated general ledger"
        );

        Ok(GeneralLedgerReport {
            name: GENERAL_LEDGER_TITLE.to_string(),
            filters: resolved.filters,
            report_lines,
            debit_total: totals.debit_total,
            credit_total: totals.credit_total,
            debit_balance: totals.debit_balance,
            currency: money.clone(),
        })
    }

    /// Builds a hierarchical report from fetched in-range lines.
    pub fn build_financial_report(
        report_name: &str,
        resolved: ResolvedFilters,
        tree: &ReportTree,
        lines: Vec<LedgerLine>,
        money: &MoneyFormat,
    ) -> Result<FinancialReport, ReportError> {
        let merged = merge_running_balances(Vec::new(), lines);
        let report_lines = AccountAggregator::aggregate(
            merged,
            &resolved.accounts,
            resolved.filters.display_account,
        )?;
        let totals = ReportTotals::from_aggregates(&report_lines);
        debug!(accounts = report_lines.len(), tree_lines = tree.len(), "Rolling up report");

        let bs_lines = RollupEngine::new(money).rollup(tree, &report_lines);
        let name = tree
            .root()
            .map_or_else(|| report_name.to_string(), |root| root.def.name.clone());

        info!(
            company_id = %resolved.filters.company_id,
            report = %name,
            rows = bs_lines.len(),
            "Generated financial report"
        );

        Ok(FinancialReport {
            name,
            filters: resolved.filters,
            report_lines,
            debit_total: totals.debit_total,
            credit_total: totals.credit_total,
            debit_balance: totals.debit_balance,
            currency: money.clone(),
            bs_lines,
        })
    }

    /// Lays out a financial report for spreadsheet export.
    #[must_use]
    pub fn export(report: &FinancialReport) -> SpreadsheetLayout {
        SpreadsheetLayout::build(&report.name, &report.filters, &report.bs_lines)
    }
}
