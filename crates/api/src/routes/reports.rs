//! Report routes.
//!
//! Handlers fetch through `ReportRepository` and compute with the pure
//! `ReportService::build_*` functions.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use ledgerlens_core::reports::{
    DebitCredit, DisplayMode, FilterSelection, FinancialReport, GeneralLedgerReport, ReportError,
    ReportService, ReportTreeSource, TargetMove, resolve_filters,
};
use ledgerlens_db::ReportRepository;
use ledgerlens_shared::AppError;
use ledgerlens_shared::types::{CompanyId, MoneyFormat};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/{company_id}/reports/general-ledger",
            get(get_general_ledger),
        )
        .route(
            "/companies/{company_id}/reports/financial/{report_name}",
            get(get_financial_report),
        )
        .route(
            "/companies/{company_id}/reports/financial/{report_name}/export",
            get(export_financial_report),
        )
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Report filter query parameters. ID lists are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Journal IDs.
    pub journals: Option<String>,
    /// Account IDs.
    pub accounts: Option<String>,
    /// Account tag IDs.
    pub account_tags: Option<String>,
    /// Analytic account IDs.
    pub analytics: Option<String>,
    /// Analytic tag IDs.
    pub analytic_tags: Option<String>,
    /// Operating unit IDs.
    pub operating_units: Option<String>,
    /// First included date.
    pub date_from: Option<NaiveDate>,
    /// Last included date.
    pub date_to: Option<NaiveDate>,
    /// `posted` or `all`.
    pub target_move: Option<TargetMove>,
    /// `all`, `movement` or `not_zero`.
    pub display_account: Option<DisplayMode>,
    /// `show` or `hide`.
    pub debit_credit: Option<DebitCredit>,
}

impl ReportQuery {
    /// Converts the parameters into a filter selection.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed ID or a reversed date range.
    pub fn into_selection(self) -> Result<FilterSelection, ApiError> {
        if let (Some(start), Some(end)) = (self.date_from, self.date_to)
            && start > end
        {
            return Err(ReportError::InvalidDateRange { start, end }.into());
        }

        Ok(FilterSelection {
            journal_ids: parse_id_list("journals", self.journals.as_deref())?,
            account_ids: parse_id_list("accounts", self.accounts.as_deref())?,
            account_tag_ids: parse_id_list("account_tags", self.account_tags.as_deref())?,
            analytic_ids: parse_id_list("analytics", self.analytics.as_deref())?,
            analytic_tag_ids: parse_id_list("analytic_tags", self.analytic_tags.as_deref())?,
            operating_unit_ids: parse_id_list("operating_units", self.operating_units.as_deref())?,
            date_from: self.date_from,
            date_to: self.date_to,
            target_move: self.target_move.unwrap_or_default(),
            display_account: self.display_account.unwrap_or_default(),
            debit_credit: self.debit_credit.unwrap_or_default(),
        })
    }
}

/// Parses a comma-separated UUID list. Blank entries are skipped.
fn parse_id_list<I: From<Uuid>>(field: &str, raw: Option<&str>) -> Result<Vec<I>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part).map(I::from).map_err(|_| {
                ApiError::from(AppError::Validation(format!("Invalid id in {field}: {part}")))
            })
        })
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_general_ledger(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<GeneralLedgerReport>, ApiError> {
    let selection = query.into_selection()?;
    let company_id = CompanyId::from(company_id);
    let repo = ReportRepository::new((*state.db).clone());

    let fallback = state.report.fallback_currency();
    let loaded = repo.load_catalog(company_id, &fallback).await?;
    let money = MoneyFormat::new(&loaded.currency);
    let resolved = resolve_filters(&selection, &loaded.catalog)?;
    if resolved.accounts.is_empty() {
        return Err(ReportError::NoAccountsFound.into());
    }

    let initial = repo.initial_balances(company_id, &resolved.query).await?;
    let lines = repo.query_lines(company_id, &resolved.query).await?;
    let report = ReportService::build_general_ledger(resolved, initial, lines, &money)?;

    Ok(Json(report))
}

async fn get_financial_report(
    State(state): State<AppState>,
    Path((company_id, report_name)): Path<(Uuid, String)>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<FinancialReport>, ApiError> {
    let report = load_financial_report(&state, company_id, &report_name, query).await?;
    Ok(Json(report))
}

async fn export_financial_report(
    State(state): State<AppState>,
    Path((company_id, report_name)): Path<(Uuid, String)>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = load_financial_report(&state, company_id, &report_name, query).await?;
    let csv = ReportService::export(&report).to_csv()?;

    info!(%company_id, report = %report.name, bytes = csv.len(), "Exported financial report");

    let disposition = format!("attachment; filename=\"{}.csv\"", file_stem(&report.name));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

async fn load_financial_report(
    state: &AppState,
    company_id: Uuid,
    report_name: &str,
    query: ReportQuery,
) -> Result<FinancialReport, ApiError> {
    let selection = query.into_selection()?;
    let company_id = CompanyId::from(company_id);
    let repo = ReportRepository::new((*state.db).clone());

    let fallback = state.report.fallback_currency();
    let loaded = repo.load_catalog(company_id, &fallback).await?;
    let money = MoneyFormat::new(&loaded.currency);
    let resolved = resolve_filters(&selection, &loaded.catalog)?;
    if resolved.accounts.is_empty() {
        return Err(ReportError::NoAccountsFound.into());
    }

    let defs = repo.load_report_lines().await?;
    let tree = defs.as_slice().load_tree(report_name)?;
    let lines = repo.query_lines(company_id, &resolved.query).await?;

    Ok(ReportService::build_financial_report(
        report_name,
        resolved,
        &tree,
        lines,
        &money,
    )?)
}

/// File name stem for an exported report: lowercase ASCII alphanumerics
/// joined by underscores.
fn file_stem(name: &str) -> String {
    let stem = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if stem.is_empty() {
        "report".to_string()
    } else {
        stem
    }
}
