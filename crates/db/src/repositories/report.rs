//! Report repository feeding the reporting engine.
//!
//! Loads the filter catalog of a company, the ledger lines selected by a
//! `LedgerQuery`, opening balances and report line definitions. All report
//! computation happens in `ledgerlens_core::reports`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use ledgerlens_core::reports::{
    AccountInfo, DisplayDetail, FilterCatalog, LedgerLine, LedgerQuery, LineKind, LineStyle,
    MoveStatus, NamedOption, ReportLineDef, Sign, TargetMove,
};
use ledgerlens_shared::types::{
    AccountId, AccountTagId, AccountTypeId, AnalyticAccountId, AnalyticTagId, CompanyId, Currency,
    JournalId, LedgerLineId, MoveId, OperatingUnitId, ReportLineId, SymbolPosition,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::{
    account_account_tags, account_tags, accounts, analytic_accounts, analytic_tags, companies,
    currencies, financial_report_lines, journals, move_line_analytic_tags, move_lines, moves,
    operating_units, report_line_account_types, report_line_accounts,
    sea_orm_active_enums::{self as db_enums, MoveState},
};

/// Error types for report repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Company not found.
    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filter catalog of a company together with its currency.
#[derive(Debug, Clone)]
pub struct CompanyCatalog {
    /// Records the report filters choose from.
    pub catalog: FilterCatalog,
    /// Company currency as stored, or the configured fallback.
    pub currency: Currency,
}

/// Move line joined with its journal entry and journal.
#[derive(Debug, FromQueryResult)]
struct MoveLineRow {
    id: Uuid,
    account_id: Uuid,
    journal_id: Uuid,
    move_id: Uuid,
    date: NaiveDate,
    name: Option<String>,
    reference: Option<String>,
    partner_name: Option<String>,
    debit: Decimal,
    credit: Decimal,
    balance: Decimal,
    analytic_account_id: Option<Uuid>,
    operating_unit_id: Option<Uuid>,
    // Aliased
    move_name: String,
    move_state: MoveState,
    journal_code: String,
}

/// Per-account sums before the report range.
#[derive(Debug, FromQueryResult)]
struct OpeningRow {
    account_id: Uuid,
    debit: Option<Decimal>,
    credit: Option<Decimal>,
}

/// Report repository for the reporting engine's reads.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Filter catalog
    // ========================================================================

    /// Loads the records report filters of `company_id` choose from.
    ///
    /// Currencies are read from the `currencies` table. Accounts without a
    /// currency use the company currency; a company without one, or with a
    /// code missing from the table, uses `fallback`.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` for an unknown company, or a database error.
    pub async fn load_catalog(
        &self,
        company_id: CompanyId,
        fallback: &Currency,
    ) -> Result<CompanyCatalog, RepositoryError> {
        let company_uuid = company_id.into_inner();
        let company = companies::Entity::find_by_id(company_uuid)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::CompanyNotFound(company_id))?;

        let account_models = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_uuid))
            .filter(accounts::Column::IsActive.eq(true))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        let codes: BTreeSet<String> = std::iter::once(company.currency_code.as_deref())
            .chain(account_models.iter().map(|a| a.currency_code.as_deref()))
            .filter_map(normalize_code)
            .collect();
        let known = if codes.is_empty() {
            BTreeMap::new()
        } else {
            index_currencies(
                currencies::Entity::find()
                    .filter(currencies::Column::Code.is_in(codes))
                    .all(&self.db)
                    .await?,
            )
        };
        let currency = resolve_currency(company.currency_code.as_deref(), &known, fallback);

        let account_uuids: Vec<Uuid> = account_models.iter().map(|a| a.id).collect();
        let tag_links = if account_uuids.is_empty() {
            Vec::new()
        } else {
            account_account_tags::Entity::find()
                .filter(account_account_tags::Column::AccountId.is_in(account_uuids))
                .all(&self.db)
                .await?
        };
        let mut tags_by_account = group_account_tags(tag_links);

        let accounts = account_models
            .into_iter()
            .map(|model| {
                let tags = tags_by_account.remove(&model.id).unwrap_or_default();
                account_info(model, tags, &known, &currency)
            })
            .collect();

        let journals = journals::Entity::find()
            .filter(journals::Column::CompanyId.eq(company_uuid))
            .order_by_asc(journals::Column::Code)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|j| NamedOption::with_code(JournalId::from(j.id), j.name, j.code))
            .collect();

        let account_tags = account_tags::Entity::find()
            .order_by_asc(account_tags::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| NamedOption::new(AccountTagId::from(t.id), t.name))
            .collect();

        let analytic_accounts = analytic_accounts::Entity::find()
            .filter(analytic_accounts::Column::CompanyId.eq(company_uuid))
            .order_by_asc(analytic_accounts::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| NamedOption::new(AnalyticAccountId::from(a.id), a.name))
            .collect();

        // Tags without a company are shared
        let analytic_tags = analytic_tags::Entity::find()
            .filter(
                Condition::any()
                    .add(analytic_tags::Column::CompanyId.eq(company_uuid))
                    .add(analytic_tags::Column::CompanyId.is_null()),
            )
            .order_by_asc(analytic_tags::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| NamedOption::new(AnalyticTagId::from(t.id), t.name))
            .collect();

        let operating_units = operating_units::Entity::find()
            .filter(operating_units::Column::CompanyId.eq(company_uuid))
            .order_by_asc(operating_units::Column::Code)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| NamedOption::with_code(OperatingUnitId::from(u.id), u.name, u.code))
            .collect();

        Ok(CompanyCatalog {
            catalog: FilterCatalog {
                company_id,
                company_name: company.name,
                journals,
                accounts,
                account_tags,
                analytic_accounts,
                analytic_tags,
                operating_units,
            },
            currency,
        })
    }

    // ========================================================================
    // Ledger lines
    // ========================================================================

    /// Queries the move lines of `company_id` selected by `query`, ordered by
    /// date then creation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn query_lines(
        &self,
        company_id: CompanyId,
        query: &LedgerQuery,
    ) -> Result<Vec<LedgerLine>, RepositoryError> {
        if query.accounts.is_empty() {
            return Ok(Vec::new());
        }

        let select = move_lines::Entity::find()
            .join(JoinType::InnerJoin, move_lines::Relation::Moves.def())
            .join(JoinType::InnerJoin, move_lines::Relation::Journals.def())
            .column_as(moves::Column::Name, "move_name")
            .column_as(moves::Column::State, "move_state")
            .column_as(journals::Column::Code, "journal_code");

        let rows: Vec<MoveLineRow> = apply_query(select, company_id, query)
            .order_by_asc(move_lines::Column::Date)
            .order_by_asc(move_lines::Column::CreatedAt)
            .order_by_asc(move_lines::Column::Id)
            .into_model::<MoveLineRow>()
            .all(&self.db)
            .await?;

        let line_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let tag_links = if line_ids.is_empty() {
            Vec::new()
        } else {
            move_line_analytic_tags::Entity::find()
                .filter(move_line_analytic_tags::Column::MoveLineId.is_in(line_ids))
                .all(&self.db)
                .await?
        };
        let mut tags_by_line = group_line_tags(tag_links);

        debug!(%company_id, lines = rows.len(), "Loaded move lines");

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = tags_by_line.remove(&row.id).unwrap_or_default();
                ledger_line(row, tags)
            })
            .collect())
    }

    /// Sums debit and credit per account over every line selected by `query`
    /// but dated before `query.date_from`. One synthetic line per account,
    /// dated the day before the range; empty without a start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn initial_balances(
        &self,
        company_id: CompanyId,
        query: &LedgerQuery,
    ) -> Result<Vec<LedgerLine>, RepositoryError> {
        let (Some(before), Some(from)) = (query.before_range(), query.date_from) else {
            return Ok(Vec::new());
        };
        if before.accounts.is_empty() {
            return Ok(Vec::new());
        }
        let opening_date = from.pred_opt().unwrap_or(from);

        let select = move_lines::Entity::find()
            .select_only()
            .column(move_lines::Column::AccountId)
            .column_as(move_lines::Column::Debit.sum(), "debit")
            .column_as(move_lines::Column::Credit.sum(), "credit")
            .join(JoinType::InnerJoin, move_lines::Relation::Moves.def());

        let rows: Vec<OpeningRow> = apply_query(select, company_id, &before)
            .group_by(move_lines::Column::AccountId)
            .into_model::<OpeningRow>()
            .all(&self.db)
            .await?;

        debug!(%company_id, accounts = rows.len(), %opening_date, "Loaded initial balances");

        Ok(rows
            .into_iter()
            .map(|row| opening_line(row, opening_date))
            .collect())
    }

    // ========================================================================
    // Report definitions
    // ========================================================================

    /// Loads every stored report line with its account and account-type
    /// bindings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_report_lines(&self) -> Result<Vec<ReportLineDef>, RepositoryError> {
        let rows = financial_report_lines::Entity::find()
            .order_by_asc(financial_report_lines::Column::Sequence)
            .all(&self.db)
            .await?;
        let account_links = report_line_accounts::Entity::find().all(&self.db).await?;
        let type_links = report_line_account_types::Entity::find()
            .all(&self.db)
            .await?;

        Ok(build_report_line_defs(rows, account_links, type_links))
    }
}

/// Applies the company and `LedgerQuery` predicates to a move line select.
/// The select must already join `moves`.
fn apply_query(
    mut select: Select<move_lines::Entity>,
    company_id: CompanyId,
    query: &LedgerQuery,
) -> Select<move_lines::Entity> {
    let accounts = uuids(&query.accounts, AccountId::into_inner);
    select = select
        .filter(move_lines::Column::CompanyId.eq(company_id.into_inner()))
        .filter(move_lines::Column::AccountId.is_in(accounts));

    if matches!(query.target_move, TargetMove::Posted) {
        select = select.filter(moves::Column::State.eq(MoveState::Posted));
    }
    if let Some(from) = query.date_from {
        select = select.filter(move_lines::Column::Date.gte(from));
    }
    if let Some(to) = query.date_to {
        select = select.filter(move_lines::Column::Date.lte(to));
    }
    if let Some(journals) = &query.journals {
        let journals = uuids(journals, JournalId::into_inner);
        select = select.filter(move_lines::Column::JournalId.is_in(journals));
    }
    if let Some(analytics) = &query.analytics {
        select = select.filter(
            move_lines::Column::AnalyticAccountId
                .is_in(uuids(analytics, AnalyticAccountId::into_inner)),
        );
    }
    if let Some(units) = &query.operating_units {
        select = select.filter(
            move_lines::Column::OperatingUnitId.is_in(uuids(units, OperatingUnitId::into_inner)),
        );
    }
    if let Some(tags) = &query.analytic_tags {
        select = select.filter(
            move_lines::Column::Id.in_subquery(
                Query::select()
                    .column(move_line_analytic_tags::Column::MoveLineId)
                    .from(move_line_analytic_tags::Entity)
                    .and_where(
                        Expr::col(move_line_analytic_tags::Column::AnalyticTagId)
                            .is_in(uuids(tags, AnalyticTagId::into_inner)),
                    )
                    .to_owned(),
            ),
        );
    }

    select
}

fn uuids<I: Copy>(ids: &BTreeSet<I>, into_inner: fn(I) -> Uuid) -> Vec<Uuid> {
    ids.iter().copied().map(into_inner).collect()
}

fn normalize_code(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase)
}

fn currency_from_model(model: currencies::Model) -> Currency {
    Currency::new(
        model.code,
        model.symbol,
        model.position.into(),
        model.rounding,
    )
}

fn index_currencies(models: Vec<currencies::Model>) -> BTreeMap<String, Currency> {
    models
        .into_iter()
        .map(currency_from_model)
        .map(|currency| (currency.code.clone(), currency))
        .collect()
}

/// Looks up a stored currency code, falling back when absent or unknown.
fn resolve_currency(
    code: Option<&str>,
    known: &BTreeMap<String, Currency>,
    fallback: &Currency,
) -> Currency {
    let Some(code) = normalize_code(code) else {
        return fallback.clone();
    };
    known.get(&code).cloned().unwrap_or_else(|| {
        warn!(%code, fallback = %fallback, "Currency not found, using fallback");
        fallback.clone()
    })
}

fn group_account_tags(
    links: Vec<account_account_tags::Model>,
) -> BTreeMap<Uuid, BTreeSet<AccountTagId>> {
    let mut grouped: BTreeMap<Uuid, BTreeSet<AccountTagId>> = BTreeMap::new();
    for link in links {
        grouped
            .entry(link.account_id)
            .or_default()
            .insert(AccountTagId::from(link.account_tag_id));
    }
    grouped
}

fn group_line_tags(
    links: Vec<move_line_analytic_tags::Model>,
) -> BTreeMap<Uuid, BTreeSet<AnalyticTagId>> {
    let mut grouped: BTreeMap<Uuid, BTreeSet<AnalyticTagId>> = BTreeMap::new();
    for link in links {
        grouped
            .entry(link.move_line_id)
            .or_default()
            .insert(AnalyticTagId::from(link.analytic_tag_id));
    }
    grouped
}

fn account_info(
    model: accounts::Model,
    tag_ids: BTreeSet<AccountTagId>,
    known: &BTreeMap<String, Currency>,
    company_currency: &Currency,
) -> AccountInfo {
    AccountInfo {
        id: AccountId::from(model.id),
        currency: resolve_currency(model.currency_code.as_deref(), known, company_currency),
        code: model.code,
        name: model.name,
        account_type_id: model.account_type_id.map(AccountTypeId::from),
        tag_ids,
    }
}

fn ledger_line(row: MoveLineRow, analytic_tag_ids: BTreeSet<AnalyticTagId>) -> LedgerLine {
    LedgerLine {
        id: Some(LedgerLineId::from(row.id)),
        account_id: AccountId::from(row.account_id),
        date: row.date,
        move_id: Some(MoveId::from(row.move_id)),
        move_name: row.move_name,
        label: row.name.unwrap_or_default(),
        reference: row.reference,
        partner_name: row.partner_name,
        journal_id: Some(JournalId::from(row.journal_id)),
        journal_code: row.journal_code,
        debit: row.debit,
        credit: row.credit,
        balance: row.balance,
        analytic_id: row.analytic_account_id.map(AnalyticAccountId::from),
        analytic_tag_ids,
        operating_unit_id: row.operating_unit_id.map(OperatingUnitId::from),
        move_status: row.move_state.into(),
    }
}

fn opening_line(row: OpeningRow, opening_date: NaiveDate) -> LedgerLine {
    LedgerLine::initial_balance(
        AccountId::from(row.account_id),
        opening_date,
        row.debit.unwrap_or_default(),
        row.credit.unwrap_or_default(),
    )
}

/// Assembles report line definitions from stored rows and their bindings.
fn build_report_line_defs(
    rows: Vec<financial_report_lines::Model>,
    account_links: Vec<report_line_accounts::Model>,
    type_links: Vec<report_line_account_types::Model>,
) -> Vec<ReportLineDef> {
    let mut accounts_by_line: BTreeMap<Uuid, Vec<AccountId>> = BTreeMap::new();
    for link in account_links {
        accounts_by_line
            .entry(link.report_line_id)
            .or_default()
            .push(AccountId::from(link.account_id));
    }
    let mut types_by_line: BTreeMap<Uuid, Vec<AccountTypeId>> = BTreeMap::new();
    for link in type_links {
        types_by_line
            .entry(link.report_line_id)
            .or_default()
            .push(AccountTypeId::from(link.account_type_id));
    }

    rows.into_iter()
        .map(|row| {
            let mut def = ReportLineDef::new(
                ReportLineId::from(row.id),
                row.parent_id.map(ReportLineId::from),
                row.name,
                row.sequence,
                row.report_type.into(),
            );
            def.account_ids = accounts_by_line.remove(&row.id).unwrap_or_default();
            def.account_type_ids = types_by_line.remove(&row.id).unwrap_or_default();
            def.report_reference_id = row.report_reference_id.map(ReportLineId::from);
            def.sign = sign_from_db(row.sign);
            def.style = row.style.into();
            def.display_detail = row.display_detail.into();
            def
        })
        .collect()
}

const fn sign_from_db(sign: i16) -> Sign {
    if sign < 0 {
        Sign::Negative
    } else {
        Sign::Positive
    }
}

// ============================================================================
// Enum conversions
// ============================================================================

impl From<MoveState> for MoveStatus {
    fn from(state: MoveState) -> Self {
        match state {
            MoveState::Draft => Self::Draft,
            MoveState::Posted => Self::Posted,
        }
    }
}

impl From<db_enums::ReportLineType> for LineKind {
    fn from(kind: db_enums::ReportLineType) -> Self {
        match kind {
            db_enums::ReportLineType::Sum => Self::AggregateNode,
            db_enums::ReportLineType::Accounts => Self::AccountSet,
            db_enums::ReportLineType::AccountType => Self::AccountTypeSet,
            db_enums::ReportLineType::AccountReport => Self::ReportReference,
        }
    }
}

impl From<db_enums::ReportLineStyle> for LineStyle {
    fn from(style: db_enums::ReportLineStyle) -> Self {
        match style {
            db_enums::ReportLineStyle::Automatic => Self::Automatic,
            db_enums::ReportLineStyle::MainTitle => Self::MainTitle,
            db_enums::ReportLineStyle::Title => Self::Title,
            db_enums::ReportLineStyle::Subtitle => Self::Subtitle,
            db_enums::ReportLineStyle::Normal => Self::Normal,
            db_enums::ReportLineStyle::Italic => Self::Italic,
            db_enums::ReportLineStyle::Smallest => Self::Smallest,
        }
    }
}

impl From<db_enums::CurrencyPosition> for SymbolPosition {
    fn from(position: db_enums::CurrencyPosition) -> Self {
        match position {
            db_enums::CurrencyPosition::Before => Self::Before,
            db_enums::CurrencyPosition::After => Self::After,
        }
    }
}

impl From<db_enums::DisplayDetail> for DisplayDetail {
    fn from(detail: db_enums::DisplayDetail) -> Self {
        match detail {
            db_enums::DisplayDetail::NoDetail => Self::NoDetail,
            db_enums::DisplayDetail::DetailFlat => Self::DetailFlat,
            db_enums::DisplayDetail::DetailWithHierarchy => Self::DetailWithHierarchy,
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
