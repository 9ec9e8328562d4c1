//! Tests for report repository row mapping.
//!
//! Queries are exercised against PostgreSQL in `tests/report_repository_test.rs`.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use ledgerlens_shared::types::MoneyFormat;
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::*;
use crate::entities::sea_orm_active_enums::CurrencyPosition;

fn report_row(
    id: Uuid,
    parent_id: Option<Uuid>,
    name: &str,
    sequence: i32,
    report_type: db_enums::ReportLineType,
) -> financial_report_lines::Model {
    financial_report_lines::Model {
        id,
        parent_id,
        name: name.to_string(),
        sequence,
        report_type,
        report_reference_id: None,
        sign: 1,
        style: db_enums::ReportLineStyle::Automatic,
        display_detail: db_enums::DisplayDetail::DetailFlat,
    }
}

fn account_model(code: &str, currency_code: Option<&str>) -> accounts::Model {
    accounts::Model {
        id: Uuid::now_v7(),
        company_id: Uuid::now_v7(),
        code: code.to_string(),
        name: format!("Account {code}"),
        account_type_id: None,
        currency_code: currency_code.map(str::to_string),
        is_active: true,
    }
}

// ============================================================================
// Currencies
// ============================================================================

fn currency_row(
    code: &str,
    symbol: &str,
    position: CurrencyPosition,
    rounding: Decimal,
) -> currencies::Model {
    currencies::Model {
        code: code.to_string(),
        name: code.to_string(),
        symbol: symbol.to_string(),
        position,
        rounding,
    }
}

fn known() -> BTreeMap<String, Currency> {
    index_currencies(vec![
        currency_row("GBP", "£", CurrencyPosition::Before, dec!(0.01)),
        currency_row("IDR", "Rp", CurrencyPosition::Before, dec!(1)),
        currency_row("EUR", "€", CurrencyPosition::After, dec!(0.01)),
    ])
}

fn fallback() -> Currency {
    Currency::usd()
}

#[rstest]
#[case(None, "USD")]
#[case(Some(""), "USD")]
#[case(Some("  "), "USD")]
#[case(Some("GBP"), "GBP")]
#[case(Some("idr"), "IDR")]
#[case(Some("XXX"), "USD")]
fn test_resolve_currency(#[case] code: Option<&str>, #[case] expected: &str) {
    assert_eq!(resolve_currency(code, &known(), &fallback()).code, expected);
}

#[test]
fn test_stored_currency_keeps_symbol_and_position() {
    let gbp = resolve_currency(Some("GBP"), &known(), &fallback());
    assert_eq!(MoneyFormat::new(&gbp).format(dec!(1234.5)), "£ 1,234.50");

    let eur = resolve_currency(Some("EUR"), &known(), &fallback());
    assert_eq!(eur.position, SymbolPosition::After);
    assert_eq!(MoneyFormat::new(&eur).format(dec!(-3)), "-3.00 €");
}

#[test]
fn test_stored_rounding_sets_zero_tolerance() {
    let idr = resolve_currency(Some("IDR"), &known(), &fallback());
    assert_eq!(idr.rounding, dec!(1));
    assert!(idr.is_zero(dec!(0.4)));
    assert!(!idr.is_zero(dec!(0.5)));
}

#[test]
fn test_currency_from_model_trims_padded_code() {
    let row = currency_row("CHF ", "CHF", CurrencyPosition::Before, dec!(0.05));
    let currency = currency_from_model(row);
    assert_eq!(currency.code, "CHF");
    assert_eq!(currency.rounding, dec!(0.05));
}

#[test]
fn test_account_info_uses_company_currency_when_unset() {
    let tags: BTreeSet<AccountTagId> = [AccountTagId::new()].into_iter().collect();
    let company = resolve_currency(Some("IDR"), &known(), &fallback());
    let info = account_info(
        account_model("101000", None),
        tags.clone(),
        &known(),
        &company,
    );

    assert_eq!(info.code, "101000");
    assert_eq!(info.name, "Account 101000");
    assert_eq!(info.currency.code, "IDR");
    assert_eq!(info.tag_ids, tags);
    assert!(info.account_type_id.is_none());
}

#[test]
fn test_account_info_keeps_own_currency() {
    let info = account_info(
        account_model("102000", Some("EUR")),
        BTreeSet::new(),
        &known(),
        &fallback(),
    );
    assert_eq!(info.currency.code, "EUR");
    assert_eq!(info.currency.symbol, "€");
}

// ============================================================================
// Enum mapping
// ============================================================================

#[rstest]
#[case(1, Sign::Positive)]
#[case(0, Sign::Positive)]
#[case(-1, Sign::Negative)]
#[case(-5, Sign::Negative)]
fn test_sign_from_db(#[case] stored: i16, #[case] expected: Sign) {
    assert_eq!(sign_from_db(stored), expected);
}

#[rstest]
#[case(db_enums::ReportLineType::Sum, LineKind::AggregateNode)]
#[case(db_enums::ReportLineType::Accounts, LineKind::AccountSet)]
#[case(db_enums::ReportLineType::AccountType, LineKind::AccountTypeSet)]
#[case(db_enums::ReportLineType::AccountReport, LineKind::ReportReference)]
fn test_line_kind_mapping(#[case] stored: db_enums::ReportLineType, #[case] expected: LineKind) {
    assert_eq!(LineKind::from(stored), expected);
}

#[test]
fn test_move_state_mapping() {
    assert_eq!(MoveStatus::from(MoveState::Draft), MoveStatus::Draft);
    assert_eq!(MoveStatus::from(MoveState::Posted), MoveStatus::Posted);
}

#[test]
fn test_style_and_detail_mapping() {
    assert_eq!(
        LineStyle::from(db_enums::ReportLineStyle::MainTitle),
        LineStyle::MainTitle
    );
    assert_eq!(
        LineStyle::from(db_enums::ReportLineStyle::Smallest),
        LineStyle::Smallest
    );
    assert_eq!(
        DisplayDetail::from(db_enums::DisplayDetail::NoDetail),
        DisplayDetail::NoDetail
    );
    assert_eq!(
        DisplayDetail::from(db_enums::DisplayDetail::DetailWithHierarchy),
        DisplayDetail::DetailWithHierarchy
    );
    assert_eq!(
        SymbolPosition::from(CurrencyPosition::After),
        SymbolPosition::After
    );
}

// ============================================================================
// Report line definitions
// ============================================================================

#[test]
fn test_build_report_line_defs_attaches_bindings() {
    let root = Uuid::now_v7();
    let assets = Uuid::now_v7();
    let income = Uuid::now_v7();
    let cash = Uuid::now_v7();
    let bank = Uuid::now_v7();
    let revenue_type = Uuid::now_v7();

    let mut assets_row = report_row(
        assets,
        Some(root),
        "Assets",
        1,
        db_enums::ReportLineType::Accounts,
    );
    assets_row.style = db_enums::ReportLineStyle::Title;
    assets_row.display_detail = db_enums::DisplayDetail::NoDetail;
    let mut income_row = report_row(
        income,
        Some(root),
        "Income",
        2,
        db_enums::ReportLineType::AccountType,
    );
    income_row.sign = -1;

    let rows = vec![
        report_row(
            root,
            None,
            "Balance Sheet",
            0,
            db_enums::ReportLineType::Sum,
        ),
        assets_row,
        income_row,
    ];
    let account_links = vec![
        report_line_accounts::Model {
            report_line_id: assets,
            account_id: cash,
        },
        report_line_accounts::Model {
            report_line_id: assets,
            account_id: bank,
        },
    ];
    let type_links = vec![report_line_account_types::Model {
        report_line_id: income,
        account_type_id: revenue_type,
    }];

    let defs = build_report_line_defs(rows, account_links, type_links);

    assert_eq!(defs.len(), 3);
    assert_eq!(defs[0].kind, LineKind::AggregateNode);
    assert!(defs[0].parent_id.is_none());
    assert!(defs[0].account_ids.is_empty());

    assert_eq!(defs[1].parent_id, Some(ReportLineId::from(root)));
    assert_eq!(
        defs[1].account_ids,
        vec![AccountId::from(cash), AccountId::from(bank)]
    );
    assert_eq!(defs[1].style, LineStyle::Title);
    assert_eq!(defs[1].display_detail, DisplayDetail::NoDetail);
    assert_eq!(defs[1].sign, Sign::Positive);

    assert_eq!(
        defs[2].account_type_ids,
        vec![AccountTypeId::from(revenue_type)]
    );
    assert_eq!(defs[2].sign, Sign::Negative);
}

#[test]
fn test_build_report_line_defs_keeps_reference() {
    let target = Uuid::now_v7();
    let reference = Uuid::now_v7();
    let mut row = report_row(
        reference,
        None,
        "Net Profit",
        3,
        db_enums::ReportLineType::AccountReport,
    );
    row.report_reference_id = Some(target);

    let defs = build_report_line_defs(vec![row], Vec::new(), Vec::new());

    assert_eq!(defs[0].kind, LineKind::ReportReference);
    assert_eq!(
        defs[0].report_reference_id,
        Some(ReportLineId::from(target))
    );
}

// ============================================================================
// Ledger lines
// ============================================================================

#[test]
fn test_ledger_line_maps_row() {
    let row = MoveLineRow {
        id: Uuid::now_v7(),
        account_id: Uuid::now_v7(),
        journal_id: Uuid::now_v7(),
        move_id: Uuid::now_v7(),
        date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        name: None,
        reference: Some("INV/0001".to_string()),
        partner_name: Some("Azure Interior".to_string()),
        debit: dec!(120.50),
        credit: Decimal::ZERO,
        balance: dec!(120.50),
        analytic_account_id: None,
        operating_unit_id: Some(Uuid::now_v7()),
        move_name: "MISC/2024/0001".to_string(),
        move_state: MoveState::Draft,
        journal_code: "MISC".to_string(),
    };
    let tags: BTreeSet<AnalyticTagId> = [AnalyticTagId::new()].into_iter().collect();

    let line = ledger_line(row, tags.clone());

    assert!(!line.is_initial_balance());
    assert_eq!(line.label, "");
    assert_eq!(line.move_name, "MISC/2024/0001");
    assert_eq!(line.journal_code, "MISC");
    assert_eq!(line.move_status, MoveStatus::Draft);
    assert_eq!(line.analytic_tag_ids, tags);
    assert!(line.analytic_id.is_none());
    assert!(line.operating_unit_id.is_some());
}

#[test]
fn test_group_line_tags() {
    let line = Uuid::now_v7();
    let other = Uuid::now_v7();
    let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
    let links = vec![
        move_line_analytic_tags::Model {
            move_line_id: line,
            analytic_tag_id: a,
        },
        move_line_analytic_tags::Model {
            move_line_id: line,
            analytic_tag_id: b,
        },
        move_line_analytic_tags::Model {
            move_line_id: other,
            analytic_tag_id: a,
        },
    ];

    let grouped = group_line_tags(links);

    assert_eq!(grouped[&line].len(), 2);
    assert_eq!(grouped[&other].len(), 1);
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Opening lines carry balance = debit - credit and no line id.
    #[test]
    fn prop_opening_line_balance(debit in amount_strategy(), credit in amount_strategy()) {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let row = OpeningRow {
            account_id: Uuid::now_v7(),
            debit: Some(debit),
            credit: Some(credit),
        };

        let line = opening_line(row, date);

        prop_assert!(line.is_initial_balance());
        prop_assert_eq!(line.balance, debit - credit);
        prop_assert_eq!(line.date, date);
    }

    /// Missing sums read as zero.
    #[test]
    fn prop_opening_line_null_sums(debit in amount_strategy()) {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let row = OpeningRow {
            account_id: Uuid::now_v7(),
            debit: Some(debit),
            credit: None,
        };

        let line = opening_line(row, date);

        prop_assert_eq!(line.credit, Decimal::ZERO);
        prop_assert_eq!(line.balance, debit);
    }
}
