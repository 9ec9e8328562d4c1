//! Ledger lines and the query predicate used to select them.
//!
//! `LedgerQuery` is the parameterized filter every ledger source honours.
//! Sources never receive raw SQL fragments; the database adapter translates
//! the same predicate into bound query conditions.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use ledgerlens_shared::types::{
    AccountId, AnalyticAccountId, AnalyticTagId, JournalId, LedgerLineId, MoveId, OperatingUnitId,
    round2,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use super::types::{MoveStatus, TargetMove};

/// Label of the synthetic opening line of an account.
pub const INITIAL_BALANCE_LABEL: &str = "Initial Balance";

/// One journal item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Line ID; `None` for synthetic initial-balance lines.
    pub id: Option<LedgerLineId>,
    /// Account posted to.
    pub account_id: AccountId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Journal entry.
    pub move_id: Option<MoveId>,
    /// Journal entry number.
    pub move_name: String,
    /// Line label.
    pub label: String,
    /// External reference.
    pub reference: Option<String>,
    /// Partner display name.
    pub partner_name: Option<String>,
    /// Journal.
    pub journal_id: Option<JournalId>,
    /// Journal short code.
    pub journal_code: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line balance; a running balance once merged.
    pub balance: Decimal,
    /// Analytic account.
    pub analytic_id: Option<AnalyticAccountId>,
    /// Analytic tags.
    pub analytic_tag_ids: BTreeSet<AnalyticTagId>,
    /// Operating unit.
    pub operating_unit_id: Option<OperatingUnitId>,
    /// State of the journal entry.
    pub move_status: MoveStatus,
}

impl LedgerLine {
    /// Builds the synthetic opening line of an account.
    ///
    /// `date` is the day before the report range starts.
    #[must_use]
    pub fn initial_balance(
        account_id: AccountId,
        date: NaiveDate,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        Self {
            id: None,
            account_id,
            date,
            move_id: None,
            move_name: String::new(),
            label: INITIAL_BALANCE_LABEL.to_string(),
            reference: None,
            partner_name: None,
            journal_id: None,
            journal_code: String::new(),
            debit,
            credit,
            balance: debit - credit,
            analytic_id: None,
            analytic_tag_ids: BTreeSet::new(),
            operating_unit_id: None,
            move_status: MoveStatus::Posted,
        }
    }

    /// Returns true for synthetic initial-balance lines.
    #[must_use]
    pub const fn is_initial_balance(&self) -> bool {
        self.id.is_none()
    }
}

/// Parameterized selection of ledger lines.
///
/// `None` on a dimension means "no restriction". `accounts` is always
/// explicit: it is the resolved account universe of the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerQuery {
    /// First included date.
    pub date_from: Option<NaiveDate>,
    /// Last included date.
    pub date_to: Option<NaiveDate>,
    /// Posted only, or draft and posted.
    pub target_move: TargetMove,
    /// Accounts to include.
    pub accounts: BTreeSet<AccountId>,
    /// Journals to include.
    pub journals: Option<BTreeSet<JournalId>>,
    /// Analytic accounts to include.
    pub analytics: Option<BTreeSet<AnalyticAccountId>>,
    /// Analytic tags; a line matches when it carries any of them.
    pub analytic_tags: Option<BTreeSet<AnalyticTagId>>,
    /// Operating units to include.
    pub operating_units: Option<BTreeSet<OperatingUnitId>>,
}

impl LedgerQuery {
    /// Returns true if `line` is selected by this query.
    #[must_use]
    pub fn matches(&self, line: &LedgerLine) -> bool {
        if !self.accounts.contains(&line.account_id) {
            return false;
        }
        if !self.target_move.accepts(line.move_status) {
            return false;
        }
        if self.date_from.is_some_and(|from| line.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| line.date > to) {
            return false;
        }
        if let Some(journals) = &self.journals
            && !line.journal_id.is_some_and(|j| journals.contains(&j))
        {
            return false;
        }
        if let Some(analytics) = &self.analytics
            && !line.analytic_id.is_some_and(|a| analytics.contains(&a))
        {
            return false;
        }
        if let Some(tags) = &self.analytic_tags
            && line.analytic_tag_ids.is_disjoint(tags)
        {
            return false;
        }
        if let Some(units) = &self.operating_units
            && !line.operating_unit_id.is_some_and(|u| units.contains(&u))
        {
            return false;
        }
        true
    }

    /// Query selecting everything strictly before `date_from`.
    ///
    /// Returns `None` when the query has no start date.
    #[must_use]
    pub fn before_range(&self) -> Option<Self> {
        let from = self.date_from?;
        Some(Self {
            date_from: None,
            date_to: from.pred_opt(),
            ..self.clone()
        })
    }
}

/// Source of ledger lines.
pub trait LedgerSource {
    /// Returns the lines matching `query`, ordered by date.
    fn query(&self, query: &LedgerQuery) -> Result<Vec<LedgerLine>, ReportError>;

    /// Returns one synthetic line per account holding the cumulative debit and
    /// credit posted before `query.date_from`. Empty when there is no start date.
    fn initial_balances(&self, query: &LedgerQuery) -> Result<Vec<LedgerLine>, ReportError>;
}

/// Ledger held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    lines: Vec<LedgerLine>,
}

impl InMemoryLedger {
    /// Creates a ledger from lines.
    #[must_use]
    pub const fn new(lines: Vec<LedgerLine>) -> Self {
        Self { lines }
    }

    /// Adds a line.
    pub fn push(&mut self, line: LedgerLine) {
        self.lines.push(line);
    }
}

impl LedgerSource for InMemoryLedger {
    fn query(&self, query: &LedgerQuery) -> Result<Vec<LedgerLine>, ReportError> {
        let mut lines: Vec<LedgerLine> = self
            .lines
            .iter()
            .filter(|line| query.matches(line))
            .cloned()
            .collect();
        lines.sort_by_key(|line| (line.date, line.id));
        Ok(lines)
    }

    fn initial_balances(&self, query: &LedgerQuery) -> Result<Vec<LedgerLine>, ReportError> {
        let (Some(before), Some(from)) = (query.before_range(), query.date_from) else {
            return Ok(Vec::new());
        };
        let opening_date = from.pred_opt().unwrap_or(from);

        let mut sums: BTreeMap<AccountId, (Decimal, Decimal)> = BTreeMap::new();
        for line in self.lines.iter().filter(|line| before.matches(line)) {
            let entry = sums.entry(line.account_id).or_default();
            entry.0 += line.debit;
            entry.1 += line.credit;
        }

        Ok(sums
            .into_iter()
            .map(|(account_id, (debit, credit))| {
                LedgerLine::initial_balance(account_id, opening_date, debit, credit)
            })
            .collect())
    }
}

/// Merges initial-balance lines and in-range lines per account, turning line
/// balances into running balances.
///
/// Each in-range line's balance is increased by the rounded sum of
/// `round(debit) - round(credit)` over the lines already merged for the same
/// account, initial-balance line included. Output keeps initial lines first,
/// then in-range lines in their original order.
#[must_use]
pub fn merge_running_balances(initial: Vec<LedgerLine>, lines: Vec<LedgerLine>) -> Vec<LedgerLine> {
    let mut running: HashMap<AccountId, Decimal> = HashMap::new();
    let mut merged = Vec::with_capacity(initial.len() + lines.len());

    for line in initial {
        *running.entry(line.account_id).or_default() += round2(line.debit) - round2(line.credit);
        merged.push(line);
    }

    for mut line in lines {
        let previous = running.entry(line.account_id).or_default();
        line.balance += round2(*previous);
        *previous += round2(line.debit) - round2(line.credit);
        merged.push(line);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn line(account_id: AccountId, day: u32, debit: Decimal, credit: Decimal) -> LedgerLine {
        LedgerLine {
            id: Some(LedgerLineId::new()),
            account_id,
            date: date(day),
            move_id: Some(MoveId::new()),
            move_name: format!("MISC/2024/{day:04}"),
            label: "Line".to_string(),
            reference: None,
            partner_name: None,
            journal_id: None,
            journal_code: "MISC".to_string(),
            debit,
            credit,
            balance: debit - credit,
            analytic_id: None,
            analytic_tag_ids: BTreeSet::new(),
            operating_unit_id: None,
            move_status: MoveStatus::Posted,
        }
    }

    fn query_for(accounts: &[AccountId]) -> LedgerQuery {
        LedgerQuery {
            accounts: accounts.iter().copied().collect(),
            ..LedgerQuery::default()
        }
    }

    #[test]
    fn test_query_restricts_accounts_and_dates() {
        let cash = AccountId::new();
        let bank = AccountId::new();
        let ledger = InMemoryLedger::new(vec![
            line(cash, 1, dec!(10), dec!(0)),
            line(cash, 10, dec!(20), dec!(0)),
            line(cash, 20, dec!(30), dec!(0)),
            line(bank, 10, dec!(40), dec!(0)),
        ]);

        let query = LedgerQuery {
            date_from: Some(date(5)),
            date_to: Some(date(15)),
            ..query_for(&[cash])
        };
        let lines = ledger.query(&query).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].debit, dec!(20));
    }

    #[test]
    fn test_query_posted_only_skips_drafts() {
        let cash = AccountId::new();
        let mut draft = line(cash, 2, dec!(5), dec!(0));
        draft.move_status = MoveStatus::Draft;
        let ledger = InMemoryLedger::new(vec![draft, line(cash, 3, dec!(7), dec!(0))]);

        let posted = ledger.query(&query_for(&[cash])).unwrap();
        assert_eq!(posted.len(), 1);

        let all = LedgerQuery {
            target_move: TargetMove::All,
            ..query_for(&[cash])
        };
        assert_eq!(ledger.query(&all).unwrap().len(), 2);
    }

    #[test]
    fn test_query_dimension_filters() {
        let cash = AccountId::new();
        let journal = JournalId::new();
        let analytic = AnalyticAccountId::new();
        let tag = AnalyticTagId::new();
        let unit = OperatingUnitId::new();

        let mut tagged = line(cash, 4, dec!(1), dec!(0));
        tagged.journal_id = Some(journal);
        tagged.analytic_id = Some(analytic);
        tagged.analytic_tag_ids.insert(tag);
        tagged.operating_unit_id = Some(unit);
        let untagged = line(cash, 5, dec!(2), dec!(0));
        let ledger = InMemoryLedger::new(vec![tagged, untagged]);

        for query in [
            LedgerQuery {
                journals: Some([journal].into()),
                ..query_for(&[cash])
            },
            LedgerQuery {
                analytics: Some([analytic].into()),
                ..query_for(&[cash])
            },
            LedgerQuery {
                analytic_tags: Some([tag].into()),
                ..query_for(&[cash])
            },
            LedgerQuery {
                operating_units: Some([unit].into()),
                ..query_for(&[cash])
            },
        ] {
            let lines = ledger.query(&query).unwrap();
            assert_eq!(lines.len(), 1);
            assert_eq!(lines[0].debit, dec!(1));
        }
    }

    #[test]
    fn test_initial_balances_sum_before_range() {
        let cash = AccountId::new();
        let ledger = InMemoryLedger::new(vec![
            line(cash, 1, dec!(100), dec!(0)),
            line(cash, 2, dec!(0), dec!(30)),
            line(cash, 10, dec!(5), dec!(0)),
        ]);
        let query = LedgerQuery {
            date_from: Some(date(10)),
            ..query_for(&[cash])
        };

        let initial = ledger.initial_balances(&query).unwrap();

        assert_eq!(initial.len(), 1);
        assert!(initial[0].is_initial_balance());
        assert_eq!(initial[0].label, INITIAL_BALANCE_LABEL);
        assert_eq!(initial[0].date, date(9));
        assert_eq!(initial[0].debit, dec!(100));
        assert_eq!(initial[0].credit, dec!(30));
        assert_eq!(initial[0].balance, dec!(70));
    }

    #[test]
    fn test_initial_balances_empty_without_start_date() {
        let cash = AccountId::new();
        let ledger = InMemoryLedger::new(vec![line(cash, 1, dec!(100), dec!(0))]);
        let opening = ledger.initial_balances(&query_for(&[cash])).unwrap();
        assert!(opening.is_empty());
    }

    #[test]
    fn test_merge_running_balances() {
        let cash = AccountId::new();
        let bank = AccountId::new();
        let initial = vec![LedgerLine::initial_balance(cash, date(1), dec!(70), dec!(0))];
        let lines = vec![
            line(cash, 2, dec!(10), dec!(0)),
            line(bank, 2, dec!(0), dec!(5)),
            line(cash, 3, dec!(0), dec!(25.005)),
        ];

        let merged = merge_running_balances(initial, lines);

        let balances: Vec<Decimal> = merged.iter().map(|l| l.balance).collect();
        assert_eq!(balances, vec![dec!(70), dec!(80), dec!(-5), dec!(54.995)]);
    }
}
