//! Tree rollup: binds account aggregates to report lines and sums them upward.
//!
//! Each invocation materializes a fresh arena of rows: one per report line,
//! plus one account row per aggregated account under account-set and
//! account-type-set lines. Sums propagate level by level from the deepest
//! level up, so unbalanced trees roll up completely.

use std::collections::{BTreeMap, HashMap};

use ledgerlens_shared::types::{AccountId, MoneyFormat, ReportLineId, round2};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tree::{LineKind, LineStyle, ReportTree, Sign};
use super::types::AccountAggregate;

/// Whether a result row is a report line or an account under one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowType {
    /// Configured report line.
    Report,
    /// Account row under an account-set or account-type-set line.
    Account,
}

/// One row of a rolled-up financial report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResultLine {
    /// Report line ID; for account rows, the owning line.
    pub report_line_id: ReportLineId,
    /// Account of an account row.
    pub account_id: Option<AccountId>,
    /// Account code of an account row.
    pub account_code: Option<String>,
    /// Parent report line.
    pub parent_id: Option<ReportLineId>,
    /// Retained child report lines.
    pub children_ids: Vec<ReportLineId>,
    /// Display name.
    pub name: String,
    /// Depth; roots are level 0.
    pub level: u32,
    /// Kind of the report line (of the owning line for account rows).
    pub kind: LineKind,
    /// Row type.
    pub row_type: RowType,
    /// Resolved display style.
    pub style: LineStyle,
    /// Rolled-up debit.
    pub debit: Decimal,
    /// Rolled-up credit.
    pub credit: Decimal,
    /// Sign-corrected balance.
    pub balance: Decimal,
    /// Expected sign of the balance.
    pub expected_sign: Sign,
    /// Formatted debit.
    pub m_debit: String,
    /// Formatted credit.
    pub m_credit: String,
    /// Formatted balance.
    pub m_balance: String,
}

/// Working row of one rollup.
struct Row {
    tree_idx: usize,
    aggregate: Option<usize>,
    parent: Option<usize>,
    children: Vec<usize>,
    level: u32,
}

type Amounts = (Decimal, Decimal);

/// Rolls aggregates up a report tree.
pub struct RollupEngine<'a> {
    money: &'a MoneyFormat,
}

impl<'a> RollupEngine<'a> {
    /// Creates an engine formatting amounts with `money`.
    #[must_use]
    pub const fn new(money: &'a MoneyFormat) -> Self {
        Self { money }
    }

    /// Produces the final report lines in display order.
    ///
    /// Only lines on a path from a bound account or a report reference up to
    /// the root are kept. Report-reference lines take the rolled-up value of
    /// their target line; rollup repeats until those values settle.
    #[must_use]
    pub fn rollup(
        &self,
        tree: &ReportTree,
        aggregates: &[AccountAggregate],
    ) -> Vec<ReportResultLine> {
        let rows = Self::materialize(tree, aggregates);
        let retained = Self::discover_ancestors(tree, &rows);

        let references: Vec<(usize, Option<usize>)> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                row.aggregate.is_none()
                    && tree.node(row.tree_idx).def.kind == LineKind::ReportReference
            })
            .map(|(idx, row)| {
                let target = tree
                    .node(row.tree_idx)
                    .def
                    .report_reference_id
                    .and_then(|id| tree.position(id))
                    .and_then(|tree_idx| {
                        rows.iter()
                            .position(|r| r.aggregate.is_none() && r.tree_idx == tree_idx)
                    })
                    .filter(|&target| retained[target]);
                (idx, target)
            })
            .collect();

        let mut seeds: HashMap<usize, Amounts> = references
            .iter()
            .map(|&(idx, _)| (idx, (Decimal::ZERO, Decimal::ZERO)))
            .collect();
        let mut values = Self::propagate(tree, &rows, &retained, aggregates, &seeds);
        for _ in 0..=references.len() {
            let next: HashMap<usize, Amounts> = references
                .iter()
                .map(|&(idx, target)| {
                    let amounts = target.map_or((Decimal::ZERO, Decimal::ZERO), |t| values[t]);
                    (idx, amounts)
                })
                .collect();
            if next == seeds {
                break;
            }
            seeds = next;
            values = Self::propagate(tree, &rows, &retained, aggregates, &seeds);
        }

        let lines = self.finalize(tree, &rows, &retained, aggregates, &values);
        debug!(
            tree_lines = tree.len(),
            rows = rows.len(),
            output = lines.len(),
            "Rolled up report tree"
        );
        lines
    }

    /// Builds the row arena: report lines in tree order, each followed by its
    /// account rows sorted by account code.
    fn materialize(tree: &ReportTree, aggregates: &[AccountAggregate]) -> Vec<Row> {
        let mut rows: Vec<Row> = Vec::with_capacity(tree.len());
        let mut row_of_node = vec![0usize; tree.len()];

        for (tree_idx, node) in tree.lines().iter().enumerate() {
            let row_idx = rows.len();
            row_of_node[tree_idx] = row_idx;
            let parent = node.parent.map(|p| row_of_node[p]);
            rows.push(Row {
                tree_idx,
                aggregate: None,
                parent,
                children: Vec::new(),
                level: node.level,
            });
            if let Some(p) = parent {
                rows[p].children.push(row_idx);
            }

            let mut bound: Vec<usize> = match node.def.kind {
                LineKind::AccountSet => aggregates
                    .iter()
                    .enumerate()
                    .filter(|(_, agg)| node.def.account_ids.contains(&agg.account_id))
                    .map(|(idx, _)| idx)
                    .collect(),
                LineKind::AccountTypeSet => aggregates
                    .iter()
                    .enumerate()
                    .filter(|(_, agg)| {
                        agg.account_type_id
                            .is_some_and(|t| node.def.account_type_ids.contains(&t))
                    })
                    .map(|(idx, _)| idx)
                    .collect(),
                LineKind::AggregateNode | LineKind::ReportReference => Vec::new(),
            };
            bound.sort_by(|&a, &b| aggregates[a].account_code.cmp(&aggregates[b].account_code));

            for agg_idx in bound {
                let account_row = rows.len();
                rows.push(Row {
                    tree_idx,
                    aggregate: Some(agg_idx),
                    parent: Some(row_idx),
                    children: Vec::new(),
                    level: node.level + 1,
                });
                rows[row_idx].children.push(account_row);
            }
        }

        rows
    }

    /// Marks the rows that survive pruning.
    ///
    /// Account rows are bound by construction. Report lines survive when they
    /// own a bound account, are report references, or sit above one of those.
    /// The upward walk does not cross account-type-set lines.
    fn discover_ancestors(tree: &ReportTree, rows: &[Row]) -> Vec<bool> {
        let mut retained = vec![false; rows.len()];

        let seeds = rows.iter().enumerate().filter_map(|(idx, row)| {
            if row.aggregate.is_some() {
                retained[idx] = true;
                row.parent
            } else if tree.node(row.tree_idx).def.kind == LineKind::ReportReference {
                Some(idx)
            } else {
                None
            }
        });
        let seeds: Vec<usize> = seeds.collect();

        for seed in seeds {
            if retained[seed] {
                continue;
            }
            retained[seed] = true;
            let mut cur = rows[seed].parent;
            while let Some(idx) = cur {
                if retained[idx]
                    || tree.node(rows[idx].tree_idx).def.kind == LineKind::AccountTypeSet
                {
                    break;
                }
                retained[idx] = true;
                cur = rows[idx].parent;
            }
        }

        retained
    }

    /// Sums retained children into every retained non-reference report line,
    /// deepest level first.
    fn propagate(
        tree: &ReportTree,
        rows: &[Row],
        retained: &[bool],
        aggregates: &[AccountAggregate],
        references: &HashMap<usize, Amounts>,
    ) -> Vec<Amounts> {
        let mut values: Vec<Amounts> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| match row.aggregate {
                Some(agg) => (aggregates[agg].debit, aggregates[agg].credit),
                None => references
                    .get(&idx)
                    .copied()
                    .unwrap_or((Decimal::ZERO, Decimal::ZERO)),
            })
            .collect();

        let mut by_level: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (idx, row) in rows.iter().enumerate() {
            let is_reference = tree.node(row.tree_idx).def.kind == LineKind::ReportReference;
            if retained[idx] && row.aggregate.is_none() && !is_reference {
                by_level.entry(row.level).or_default().push(idx);
            }
        }

        for bucket in by_level.values().rev() {
            for &idx in bucket {
                let (debit, credit) = rows[idx]
                    .children
                    .iter()
                    .filter(|&&child| retained[child])
                    .fold((Decimal::ZERO, Decimal::ZERO), |(d, c), &child| {
                        (d + values[child].0, c + values[child].1)
                    });
                values[idx] = (debit, credit);
            }
        }

        values
    }

    fn finalize(
        &self,
        tree: &ReportTree,
        rows: &[Row],
        retained: &[bool],
        aggregates: &[AccountAggregate],
        values: &[Amounts],
    ) -> Vec<ReportResultLine> {
        let mut lines = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            if !retained[idx] {
                continue;
            }
            let node = tree.node(row.tree_idx);
            if row.aggregate.is_some() && !node.def.display_detail.shows_accounts() {
                continue;
            }

            let debit = round2(values[idx].0);
            let credit = round2(values[idx].1);
            let expected_sign = node.def.sign;
            let balance = expected_sign.correct(round2(debit - credit));

            let line = match row.aggregate {
                Some(agg_idx) => {
                    let aggregate = &aggregates[agg_idx];
                    ReportResultLine {
                        report_line_id: node.def.id,
                        account_id: Some(aggregate.account_id),
                        account_code: Some(aggregate.account_code.clone()),
                        parent_id: Some(node.def.id),
                        children_ids: Vec::new(),
                        name: format!("{} {}", aggregate.account_code, aggregate.account_name),
                        level: row.level,
                        kind: node.def.kind,
                        row_type: RowType::Account,
                        style: LineStyle::Automatic.resolve(row.level),
                        debit,
                        credit,
                        balance,
                        expected_sign,
                        m_debit: self.money.format(debit),
                        m_credit: self.money.format(credit),
                        m_balance: self.money.format(balance),
                    }
                }
                None => ReportResultLine {
                    report_line_id: node.def.id,
                    account_id: None,
                    account_code: None,
                    parent_id: node.def.parent_id,
                    children_ids: row
                        .children
                        .iter()
                        .filter(|&&child| retained[child] && rows[child].aggregate.is_none())
                        .map(|&child| tree.node(rows[child].tree_idx).def.id)
                        .collect(),
                    name: node.def.name.clone(),
                    level: row.level,
                    kind: node.def.kind,
                    row_type: RowType::Report,
                    style: node.def.style.resolve(row.level),
                    debit,
                    credit,
                    balance,
                    expected_sign,
                    m_debit: self.money.format(debit),
                    m_credit: self.money.format(credit),
                    m_balance: self.money.format(balance),
                },
            };
            lines.push(line);
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::tree::{DisplayDetail, ReportLineDef};
    use ledgerlens_shared::types::{AccountTypeId, Currency};
    use rust_decimal_macros::dec;

    fn aggregate(code: &str, debit: Decimal, credit: Decimal) -> AccountAggregate {
        AccountAggregate {
            account_id: AccountId::new(),
            account_code: code.to_string(),
            account_name: format!("Account {code}"),
            account_type_id: None,
            debit,
            credit,
            balance: debit - credit,
            lines: Vec::new(),
        }
    }

    fn accounts_line(
        parent: ReportLineId,
        name: &str,
        seq: i32,
        accounts: &[&AccountAggregate],
    ) -> ReportLineDef {
        let mut def = ReportLineDef::new(
            ReportLineId::new(),
            Some(parent),
            name,
            seq,
            LineKind::AccountSet,
        );
        def.account_ids = accounts.iter().map(|a| a.account_id).collect();
        def
    }

    fn money() -> MoneyFormat {
        MoneyFormat::new(&Currency::usd())
    }

    fn find<'l>(lines: &'l [ReportResultLine], name: &str) -> &'l ReportResultLine {
        lines.iter().find(|l| l.name == name).unwrap()
    }

    #[test]
    fn test_account_rows_follow_their_line() {
        let cash = aggregate("101000", dec!(100), dec!(30));
        let bank = aggregate("100000", dec!(50), dec!(10));
        let root = ReportLineId::new();
        let tree = ReportTree::build(vec![
            ReportLineDef::new(root, None, "Balance Sheet", 1, LineKind::AggregateNode),
            accounts_line(root, "Current Assets", 1, &[&cash, &bank]),
        ])
        .unwrap();
        let money = money();

        let lines = RollupEngine::new(&money).rollup(&tree, &[cash, bank]);

        let names: Vec<&str> = lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Balance Sheet",
                "Current Assets",
                "100000 Account 100000",
                "101000 Account 101000"
            ]
        );
        assert_eq!(lines[2].row_type, RowType::Account);
        assert_eq!(lines[2].level, 2);
        assert_eq!(lines[0].debit, dec!(150));
        assert_eq!(lines[0].m_balance, "$ 110.00");
    }

    #[test]
    fn test_prunes_lines_without_bound_accounts() {
        let cash = aggregate("101000", dec!(10), dec!(0));
        let root = ReportLineId::new();
        let empty = ReportLineId::new();
        let tree = ReportTree::build(vec![
            ReportLineDef::new(root, None, "Balance Sheet", 1, LineKind::AggregateNode),
            accounts_line(root, "Cash", 1, &[&cash]),
            ReportLineDef::new(empty, Some(root), "Empty", 2, LineKind::AggregateNode),
            accounts_line(empty, "Unused", 1, &[]),
        ])
        .unwrap();
        let money = money();

        let lines = RollupEngine::new(&money).rollup(&tree, &[cash]);

        assert!(lines.iter().all(|l| l.name != "Empty" && l.name != "Unused"));
        assert_eq!(lines[0].children_ids.len(), 1);
    }

    #[test]
    fn test_account_type_set_binds_by_type() {
        let receivable = AccountTypeId::new();
        let mut customers = aggregate("121000", dec!(80), dec!(0));
        customers.account_type_id = Some(receivable);
        let other = aggregate("400000", dec!(0), dec!(80));
        let root = ReportLineId::new();
        let mut by_type = ReportLineDef::new(
            ReportLineId::new(),
            Some(root),
            "Receivables",
            1,
            LineKind::AccountTypeSet,
        );
        by_type.account_type_ids = vec![receivable];
        let tree = ReportTree::build(vec![
            ReportLineDef::new(root, None, "Assets", 1, LineKind::AggregateNode),
            by_type,
        ])
        .unwrap();
        let money = money();

        let lines = RollupEngine::new(&money).rollup(&tree, &[customers, other]);

        assert_eq!(lines.len(), 3);
        assert_eq!(find(&lines, "Assets").debit, dec!(80));
        let account = find(&lines, "121000 Account 121000");
        assert_eq!(account.row_type, RowType::Account);
    }

    #[test]
    fn test_no_detail_hides_account_rows_after_rollup() {
        let cash = aggregate("101000", dec!(25), dec!(5));
        let root = ReportLineId::new();
        let mut section = accounts_line(root, "Cash", 1, &[&cash]);
        section.display_detail = DisplayDetail::NoDetail;
        let tree = ReportTree::build(vec![
            ReportLineDef::new(root, None, "Assets", 1, LineKind::AggregateNode),
            section,
        ])
        .unwrap();
        let money = money();

        let lines = RollupEngine::new(&money).rollup(&tree, &[cash]);

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.row_type == RowType::Report));
        assert_eq!(find(&lines, "Cash").balance, dec!(20));
    }

    #[test]
    fn test_detail_with_hierarchy_shows_account_rows() {
        let cash = aggregate("101000", dec!(25), dec!(5));
        let root = ReportLineId::new();
        let mut section = accounts_line(root, "Cash", 1, &[&cash]);
        section.display_detail = DisplayDetail::DetailWithHierarchy;
        let tree = ReportTree::build(vec![
            ReportLineDef::new(root, None, "Assets", 1, LineKind::AggregateNode),
            section,
        ])
        .unwrap();
        let money = money();

        let lines = RollupEngine::new(&money).rollup(&tree, &[cash]);

        assert_eq!(lines.len(), 3);
        let account = find(&lines, "101000 Account 101000");
        assert_eq!(account.row_type, RowType::Account);
        assert_eq!(account.balance, dec!(20));
    }

    #[test]
    fn test_report_reference_takes_target_value() {
        let income = aggregate("400000", dec!(0), dec!(300));
        let expense = aggregate("600000", dec!(100), dec!(0));
        let pl = ReportLineId::new();
        let bs = ReportLineId::new();
        let equity = ReportLineId::new();

        let mut profit_ref = ReportLineDef::new(
            ReportLineId::new(),
            Some(equity),
            "Current Year Earnings",
            1,
            LineKind::ReportReference,
        );
        profit_ref.report_reference_id = Some(pl);
        profit_ref.sign = Sign::Negative;

        let tree = ReportTree::build(vec![
            ReportLineDef::new(bs, None, "Balance Sheet", 1, LineKind::AggregateNode),
            ReportLineDef::new(equity, Some(bs), "Equity", 1, LineKind::AggregateNode),
            profit_ref,
            ReportLineDef::new(pl, Some(bs), "Profit and Loss", 2, LineKind::AggregateNode),
            accounts_line(pl, "Income", 1, &[&income]),
            accounts_line(pl, "Expenses", 2, &[&expense]),
        ])
        .unwrap();
        let money = money();

        let lines = RollupEngine::new(&money).rollup(&tree, &[income, expense]);

        let earnings = find(&lines, "Current Year Earnings");
        assert_eq!(earnings.debit, dec!(100));
        assert_eq!(earnings.credit, dec!(300));
        assert_eq!(earnings.balance, dec!(-200));
        assert_eq!(find(&lines, "Equity").credit, dec!(300));
        assert_eq!(find(&lines, "Balance Sheet").credit, dec!(600));
    }

    #[test]
    fn test_unresolvable_reference_stays_zero() {
        let root = ReportLineId::new();
        let mut dangling = ReportLineDef::new(
            ReportLineId::new(),
            Some(root),
            "Elsewhere",
            1,
            LineKind::ReportReference,
        );
        dangling.report_reference_id = Some(ReportLineId::new());
        let tree = ReportTree::build(vec![
            ReportLineDef::new(root, None, "Report", 1, LineKind::AggregateNode),
            dangling,
        ])
        .unwrap();
        let money = money();

        let lines = RollupEngine::new(&money).rollup(&tree, &[]);

        assert_eq!(lines.len(), 2);
        assert_eq!(find(&lines, "Elsewhere").balance, Decimal::ZERO);
        assert_eq!(find(&lines, "Elsewhere").m_balance, "$ 0.00");
    }
}
