//! Per-account aggregation of ledger lines.

use std::collections::HashMap;

use ledgerlens_shared::types::{AccountId, round2};
use tracing::debug;

use super::error::ReportError;
use super::ledger::LedgerLine;
use super::types::{AccountAggregate, AccountInfo, DisplayMode};

/// Groups ledger lines by account.
pub struct AccountAggregator;

impl AccountAggregator {
    /// Builds one aggregate per account, in the order of `accounts`.
    ///
    /// Debit and credit accumulate the 2-dp rounded line values in ledger
    /// order; the balance is the rounded balance of the last line. Lines for
    /// accounts outside `accounts` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `NoAccountsFound` if `accounts` is empty.
    pub fn aggregate(
        lines: Vec<LedgerLine>,
        accounts: &[AccountInfo],
        display_mode: DisplayMode,
    ) -> Result<Vec<AccountAggregate>, ReportError> {
        if accounts.is_empty() {
            return Err(ReportError::NoAccountsFound);
        }

        let mut grouped: HashMap<AccountId, Vec<LedgerLine>> =
            accounts.iter().map(|a| (a.id, Vec::new())).collect();
        for line in lines {
            if let Some(bucket) = grouped.get_mut(&line.account_id) {
                bucket.push(line);
            }
        }

        let mut aggregates = Vec::with_capacity(accounts.len());
        for account in accounts {
            let mut aggregate = AccountAggregate::empty(account);
            aggregate.lines = grouped.remove(&account.id).unwrap_or_default();

            for line in &aggregate.lines {
                aggregate.debit += round2(line.debit);
                aggregate.credit += round2(line.credit);
                aggregate.balance = round2(line.balance);
            }

            let keep = match display_mode {
                DisplayMode::All => true,
                DisplayMode::Movement => !aggregate.lines.is_empty(),
                DisplayMode::NotZero => !account.currency.is_zero(aggregate.balance),
            };
            if keep {
                aggregates.push(aggregate);
            }
        }

        debug!(
            accounts = accounts.len(),
            kept = aggregates.len(),
            ?display_mode,
            "Aggregated ledger lines"
        );

        Ok(aggregates)
    }
}
