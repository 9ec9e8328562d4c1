//! Report error types.

use chrono::NaiveDate;
use ledgerlens_shared::types::ReportLineId;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The account universe is empty after filtering.
    #[error("No Accounts Found! Please Add One")]
    NoAccountsFound,

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// No report line matches the requested report name.
    #[error("Financial report not found: {0}")]
    ReportNotFound(String),

    /// A report line is its own ancestor.
    #[error("Report line {0} is part of a parent cycle")]
    TreeCycle(ReportLineId),

    /// A report line points to a parent that does not exist.
    #[error("Report line {line} references unknown parent {parent}")]
    UnknownParent {
        /// The child line.
        line: ReportLineId,
        /// The missing parent.
        parent: ReportLineId,
    },

    /// Two report lines share an id.
    #[error("Duplicate report line: {0}")]
    DuplicateLine(ReportLineId),

    /// Spreadsheet rendering failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// The ledger or tree source failed.
    #[error("Report source failed: {0}")]
    Source(String),
}
