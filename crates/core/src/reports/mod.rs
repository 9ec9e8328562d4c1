//! Financial report generation.
//!
//! This module turns filtered ledger lines into hierarchical statements:
//! - Filter resolution and the ledger query predicate
//! - Account aggregation (General Ledger)
//! - Report tree rollup (Balance Sheet, Profit and Loss)
//! - Spreadsheet export layout

pub mod aggregator;
pub mod error;
pub mod export;
pub mod filter;
pub mod ledger;
pub mod rollup;
pub mod service;
pub mod tree;
pub mod types;


pub use aggregator::AccountAggregator;
pub use error::ReportError;
pub use export::{Cell, CellStyle, CellValue, MergedRange, SpreadsheetLayout};
pub use filter::{
    FilterCatalog, FilterSelection, FilterSet, NamedOption, ResolvedFilters, resolve_filters,
};
pub use ledger::{InMemoryLedger, LedgerLine, LedgerQuery, LedgerSource, merge_running_balances};
pub use rollup::{ReportResultLine, RollupEngine, RowType};
pub use service::ReportService;
pub use tree::{
    DisplayDetail, LineKind, LineStyle, ReportLineDef, ReportTree, ReportTreeNode, ReportTreeSource,
    Sign,
};
pub use types::*;
