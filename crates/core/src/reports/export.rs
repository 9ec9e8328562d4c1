//! Spreadsheet layout of a financial report.
//!
//! The layout is a plain description of cells, merged ranges and column
//! widths. Rows and columns are zero-based. It can be handed to a workbook
//! writer or rendered to CSV.

use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::ReportError;
use super::filter::FilterSet;
use super::rollup::ReportResultLine;
use super::tree::LineStyle;
use super::types::DebitCredit;

/// Number of columns used by the layout.
pub const COLUMN_COUNT: usize = 4;

const HEADER_ROW: u32 = 7;

/// Formatting of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStyle {
    /// Centered, bold, large: report heading.
    Head,
    /// Centered, bold, bordered: column headers.
    SubHeading,
    /// Centered, bold, wrapped: filter summary.
    DateHead,
    /// Left-aligned date.
    DateHeadLeft,
    /// Right-aligned date.
    DateHeadRight,
    /// Bold section header.
    SideHeadingMain,
    /// Bold indented sub-section header.
    SideHeadingSub,
    /// Bordered value.
    Text,
    /// Bordered line name with indentation.
    TextName {
        /// Indentation steps.
        indent: u32,
    },
}

/// Content of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Text.
    Text(String),
    /// Amount.
    Number(Decimal),
    /// Blank.
    Empty,
}

impl CellValue {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(amount) => format!("{amount:.2}"),
            Self::Empty => String::new(),
        }
    }
}

/// Single cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    /// Row.
    pub row: u32,
    /// Column.
    pub col: u32,
    /// Content.
    pub value: CellValue,
    /// Formatting.
    pub style: CellStyle,
}

/// Rectangle of merged cells holding one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRange {
    /// First row.
    pub first_row: u32,
    /// First column.
    pub first_col: u32,
    /// Last row, inclusive.
    pub last_row: u32,
    /// Last column, inclusive.
    pub last_col: u32,
    /// Content.
    pub value: CellValue,
    /// Formatting.
    pub style: CellStyle,
}

/// Complete sheet description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadsheetLayout {
    /// Single cells.
    pub cells: Vec<Cell>,
    /// Merged ranges.
    pub merges: Vec<MergedRange>,
    /// `(column, width)` pairs.
    pub column_widths: Vec<(u32, u32)>,
}

impl SpreadsheetLayout {
    /// Lays out `lines` under a heading and a filter summary.
    #[must_use]
    pub fn build(title: &str, filters: &FilterSet, lines: &[ReportResultLine]) -> Self {
        let mut layout = Self {
            cells: Vec::new(),
            merges: Vec::new(),
            column_widths: vec![(0, 30), (1, 20), (2, 15), (3, 15)],
        };

        layout.merge(
            (1, 0, 2, 3),
            text(format!("{} : {title}", filters.company_name)),
            CellStyle::Head,
        );
        if let Some(from) = filters.date_from {
            let from = text(format!("From: {from}"));
            layout.merge((3, 0, 3, 1), from, CellStyle::DateHeadLeft);
        }
        if let Some(to) = filters.date_to {
            let to = text(format!("To: {to}"));
            layout.merge((3, 2, 3, 3), to, CellStyle::DateHeadRight);
        }
        let summary = text(filter_summary(filters));
        layout.merge((4, 0, 5, 3), summary, CellStyle::DateHead);

        let show_columns = filters.debit_credit == DebitCredit::Show;
        if show_columns {
            layout.cell(HEADER_ROW, 0, CellValue::Empty, CellStyle::SubHeading);
            layout.cell(HEADER_ROW, 1, text("Debit"), CellStyle::SubHeading);
            layout.cell(HEADER_ROW, 2, text("Credit"), CellStyle::SubHeading);
        } else {
            let name_columns = (HEADER_ROW, 0, HEADER_ROW, 2);
            layout.merge(name_columns, CellValue::Empty, CellStyle::SubHeading);
        }
        layout.cell(HEADER_ROW, 3, text("Balance"), CellStyle::SubHeading);

        let mut row = HEADER_ROW;
        for line in lines {
            row += 1;
            let style = match line.style {
                LineStyle::MainTitle => CellStyle::SideHeadingMain,
                LineStyle::Title => CellStyle::SideHeadingSub,
                _ => CellStyle::TextName {
                    indent: line.level.saturating_sub(1),
                },
            };
            if show_columns {
                layout.cell(row, 0, text(line.name.clone()), style);
                layout.cell(row, 1, CellValue::Number(line.debit), CellStyle::Text);
                layout.cell(row, 2, CellValue::Number(line.credit), CellStyle::Text);
            } else {
                layout.merge((row, 0, row, 2), text(line.name.clone()), style);
            }
            layout.cell(row, 3, CellValue::Number(line.balance), CellStyle::Text);
        }

        layout
    }

    fn cell(&mut self, row: u32, col: u32, value: CellValue, style: CellStyle) {
        self.cells.push(Cell {
            row,
            col,
            value,
            style,
        });
    }

    fn merge(
        &mut self,
        (first_row, first_col, last_row, last_col): (u32, u32, u32, u32),
        value: CellValue,
        style: CellStyle,
    ) {
        self.merges.push(MergedRange {
            first_row,
            first_col,
            last_row,
            last_col,
            value,
            style,
        });
    }

    /// Last used row, if any.
    #[must_use]
    pub fn last_row(&self) -> Option<u32> {
        let cells = self.cells.iter().map(|c| c.row);
        let merges = self.merges.iter().map(|m| m.last_row);
        cells.chain(merges).max()
    }

    /// Renders the layout as a grid of strings. Merged values land in their
    /// top-left cell; the rest of the range stays blank.
    #[must_use]
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let Some(last) = self.last_row() else {
            return Vec::new();
        };
        let mut grid = vec![vec![String::new(); COLUMN_COUNT]; last as usize + 1];
        let placed = self
            .merges
            .iter()
            .map(|m| (m.first_row, m.first_col, &m.value))
            .chain(self.cells.iter().map(|c| (c.row, c.col, &c.value)));
        for (row, col, value) in placed {
            if let Some(slot) = grid
                .get_mut(row as usize)
                .and_then(|r| r.get_mut(col as usize))
            {
                *slot = value.render();
            }
        }
        grid
    }

    /// Writes the grid as CSV.
    pub fn write_csv(&self, writer: impl Write) -> Result<(), ReportError> {
        let mut csv = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        for record in self.to_grid() {
            csv.write_record(&record)
                .map_err(|e| ReportError::Export(format!("CSV write error: {e}")))?;
        }
        csv.flush()
            .map_err(|e| ReportError::Export(format!("CSV flush error: {e}")))?;
        Ok(())
    }

    /// Renders the grid as a CSV string.
    pub fn to_csv(&self) -> Result<String, ReportError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ReportError::Export(e.to_string()))
    }
}

fn text(value: impl Into<String>) -> CellValue {
    CellValue::Text(value.into())
}

fn filter_summary(filters: &FilterSet) -> String {
    format!(
        "  Accounts: {};  Journals: {};  Account Tags: {};  Analytic Tags: {};  Analytic: {}; Operating Units: {};  Target Moves: {}",
        filters.accounts.join(", "),
        filters.journals.join(", "),
        filters.account_tags.join(", "),
        filters.analytic_tags.join(", "),
        filters.analytics.join(", "),
        filters.operating_units.join(", "),
        filters.target_move_label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::filter::{FilterCatalog, FilterSelection, resolve_filters};
    use crate::reports::rollup::RowType;
    use crate::reports::tree::{LineKind, Sign};
    use chrono::NaiveDate;
    use ledgerlens_shared::types::ReportLineId;
    use rust_decimal_macros::dec;

    fn filters(debit_credit: DebitCredit) -> FilterSet {
        let catalog = FilterCatalog {
            company_name: "Acme".to_string(),
            ..FilterCatalog::default()
        };
        let selection = FilterSelection {
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2024, 12, 31),
            debit_credit,
            ..FilterSelection::default()
        };
        resolve_filters(&selection, &catalog).unwrap().filters
    }

    fn result_line(name: &str, level: u32, style: LineStyle, balance: Decimal) -> ReportResultLine {
        ReportResultLine {
            report_line_id: ReportLineId::new(),
            account_id: None,
            account_code: None,
            parent_id: None,
            children_ids: Vec::new(),
            name: name.to_string(),
            level,
            kind: LineKind::AggregateNode,
            row_type: RowType::Report,
            style,
            debit: balance,
            credit: Decimal::ZERO,
            balance,
            expected_sign: Sign::Positive,
            m_debit: String::new(),
            m_credit: String::new(),
            m_balance: String::new(),
        }
    }

    fn lines() -> Vec<ReportResultLine> {
        vec![
            result_line("Assets", 1, LineStyle::MainTitle, dec!(150)),
            result_line("Current Assets", 2, LineStyle::Title, dec!(150)),
            result_line("101000 Cash", 3, LineStyle::Normal, dec!(150)),
        ]
    }

    fn balance_sheet(debit_credit: DebitCredit) -> SpreadsheetLayout {
        SpreadsheetLayout::build("Balance Sheet", &filters(debit_credit), &lines())
    }

    #[test]
    fn test_header_rows() {
        let layout = balance_sheet(DebitCredit::Hide);
        let grid = layout.to_grid();

        assert_eq!(grid[1][0], "Acme : Balance Sheet");
        assert_eq!(grid[3][0], "From: 2024-01-01");
        assert_eq!(grid[3][2], "To: 2024-12-31");
        assert_eq!(
            grid[4][0],
            "  Accounts: All;  Journals: All;  Account Tags: All;  Analytic Tags: All;  Analytic: All; Operating Units: All;  Target Moves: Posted"
        );
        assert_eq!(grid[7], vec!["", "", "", "Balance"]);
    }

    #[test]
    fn test_balance_only_rows_merge_name_columns() {
        let layout = balance_sheet(DebitCredit::Hide);

        let name_merge = layout.merges.iter().find(|m| m.first_row == 8).unwrap();
        assert_eq!((name_merge.first_col, name_merge.last_col), (0, 2));
        assert_eq!(name_merge.style, CellStyle::SideHeadingMain);

        let grid = layout.to_grid();
        assert_eq!(grid[8], vec!["Assets", "", "", "150.00"]);
        assert_eq!(grid.len(), 11);
    }

    #[test]
    fn test_debit_credit_columns_and_styles() {
        let layout = balance_sheet(DebitCredit::Show);
        let grid = layout.to_grid();

        assert_eq!(grid[7], vec!["", "Debit", "Credit", "Balance"]);
        assert_eq!(grid[10], vec!["101000 Cash", "150.00", "0.00", "150.00"]);

        let styles: Vec<CellStyle> = layout
            .cells
            .iter()
            .filter(|c| c.row > HEADER_ROW && c.col == 0)
            .map(|c| c.style)
            .collect();
        assert_eq!(
            styles,
            vec![
                CellStyle::SideHeadingMain,
                CellStyle::SideHeadingSub,
                CellStyle::TextName { indent: 2 },
            ]
        );
    }

    #[test]
    fn test_csv_rendering() {
        let layout = balance_sheet(DebitCredit::Show);
        let csv = layout.to_csv().unwrap();

        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[1], "Acme : Balance Sheet,,,");
        assert_eq!(rows[10], "101000 Cash,150.00,0.00,150.00");
    }
}
