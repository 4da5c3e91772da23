use crate::error::{ReportError, Result};
use crate::layout::{column_width, row_height};
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use std::path::Path;
use tenderwatch_core::{RunResult, TenderRecord};

/// Header row of the tender sheet
pub const HEADERS: [&str; 5] = [
    "Sr No",
    "Tender No",
    "Tender Details",
    "Advertisement Date",
    "Closing Date",
];

const SHEET_NAME: &str = "Tenders";
const DETAILS_COLUMN: usize = 2;

/// One spreadsheet row per extracted record, in scrape order.
pub struct ReportBuilder<'a> {
    result: &'a RunResult,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(result: &'a RunResult) -> Self {
        Self { result }
    }

    /// Cell texts of every row including the header.
    pub fn rows(&self) -> Vec<[&'a str; 5]> {
        std::iter::once(HEADERS)
            .chain(self.result.records.iter().map(cells))
            .collect()
    }

    /// Whether a data row's details cell is emphasised.
    fn is_highlighted(&self, record: &TenderRecord) -> bool {
        self.result.is_matched(&record.tender_number)
    }

    /// Lay out the workbook in memory.
    pub fn build(&self) -> Result<Workbook> {
        let rows = self.rows();
        let plain = Format::new().set_text_wrap().set_align(FormatAlign::Top);
        let bold = plain.clone().set_bold();

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (r, row) in rows.iter().enumerate() {
            let row_num = u32::try_from(r).map_err(|_| ReportError::TooManyRows(rows.len()))?;
            let highlighted = r > 0 && self.is_highlighted(&self.result.records[r - 1]);

            for (col_num, value) in (0u16..).zip(row.iter()) {
                let format = if highlighted && usize::from(col_num) == DETAILS_COLUMN {
                    &bold
                } else {
                    &plain
                };

                if value.is_empty() {
                    sheet.write_blank(row_num, col_num, format)?;
                } else {
                    sheet.write_string_with_format(row_num, col_num, *value, format)?;
                }
            }

            sheet.set_row_height(row_num, row_height(row.iter().copied()))?;
        }

        for (col_num, c) in (0u16..).zip(0..HEADERS.len()) {
            // Widths are capped at 100 so the conversion is exact
            #[allow(clippy::cast_precision_loss)]
            let width = column_width(rows.iter().map(|row| row[c])) as f64;
            sheet.set_column_width(col_num, width)?;
        }

        Ok(workbook)
    }

    /// Write the report to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut workbook = self.build()?;
        workbook.save(path)?;

        tracing::info!(
            "Report written to {} ({} records, {} highlighted)",
            path.display(),
            self.result.records.len(),
            self.result.matches.len()
        );
        Ok(())
    }
}

fn cells(record: &TenderRecord) -> [&str; 5] {
    [
        record.serial.as_str(),
        record.tender_number.as_str(),
        record.details.as_str(),
        record.advertised_date.as_str(),
        record.closing_date.as_str(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenderwatch_core::TenderRecord;

    #[test]
    fn test_rows_start_with_header_and_keep_duplicates() {
        let result = RunResult {
            records: vec![
                TenderRecord::new("1", "T-1", "Bank", "01/01/2025", "15/01/2025"),
                TenderRecord::new("2", "T-1", "Bank again", "01/01/2025", "15/01/2025"),
            ],
            ..RunResult::new()
        };

        let rows = ReportBuilder::new(&result).rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], HEADERS);
        assert_eq!(rows[2][2], "Bank again");
    }

    #[test]
    fn test_build_every_column_with_bold_and_blank_cells() {
        let mut result = RunResult {
            records: vec![TenderRecord::new("1", "T-1", "Bank", "", "15/01/2025")],
            ..RunResult::new()
        };
        result.matches.insert(tenderwatch_core::KeywordMatch {
            tender_number: "T-1".to_string(),
            keywords: vec!["Bank".to_string()],
            highlighted: "<b>Bank</b>".to_string(),
        });

        let builder = ReportBuilder::new(&result);
        assert!(builder.build().is_ok());
        assert_eq!(builder.rows()[1].len(), HEADERS.len());
    }

    #[test]
    fn test_build_empty_result() {
        let result = RunResult::new();
        assert!(ReportBuilder::new(&result).build().is_ok());
    }
}
