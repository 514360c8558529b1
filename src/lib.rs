mod classify;
mod error;
mod model;
mod options;
mod pdf_reader;
mod preview;
mod table_extract;
mod table_parse;
mod txt_out;
mod warning;

use std::path::Path;

use tracing::{debug, trace, warn};

use crate::pdf_reader::{read_pdf_pages, read_pdf_pages_from_bytes};
use crate::table_extract::LOW_CONFIDENCE_THRESHOLD;
use crate::txt_out::{write_records, write_records_to_string};

pub use classify::{RejectReason, classify_row, clean_cell, is_serial_number};
pub use error::ConvertError;
pub use model::{Cell, OUTPUT_HEADER, OutputRecord, PageContent, PageTable, TextFragment};
pub use options::{ColumnMap, ConvertOptions, LineEnding, PageSelection, ShortRowPolicy};
pub use preview::{DEFAULT_PREVIEW_ROWS, format_preview_row, preview_table};
pub use table_extract::{LayoutTableExtractor, TableExtractor};
pub use warning::{ConvertWarning, WarningCode};

pub const DEFAULT_INPUT: &str = "Price List (1).pdf";
pub const DEFAULT_OUTPUT: &str = "Price_List.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// 1-based position among the processed pages.
    pub index: usize,
    pub total: usize,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversionReport {
    pub page_count: usize,
    pub table_count: usize,
    pub record_count: usize,
    pub rejected_count: usize,
    pub warnings: Vec<ConvertWarning>,
}

fn validate_options(options: &ConvertOptions) -> Result<(), ConvertError> {
    if options.min_cols < 2 {
        return Err(ConvertError::InvalidOption(
            "min_cols must be at least 2".to_string(),
        ));
    }
    if matches!(options.delimiter, b'\n' | b'\r') {
        return Err(ConvertError::InvalidOption(
            "delimiter cannot be a line break".to_string(),
        ));
    }
    Ok(())
}

/// Runs every page through `extractor` and the row classifier, in page order.
pub fn convert_pages<E>(
    pages: &[PageContent],
    extractor: &E,
    options: &ConvertOptions,
    mut on_page: impl FnMut(PageProgress),
) -> Result<(Vec<OutputRecord>, ConversionReport), ConvertError>
where
    E: TableExtractor + ?Sized,
{
    let mut records = Vec::new();
    let mut report = ConversionReport {
        page_count: pages.len(),
        ..ConversionReport::default()
    };

    for (index, page) in pages.iter().enumerate() {
        on_page(PageProgress {
            index: index + 1,
            total: pages.len(),
            page_number: page.page_number,
        });

        let Some(table) = extractor.extract_table(page) else {
            debug!(page = page.page_number, "no table found, skipping page");
            report.warnings.push(
                ConvertWarning::new(WarningCode::NoTableOnPage, "no table found on page")
                    .with_page(page.page_number),
            );
            continue;
        };

        report.table_count += 1;
        if table.confidence < LOW_CONFIDENCE_THRESHOLD {
            report.warnings.push(
                ConvertWarning::new(
                    WarningCode::LowConfidence,
                    "table layout is irregular; column positions may be off",
                )
                .with_page(page.page_number)
                .with_confidence(table.confidence),
            );
        }

        for (row_index, row) in table.rows.iter().enumerate() {
            let row_number = row_index + 1;
            match classify_row(row, &options.columns, options.short_rows) {
                Ok(record) => records.push(record),
                Err(RejectReason::ShortRow { width, required }) => {
                    if options.short_rows == ShortRowPolicy::Fail {
                        return Err(ConvertError::ShortRow {
                            page: page.page_number,
                            row: row_number,
                            width,
                            required,
                        });
                    }
                    warn!(
                        page = page.page_number,
                        row = row_number,
                        width,
                        required,
                        "skipping short row"
                    );
                    report.rejected_count += 1;
                    report.warnings.push(
                        ConvertWarning::new(
                            WarningCode::ShortRow,
                            format!("row has {width} cells, column map needs {required}"),
                        )
                        .with_page(page.page_number)
                        .with_row(row_number),
                    );
                }
                Err(reason) => {
                    trace!(page = page.page_number, row = row_number, ?reason, "row rejected");
                    report.rejected_count += 1;
                }
            }
        }
    }

    if records.is_empty() {
        report.warnings.push(ConvertWarning::new(
            WarningCode::NoRecords,
            "no price list rows were found in the selected pages",
        ));
    }

    report.record_count = records.len();
    Ok((records, report))
}

pub fn convert_pdf_to_txt(
    input_pdf: &Path,
    output_txt: &Path,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    convert_pdf_to_txt_with_progress(input_pdf, output_txt, options, |_| {})
}

pub fn convert_pdf_to_txt_with_progress(
    input_pdf: &Path,
    output_txt: &Path,
    options: &ConvertOptions,
    on_page: impl FnMut(PageProgress),
) -> Result<ConversionReport, ConvertError> {
    validate_options(options)?;

    let pages = read_pdf_pages(input_pdf, options.pages.as_ref())?;
    let extractor = LayoutTableExtractor::new(options.min_cols);
    let (records, report) = convert_pages(&pages, &extractor, options, on_page)?;
    write_records(output_txt, &records, options)?;

    Ok(report)
}

pub fn convert_pdf_bytes_to_string(
    input_pdf: &[u8],
    options: &ConvertOptions,
) -> Result<(String, ConversionReport), ConvertError> {
    validate_options(options)?;

    let pages = read_pdf_pages_from_bytes(input_pdf, options.pages.as_ref())?;
    let extractor = LayoutTableExtractor::new(options.min_cols);
    let (records, report) = convert_pages(&pages, &extractor, options, |_| {})?;
    let text = write_records_to_string(&records, options)?;

    Ok((text, report))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::{PageProgress, convert_pages, validate_options};
    use crate::error::ConvertError;
    use crate::model::{Cell, PageContent, PageTable};
    use crate::options::{ConvertOptions, ShortRowPolicy};
    use crate::table_extract::TableExtractor;
    use crate::warning::WarningCode;

    struct FixedTables(HashMap<u32, Vec<Vec<Cell>>>);

    impl TableExtractor for FixedTables {
        fn extract_table(&self, page: &PageContent) -> Option<PageTable> {
            self.0.get(&page.page_number).map(|rows| PageTable {
                page: page.page_number,
                rows: rows.clone(),
                confidence: 1.0,
            })
        }
    }

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|cell| Some((*cell).to_string())).collect()
    }

    fn pages(count: u32) -> Vec<PageContent> {
        (1..=count)
            .map(|page_number| PageContent {
                page_number,
                ..PageContent::default()
            })
            .collect()
    }

    fn price_tables() -> FixedTables {
        FixedTables(HashMap::from([
            (
                1,
                vec![
                    row(&["S.no", "Brand\nNumber", "Size", "Pack", "Name", "", "", "MRP"]),
                    row(&["1", "ABC\n123", "X1", "Bottle", "Whisky\nGold", "", "", "350.00"]),
                ],
            ),
            (
                3,
                vec![
                    row(&["2", "DEF", "Y2", "Can", "Beer", "", "", "90.00"]),
                    row(&["3", "GHI", "Z3"]),
                ],
            ),
        ]))
    }

    #[test]
    fn skips_pages_without_table_and_keeps_order() {
        let mut progress = Vec::new();
        let (records, report) = convert_pages(
            &pages(3),
            &price_tables(),
            &ConvertOptions::default(),
            |step: PageProgress| progress.push((step.index, step.total)),
        )
        .expect("conversion should succeed");

        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].brand_number, "ABC 123");
        assert_eq!(records[1].brand_number, "DEF");
        assert_eq!(report.table_count, 2);
        assert_eq!(report.record_count, 2);
        assert_eq!(report.rejected_count, 2);

        let skipped = report
            .warnings
            .iter()
            .find(|warning| warning.code == WarningCode::NoTableOnPage)
            .expect("skip warning");
        assert_eq!(skipped.page, Some(2));

        let short = report
            .warnings
            .iter()
            .find(|warning| warning.code == WarningCode::ShortRow)
            .expect("short row warning");
        assert_eq!((short.page, short.row), (Some(3), Some(2)));
    }

    #[test]
    fn fail_policy_aborts_on_short_row() {
        let options = ConvertOptions {
            short_rows: ShortRowPolicy::Fail,
            ..ConvertOptions::default()
        };
        let error = convert_pages(&pages(3), &price_tables(), &options, |_| {})
            .expect_err("short row should abort");
        assert!(matches!(
            error,
            ConvertError::ShortRow {
                page: 3,
                row: 2,
                width: 3,
                required: 8
            }
        ));
    }

    #[test]
    fn warns_when_nothing_is_accepted() {
        let (records, report) = convert_pages(
            &pages(2),
            &FixedTables(HashMap::new()),
            &ConvertOptions::default(),
            |_| {},
        )
        .expect("conversion should succeed");
        assert!(records.is_empty());
        assert!(
            report
                .warnings
                .iter()
                .any(|warning| warning.code == WarningCode::NoRecords)
        );
    }

    #[test]
    fn rejects_invalid_options() {
        let options = ConvertOptions {
            min_cols: 1,
            ..ConvertOptions::default()
        };
        assert!(validate_options(&options).is_err());

        let options = ConvertOptions {
            delimiter: b'\n',
            ..ConvertOptions::default()
        };
        assert!(validate_options(&options).is_err());
    }
}
