//! Row classification and projection into output records.

use crate::model::{Cell, OutputRecord};
use crate::options::{ColumnMap, ShortRowPolicy};

pub(crate) const SERIAL_HEADER: &str = "S.no";
/// The brand number header wraps onto two lines in the source tables.
pub(crate) const BRAND_NUMBER_HEADER: &str = "Brand\nNumber";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyRow,
    HeaderSerial,
    EmptySerial,
    HeaderBrandNumber,
    NonNumericSerial,
    ShortRow { width: usize, required: usize },
}

fn cell_text(row: &[Cell], index: usize) -> Option<&str> {
    row.get(index).and_then(Option::as_deref)
}

/// True when `value` is a non-empty run of decimal digits.
#[must_use]
pub fn is_serial_number(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

/// Flattens embedded line breaks and trims; absent cells become empty.
#[must_use]
pub fn clean_cell(cell: Option<&str>) -> String {
    cell.map(|text| text.replace('\n', " ").trim().to_string())
        .unwrap_or_default()
}

pub fn classify_row(
    row: &[Cell],
    columns: &ColumnMap,
    short_rows: ShortRowPolicy,
) -> Result<OutputRecord, RejectReason> {
    if row.is_empty() {
        return Err(RejectReason::EmptyRow);
    }

    let serial = cell_text(row, columns.serial);
    if serial == Some(SERIAL_HEADER) {
        return Err(RejectReason::HeaderSerial);
    }
    if serial == Some("") {
        return Err(RejectReason::EmptySerial);
    }
    if cell_text(row, columns.brand_number) == Some(BRAND_NUMBER_HEADER) {
        return Err(RejectReason::HeaderBrandNumber);
    }
    if !serial.is_some_and(is_serial_number) {
        return Err(RejectReason::NonNumericSerial);
    }

    let required = columns.required_width();
    if row.len() < required && short_rows != ShortRowPolicy::Pad {
        return Err(RejectReason::ShortRow {
            width: row.len(),
            required,
        });
    }

    Ok(project_row(row, columns))
}

fn project_row(row: &[Cell], columns: &ColumnMap) -> OutputRecord {
    let size_code = clean_cell(cell_text(row, columns.size_code));
    OutputRecord {
        brand_number: clean_cell(cell_text(row, columns.brand_number)),
        // No separate size column exists in the layout.
        size: size_code.clone(),
        code: size_code,
        pack_type: clean_cell(cell_text(row, columns.pack_type)),
        product_name: clean_cell(cell_text(row, columns.product_name)),
        mrp: clean_cell(cell_text(row, columns.mrp)),
    }
}
