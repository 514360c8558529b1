use std::path::Path;

use crate::error::ConvertError;
use crate::model::{Cell, PageTable};
use crate::options::PageSelection;
use crate::pdf_reader::read_pdf_pages;
use crate::table_extract::{LayoutTableExtractor, TableExtractor};

pub const DEFAULT_PREVIEW_ROWS: usize = 15;

/// Extracts the table of one page and keeps its first `limit` rows.
///
/// Returns `Ok(None)` when the page exists but holds no table.
pub fn preview_table(
    input_pdf: &Path,
    page_number: u32,
    limit: usize,
    min_cols: usize,
) -> Result<Option<PageTable>, ConvertError> {
    let selection = page_number
        .to_string()
        .parse::<PageSelection>()
        .map_err(ConvertError::InvalidPageSelection)?;
    let pages = read_pdf_pages(input_pdf, Some(&selection))?;

    let extractor = LayoutTableExtractor::new(min_cols);
    Ok(pages
        .first()
        .and_then(|page| extractor.extract_table(page))
        .map(|mut table| {
            table.rows.truncate(limit);
            table
        }))
}

/// Renders a row as a bracketed list, escaping line breaks inside cells.
#[must_use]
pub fn format_preview_row(row: &[Cell]) -> String {
    let cells = row
        .iter()
        .map(|cell| match cell {
            Some(text) => format!("{text:?}"),
            None => "None".to_string(),
        })
        .collect::<Vec<_>>();
    format!("[{}]", cells.join(", "))
}

#[cfg(test)]
mod tests {
    use super::format_preview_row;

    #[test]
    fn formats_present_and_absent_cells() {
        let row = vec![Some("1".to_string()), Some("ABC\n123".to_string()), None];
        assert_eq!(format_preview_row(&row), r#"["1", "ABC\n123", None]"#);
    }

    #[test]
    fn escapes_quotes_inside_cells() {
        let row = vec![Some("12\" pipe".to_string())];
        assert_eq!(format_preview_row(&row), r#"["12\" pipe"]"#);
    }

    #[test]
    fn formats_empty_row() {
        assert_eq!(format_preview_row(&[]), "[]");
    }
}
