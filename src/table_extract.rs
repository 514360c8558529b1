use crate::classify::is_serial_number;
use crate::model::{Cell, PageContent, PageTable, TextFragment};
use crate::table_parse::{
    column_anchors, group_into_lines, modal_width, nearest_anchor, split_line_into_cells,
};

pub(crate) const LOW_CONFIDENCE_THRESHOLD: f32 = 0.60;

/// Source of one table per page. `None` means the page has no table.
pub trait TableExtractor {
    fn extract_table(&self, page: &PageContent) -> Option<PageTable>;
}

/// Rebuilds the table grid from text positions, or from plain text lines when
/// the page content gave no positioned fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTableExtractor {
    min_cols: usize,
}

impl LayoutTableExtractor {
    #[must_use]
    pub fn new(min_cols: usize) -> Self {
        Self {
            min_cols: min_cols.max(2),
        }
    }
}

impl Default for LayoutTableExtractor {
    fn default() -> Self {
        Self::new(3)
    }
}

impl TableExtractor for LayoutTableExtractor {
    fn extract_table(&self, page: &PageContent) -> Option<PageTable> {
        let rows = if page.fragments.is_empty() {
            rows_from_text(&page.text, self.min_cols)
        } else {
            rows_from_fragments(&page.fragments, self.min_cols)
        };

        if rows.is_empty() {
            return None;
        }

        Some(PageTable {
            page: page.page_number,
            confidence: table_confidence(&rows),
            rows,
        })
    }
}

fn table_confidence(rows: &[Vec<Cell>]) -> f32 {
    let modal = modal_width(rows);
    if modal == 0 {
        return 0.0;
    }

    let consistent =
        rows.iter().filter(|row| row.len() == modal).count() as f32 / rows.len() as f32;
    let max_width = rows.iter().map(Vec::len).max().unwrap_or(modal);
    let min_width = rows.iter().map(Vec::len).min().unwrap_or(modal);
    let uniformity = if max_width == 0 {
        0.0
    } else {
        1.0 - ((max_width - min_width) as f32 / max_width as f32)
    };

    (consistent * 0.75 + uniformity * 0.25).clamp(0.0, 1.0)
}

fn rows_from_text(text: &str, min_cols: usize) -> Vec<Vec<Cell>> {
    text.lines()
        .map(split_line_into_cells)
        .filter(|cells| cells.len() >= min_cols)
        .map(|cells| cells.into_iter().map(Some).collect())
        .collect()
}

fn starts_with_serial(line: &[&TextFragment]) -> bool {
    line.first()
        .is_some_and(|fragment| is_serial_number(&fragment.text))
}

fn rows_from_fragments(fragments: &[TextFragment], min_cols: usize) -> Vec<Vec<Cell>> {
    let lines = group_into_lines(fragments);

    // Data rows fix the column grid; headers are often offset from their values.
    let serial_lines = lines
        .iter()
        .filter(|line| line.len() >= min_cols && starts_with_serial(line))
        .collect::<Vec<_>>();
    let has_serial_rows = !serial_lines.is_empty();
    let anchor_lines = if has_serial_rows {
        serial_lines
    } else {
        lines
            .iter()
            .filter(|line| line.len() >= min_cols)
            .collect()
    };
    let anchors = column_anchors(
        anchor_lines
            .iter()
            .flat_map(|line| line.iter().map(|fragment| fragment.x)),
    );
    if anchors.is_empty() {
        return Vec::new();
    }

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    // Continuation lines wait here until the next row proves they sit inside the table.
    let mut pending: Vec<Vec<Cell>> = Vec::new();

    for line in &lines {
        let cells = place_on_grid(line, &anchors);
        let is_row = line.len() >= min_cols && (!has_serial_rows || cells[0].is_some());
        if !is_row {
            pending.push(cells);
            continue;
        }

        match rows.last_mut() {
            Some(previous) => {
                for continuation in pending.drain(..) {
                    append_continuation(previous, continuation);
                }
            }
            None => pending.clear(),
        }
        rows.push(cells);
    }

    rows
}

fn place_on_grid(line: &[&TextFragment], anchors: &[f32]) -> Vec<Cell> {
    let mut cells: Vec<Cell> = vec![None; anchors.len()];
    for fragment in line {
        let slot = &mut cells[nearest_anchor(anchors, fragment.x)];
        match slot {
            Some(text) => {
                text.push(' ');
                text.push_str(&fragment.text);
            }
            None => *slot = Some(fragment.text.clone()),
        }
    }
    cells
}

fn append_continuation(row: &mut [Cell], continuation: Vec<Cell>) {
    for (cell, extra) in row.iter_mut().zip(continuation) {
        let Some(extra) = extra else {
            continue;
        };
        match cell {
            Some(text) => {
                text.push('\n');
                text.push_str(&extra);
            }
            None => *cell = Some(extra),
        }
    }
}
