use std::collections::HashMap;

use crate::model::TextFragment;

/// Baselines closer than this share a line.
pub(crate) const LINE_TOLERANCE: f32 = 2.0;
/// Fragment starts closer than this share a column.
pub(crate) const COLUMN_TOLERANCE: f32 = 4.0;

pub(crate) fn split_line_into_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut whitespace_run = 0_usize;

    for ch in trimmed.chars() {
        if ch == '\t' {
            if !current.trim().is_empty() {
                cells.push(current.trim().to_string());
                current.clear();
            }
            whitespace_run = 0;
            continue;
        }

        if ch.is_whitespace() {
            whitespace_run += 1;
            if whitespace_run >= 2 {
                if !current.trim().is_empty() {
                    cells.push(current.trim().to_string());
                    current.clear();
                }
                continue;
            }
            current.push(' ');
            continue;
        }

        whitespace_run = 0;
        current.push(ch);
    }

    if !current.trim().is_empty() {
        cells.push(current.trim().to_string());
    }

    cells
}

/// Groups fragments into lines, top of the page first, each sorted left to right.
pub(crate) fn group_into_lines(fragments: &[TextFragment]) -> Vec<Vec<&TextFragment>> {
    let mut sorted = fragments.iter().collect::<Vec<_>>();
    sorted.sort_by(|left, right| right.y.total_cmp(&left.y));

    let mut lines: Vec<Vec<&TextFragment>> = Vec::new();
    for fragment in sorted {
        match lines.last_mut() {
            Some(line) if (line[0].y - fragment.y).abs() <= LINE_TOLERANCE => line.push(fragment),
            _ => lines.push(vec![fragment]),
        }
    }

    for line in &mut lines {
        line.sort_by(|left, right| left.x.total_cmp(&right.x));
    }
    lines
}

/// Clusters x positions into column anchors, each anchor the leftmost member.
pub(crate) fn column_anchors(positions: impl IntoIterator<Item = f32>) -> Vec<f32> {
    let mut positions = positions.into_iter().collect::<Vec<_>>();
    positions.sort_by(f32::total_cmp);

    let mut anchors: Vec<f32> = Vec::new();
    let mut last = None;
    for x in positions {
        match last {
            Some(previous) if x - previous <= COLUMN_TOLERANCE => {}
            _ => anchors.push(x),
        }
        last = Some(x);
    }
    anchors
}

/// Index of the anchor closest to `x`; ties go to the left column.
pub(crate) fn nearest_anchor(anchors: &[f32], x: f32) -> usize {
    anchors
        .iter()
        .enumerate()
        .min_by(|(_, left), (_, right)| (*left - x).abs().total_cmp(&(*right - x).abs()))
        .map_or(0, |(index, _)| index)
}

pub(crate) fn modal_width<T>(rows: &[Vec<T>]) -> usize {
    let mut freq = HashMap::new();
    for width in rows.iter().map(Vec::len) {
        *freq.entry(width).or_insert(0_usize) += 1;
    }

    freq.into_iter()
        .max_by_key(|(width, count)| (*count, *width))
        .map_or(0, |(width, _)| width)
}

#[cfg(test)]
mod tests {
    use super::{
        column_anchors, group_into_lines, modal_width, nearest_anchor, split_line_into_cells,
    };
    use crate::model::TextFragment;

    #[test]
    fn splits_double_space_separated_cells() {
        let cells = split_line_into_cells("12  Royal Stag  180ml  Bottle");
        assert_eq!(cells, vec!["12", "Royal Stag", "180ml", "Bottle"]);
    }

    #[test]
    fn splits_tab_separated_cells() {
        let cells = split_line_into_cells("A\tB\tC");
        assert_eq!(cells, vec!["A", "B", "C"]);
    }

    #[test]
    fn groups_fragments_by_baseline() {
        let fragments = vec![
            TextFragment::new(120.0, 700.5, "b"),
            TextFragment::new(50.0, 680.0, "c"),
            TextFragment::new(50.0, 700.0, "a"),
        ];
        let lines = group_into_lines(&fragments);
        let texts = lines
            .iter()
            .map(|line| line.iter().map(|f| f.text.as_str()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn clusters_nearby_positions_into_anchors() {
        let anchors = column_anchors([50.0, 51.5, 120.0, 300.0, 118.0]);
        assert_eq!(anchors, vec![50.0, 118.0, 300.0]);
        assert_eq!(nearest_anchor(&anchors, 52.0), 0);
        assert_eq!(nearest_anchor(&anchors, 200.0), 1);
        assert_eq!(nearest_anchor(&anchors, 10.0), 0);
        assert_eq!(nearest_anchor(&anchors, 260.0), 2);
    }

    #[test]
    fn detects_modal_width() {
        let rows = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["1".to_string(), "2".to_string()],
            vec!["x".to_string()],
        ];
        assert_eq!(modal_width(&rows), 2);
    }
}
