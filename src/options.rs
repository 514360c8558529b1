use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConvertError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if start == 0 || end == 0 {
                    return Err("pages are 1-based".to_string());
                }
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                pages.extend(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                if page == 0 {
                    return Err("pages are 1-based".to_string());
                }
                pages.insert(page);
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

/// Source cell positions for each projected field.
///
/// The defaults match the price list layout: serial number, brand number,
/// size/code, pack type, product name, two unused columns, then MRP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMap {
    pub serial: usize,
    pub brand_number: usize,
    pub size_code: usize,
    pub pack_type: usize,
    pub product_name: usize,
    pub mrp: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            serial: 0,
            brand_number: 1,
            size_code: 2,
            pack_type: 3,
            product_name: 4,
            mrp: 7,
        }
    }
}

impl ColumnMap {
    /// Number of cells a row needs so every mapped position exists.
    #[must_use]
    pub fn required_width(&self) -> usize {
        [
            self.serial,
            self.brand_number,
            self.size_code,
            self.pack_type,
            self.product_name,
            self.mrp,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConvertError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// What to do with a row that passes classification but lacks mapped cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortRowPolicy {
    Reject,
    Pad,
    Fail,
}

impl FromStr for ShortRowPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "pad" => Ok(Self::Pad),
            "fail" => Ok(Self::Fail),
            other => Err(format!(
                "unknown short row policy '{other}', expected reject, pad or fail"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub pages: Option<PageSelection>,
    pub columns: ColumnMap,
    pub delimiter: u8,
    pub line_ending: LineEnding,
    pub short_rows: ShortRowPolicy,
    pub min_cols: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            pages: None,
            columns: ColumnMap::default(),
            delimiter: b'|',
            line_ending: LineEnding::Lf,
            short_rows: ShortRowPolicy::Reject,
            min_cols: 3,
        }
    }
}
