/// One extracted cell. `None` marks a cell the layout had no text for.
pub type Cell = Option<String>;

pub const OUTPUT_HEADER: [&str; 6] = [
    "Brand Number",
    "Size",
    "Code",
    "Pack Type",
    "Product Name",
    "MRP",
];

/// A run of shown text and the text-space origin it was drawn at.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

impl TextFragment {
    #[must_use]
    pub fn new(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageContent {
    pub page_number: u32,
    pub fragments: Vec<TextFragment>,
    /// Plain page text, only filled when the content stream gave no fragments.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageTable {
    pub page: u32,
    pub rows: Vec<Vec<Cell>>,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputRecord {
    pub brand_number: String,
    pub size: String,
    pub code: String,
    pub pack_type: String,
    pub product_name: String,
    pub mrp: String,
}

impl OutputRecord {
    #[must_use]
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.brand_number,
            &self.size,
            &self.code,
            &self.pack_type,
            &self.product_name,
            &self.mrp,
        ]
    }
}
