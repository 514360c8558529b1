use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::{UTF_16BE, WINDOWS_1252};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::ConvertError;
use crate::model::{PageContent, TextFragment};
use crate::options::PageSelection;

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    if bytes.starts_with(&[0xFE, 0xFF]) || bytes.starts_with(&[0xFF, 0xFE]) {
        let bytes = if bytes.len() > 2 { &bytes[2..] } else { bytes };
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    if let Some(name) = encoding {
        let lower = name.to_ascii_lowercase();

        if lower.contains("utf16")
            || lower.contains("ucs2")
            || lower.contains("identity-h")
            || lower.contains("unicode")
        {
            let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
            if !had_errors && !utf16.is_empty() {
                return utf16.into_owned();
            }
        }

        if lower.contains("winansi") || lower.contains("1252") {
            let (latin, had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
            if !had_errors && !latin.is_empty() {
                return latin.into_owned();
            }
        }
    }

    String::from_utf8_lossy(bytes).to_string()
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn operand(operation: &Operation, index: usize) -> f32 {
    operation.operands.get(index).and_then(number).unwrap_or(0.0)
}

/// Text-space position tracking for one content stream. Only translation is
/// followed; glyph advance is ignored, so consecutive shows without a
/// positioning operator extend the same fragment.
#[derive(Default)]
struct TextCursor {
    line_x: f32,
    line_y: f32,
    leading: f32,
    open: Option<TextFragment>,
    fragments: Vec<TextFragment>,
}

impl TextCursor {
    fn close(&mut self) {
        if let Some(mut fragment) = self.open.take() {
            let trimmed = fragment.text.trim();
            if !trimmed.is_empty() {
                fragment.text = trimmed.to_string();
                self.fragments.push(fragment);
            }
        }
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.close();
        self.line_x = x;
        self.line_y = y;
    }

    fn next_line(&mut self) {
        self.move_to(self.line_x, self.line_y - self.leading);
    }

    fn show(&mut self, text: &str) {
        match &mut self.open {
            Some(fragment) => fragment.text.push_str(text),
            None => {
                self.open = Some(TextFragment::new(self.line_x, self.line_y, text));
            }
        }
    }
}

fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => {
                text.push_str(&decode_pdf_bytes(encoding, bytes));
            }
            Object::Array(items) => {
                collect_text(text, encoding, items);
                text.push(' ');
            }
            kerning => {
                if number(kerning).is_some_and(|value| value < -100.0) {
                    text.push(' ');
                }
            }
        }
    }
}

fn fragments_from_operations(
    operations: &[Operation],
    encodings: &BTreeMap<Vec<u8>, &str>,
) -> Vec<TextFragment> {
    let mut cursor = TextCursor::default();
    let mut current_encoding = None;

    for operation in operations {
        match operation.operator.as_str() {
            "BT" => cursor.move_to(0.0, 0.0),
            "ET" => cursor.close(),
            "Tf" => {
                if let Some(font_name) = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                {
                    current_encoding = encodings.get(font_name).copied();
                }
            }
            "TL" => cursor.leading = operand(operation, 0),
            "Td" => cursor.move_to(
                cursor.line_x + operand(operation, 0),
                cursor.line_y + operand(operation, 1),
            ),
            "TD" => {
                cursor.leading = -operand(operation, 1);
                cursor.move_to(
                    cursor.line_x + operand(operation, 0),
                    cursor.line_y + operand(operation, 1),
                );
            }
            "Tm" => cursor.move_to(operand(operation, 4), operand(operation, 5)),
            "T*" => cursor.next_line(),
            "Tj" | "TJ" | "'" | "\"" => {
                if operation.operator != "Tj" && operation.operator != "TJ" {
                    cursor.next_line();
                }
                let shown = if operation.operator == "\"" {
                    operation.operands.get(2..).unwrap_or_default()
                } else {
                    &operation.operands[..]
                };
                let mut text = String::new();
                collect_text(&mut text, current_encoding, shown);
                cursor.show(&text);
            }
            _ => {}
        }
    }

    cursor.close();
    cursor.fragments
}

fn extract_page_fragments(document: &Document, page_id: ObjectId) -> Vec<TextFragment> {
    let Some(content) = document
        .get_page_content(page_id)
        .ok()
        .and_then(|raw| Content::decode(&raw).ok())
    else {
        return Vec::new();
    };

    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    fragments_from_operations(&content.operations, &encodings)
}

fn collect_pages(
    document: &Document,
    page_selection: Option<&PageSelection>,
    plain_text: impl FnOnce() -> Option<String>,
) -> Result<Vec<PageContent>, ConvertError> {
    let pages_map = document.get_pages();

    let mut pages = Vec::new();
    for (page_no, page_id) in &pages_map {
        if page_selection.is_some_and(|selection| !selection.contains(*page_no)) {
            continue;
        }

        pages.push(PageContent {
            page_number: *page_no,
            fragments: extract_page_fragments(document, *page_id),
            text: String::new(),
        });
    }

    if pages.is_empty() {
        return Err(ConvertError::NoPagesSelected);
    }

    if pages.iter().any(|page| page.fragments.is_empty()) {
        let page_texts = plain_text()
            .map(|text| split_text_into_pages(&text))
            .unwrap_or_default();
        if page_texts.len() == pages_map.len() {
            for page in pages.iter_mut().filter(|page| page.fragments.is_empty()) {
                if let Some(index) = pages_map.keys().position(|no| *no == page.page_number) {
                    page.text.clone_from(&page_texts[index]);
                }
            }
        } else {
            debug!(
                extracted = page_texts.len(),
                expected = pages_map.len(),
                "plain text fallback does not line up with the page tree"
            );
        }
    }

    Ok(pages)
}

pub(crate) fn read_pdf_pages(
    input_pdf: &Path,
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageContent>, ConvertError> {
    let document = Document::load(input_pdf)?;
    collect_pages(&document, page_selection, || {
        pdf_extract::extract_text(input_pdf).ok()
    })
}

pub(crate) fn read_pdf_pages_from_bytes(
    input_pdf: &[u8],
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageContent>, ConvertError> {
    let document = Document::load_mem(input_pdf)?;
    collect_pages(&document, page_selection, || {
        pdf_extract::extract_text_from_mem(input_pdf).ok()
    })
}
