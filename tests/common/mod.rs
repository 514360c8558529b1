use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Column x positions of the price list layout used by the fixtures.
pub const COLUMNS: [i64; 8] = [40, 70, 150, 210, 260, 380, 430, 480];

/// One shown string: column index, baseline y, text.
pub type Cell<'a> = (usize, i64, &'a str);

pub fn create_test_pdf(
    path: &Path,
    pages: &[Vec<Cell<'_>>],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();

    for cells in pages {
        let mut operations = Vec::new();
        for (column, y, text) in cells {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 9.into()]),
                Operation::new("Td", vec![COLUMNS[*column].into(), (*y).into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]);
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path)?;
    Ok(())
}

/// Three pages: a price table with a wrapped header and wrapped cells, a page
/// of plain prose, and a continuation table without a header.
pub fn price_list_pages() -> Vec<Vec<Cell<'static>>> {
    vec![
        vec![
            (0, 800, "PRICE LIST"),
            (0, 760, "S.no"),
            (1, 760, "Brand"),
            (2, 760, "Size Code"),
            (3, 760, "Pack Type"),
            (4, 760, "Product Name"),
            (5, 760, "Qty"),
            (6, 760, "Cases"),
            (7, 760, "MRP"),
            (1, 750, "Number"),
            (0, 720, "1"),
            (1, 720, "ABC"),
            (2, 720, "X1"),
            (3, 720, "Bottle"),
            (4, 720, "Whisky"),
            (7, 720, "350.00"),
            (1, 710, "123"),
            (4, 710, "Gold"),
            (0, 690, "2"),
            (1, 690, "DEF"),
            (2, 690, "Y2"),
            (3, 690, "Can"),
            (4, 690, "Beer"),
            (5, 690, "12"),
            (6, 690, "2"),
            (7, 690, "90.00"),
        ],
        vec![(0, 700, "Prices are inclusive of all taxes.")],
        vec![
            (0, 780, "3"),
            (1, 780, "GHI"),
            (2, 780, "Z3"),
            (3, 780, "Pouch"),
            (4, 780, "Rum"),
            (5, 780, "48"),
            (6, 780, "1"),
            (7, 780, "110.00"),
        ],
    ]
}

pub const EXPECTED_OUTPUT: &str = "Brand Number|Size|Code|Pack Type|Product Name|MRP\n\
ABC 123|X1|X1|Bottle|Whisky Gold|350.00\n\
DEF|Y2|Y2|Can|Beer|90.00\n\
GHI|Z3|Z3|Pouch|Rum|110.00\n";
