//! PDF writer: A4 landscape, title, header row, paginated rows

use super::ExportTable;
use crate::core::error::ExportError;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const TITLE_SIZE: f32 = 16.0;
const TEXT_SIZE: f32 = 8.0;
const ROW_HEIGHT: f32 = 6.0;
/// Approximate width of a Helvetica glyph at `TEXT_SIZE`
const CHAR_WIDTH: f32 = 1.6;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Rows that fit under the header on one page
pub fn rows_per_page() -> usize {
    let top = PAGE_HEIGHT - MARGIN - 2.0 * ROW_HEIGHT - ROW_HEIGHT;
    let bottom = MARGIN + ROW_HEIGHT;
    ((top - bottom) / ROW_HEIGHT) as usize
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

pub fn write(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let pdf_error = |e: printpdf::Error| ExportError::Pdf(format!("{:?}", e));

    let (doc, first_page, first_layer) =
        PdfDocument::new(&table.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "rows");
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    };

    let columns = table.headers.len().max(1);
    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / columns as f32;
    let max_chars = ((column_width / CHAR_WIDTH) as usize).max(4);

    let chunks: Vec<_> = if table.rows.is_empty() {
        vec![&table.rows[..]]
    } else {
        table.rows.chunks(rows_per_page()).collect()
    };
    let total_pages = chunks.len();

    for (index, rows) in chunks.into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "rows");
            doc.get_page(page).get_layer(layer)
        };

        let mut y = PAGE_HEIGHT - MARGIN;
        layer.use_text(&table.title, TITLE_SIZE, Mm(MARGIN), Mm(y), &fonts.bold);
        y -= 2.0 * ROW_HEIGHT;

        write_row(
            &layer,
            table.headers.iter().map(String::as_str),
            y,
            column_width,
            max_chars,
            &fonts.bold,
        );
        y -= ROW_HEIGHT;

        for row in rows {
            write_row(
                &layer,
                row.iter().map(|cell| cell.text()),
                y,
                column_width,
                max_chars,
                &fonts.regular,
            );
            y -= ROW_HEIGHT;
        }

        layer.use_text(
            format!("{} / {}", index + 1, total_pages),
            TEXT_SIZE,
            Mm(PAGE_WIDTH - MARGIN - 10.0),
            Mm(MARGIN / 2.0),
            &fonts.regular,
        );
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn write_row<'a>(
    layer: &PdfLayerReference,
    cells: impl Iterator<Item = &'a str>,
    y: f32,
    column_width: f32,
    max_chars: usize,
    font: &IndirectFontRef,
) {
    for (col, text) in cells.enumerate() {
        if text.is_empty() {
            continue;
        }
        let x = MARGIN + col as f32 * column_width;
        layer.use_text(truncate(text, max_chars), TEXT_SIZE, Mm(x), Mm(y), font);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportCell;

    fn table(rows: usize) -> ExportTable {
        ExportTable {
            title: "Clients".into(),
            name: "clients".into(),
            headers: vec!["Name".into(), "City".into()],
            rows: (0..rows)
                .map(|i| {
                    vec![
                        ExportCell::Text(format!("Client {i}")),
                        ExportCell::Text("Campinas".into()),
                    ]
                })
                .collect(),
        }
    }

    #[test]
    fn test_writes_pdf() {
        let bytes = write(&table(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_empty_and_multi_page() {
        assert!(write(&table(0)).unwrap().starts_with(b"%PDF"));
        assert!(write(&table(rows_per_page() * 2 + 1)).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long client name", 6), "a l...");
    }
}
