//! XLSX writer

use super::{ExportCell, ExportTable};
use crate::core::error::ExportError;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Excel caps sheet names at 31 characters
const MAX_SHEET_NAME: usize = 31;

fn to_export_error(e: XlsxError) -> ExportError {
    ExportError::Spreadsheet(e.to_string())
}

pub fn write(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let decimal = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    let name: String = table.name.chars().take(MAX_SHEET_NAME).collect();
    sheet.set_name(&name).map_err(to_export_error)?;

    for (col, title) in table.headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, title, &header)
            .map_err(to_export_error)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                ExportCell::Number { value, .. } => {
                    sheet
                        .write_number_with_format(r, c, *value, &decimal)
                        .map_err(to_export_error)?;
                }
                ExportCell::Text(text) if text.is_empty() => {}
                ExportCell::Text(text) => {
                    sheet.write_string(r, c, text).map_err(to_export_error)?;
                }
            }
        }
    }

    sheet.autofit();
    workbook.save_to_buffer().map_err(to_export_error)
}
