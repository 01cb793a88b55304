//! CSV writer

use super::ExportTable;
use crate::core::error::ExportError;

pub fn write(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(&table.headers)
        .map_err(|e| ExportError::Csv(e.to_string()))?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|cell| cell.text()))
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}
