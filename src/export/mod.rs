//! Report exports of a registry listing
//!
//! A listing is first flattened into an [`ExportTable`] (display-formatted
//! cells in column order), then rendered by one of the writers:
//!
//! - [`delimited`]: CSV with a header row
//! - [`spreadsheet`]: XLSX with a bold header row
//! - [`document`]: A4 landscape PDF with a title and paginated rows

pub mod delimited;
pub mod document;
pub mod spreadsheet;

use crate::core::entity::{ColumnFormat, Record, Status};
use crate::core::error::{BackofficeError, ExportError, ValidationError};
use crate::core::field::FieldValue;
use crate::core::validation::documents::{mask_document, mask_phone, mask_zip_code};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<Self, BackofficeError> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "pdf" => Ok(Self::Pdf),
            other => Err(ValidationError::InvalidQuery {
                parameter: "format".to_string(),
                message: format!("unsupported export format '{}' (csv, xlsx, pdf)", other),
            }
            .into()),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }
}

/// One rendered cell; numbers keep their value for spreadsheets
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Number { value: f64, text: String },
}

impl ExportCell {
    pub fn text(&self) -> &str {
        match self {
            ExportCell::Text(text) | ExportCell::Number { text, .. } => text,
        }
    }
}

/// A listing ready to be written in any format
#[derive(Debug, Clone)]
pub struct ExportTable {
    pub title: String,
    /// Sheet name and file name prefix (the registry plural)
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ExportCell>>,
}

impl ExportTable {
    /// Flatten records along their table columns
    pub fn from_records<T: Record>(name: &str, records: &[T]) -> Self {
        let columns = T::columns();
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| {
                        let value = record.field_value(column.key).unwrap_or(FieldValue::Null);
                        format_cell(&value, column.format)
                    })
                    .collect()
            })
            .collect();

        Self {
            title: T::title().to_string(),
            name: name.to_string(),
            headers: columns.iter().map(|c| c.header.to_string()).collect(),
            rows,
        }
    }

    /// `{name}-{YYYYMMDD}.{ext}`
    pub fn file_name(&self, format: ExportFormat, at: DateTime<Utc>) -> String {
        format!("{}-{}.{}", self.name, at.format("%Y%m%d"), format.extension())
    }

    /// Render the table in the requested format
    pub fn render(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Csv => delimited::write(self),
            ExportFormat::Xlsx => spreadsheet::write(self),
            ExportFormat::Pdf => document::write(self),
        }
    }
}

/// Render a field value for display in a report
pub fn format_cell(value: &FieldValue, format: ColumnFormat) -> ExportCell {
    if value.is_null() {
        return ExportCell::Text(String::new());
    }
    let text = value.display();

    match format {
        ColumnFormat::Text => ExportCell::Text(text),
        ColumnFormat::Document => ExportCell::Text(mask_document(&text)),
        ColumnFormat::Phone => ExportCell::Text(mask_phone(&text)),
        ColumnFormat::ZipCode => ExportCell::Text(mask_zip_code(&text)),
        ColumnFormat::Date => ExportCell::Text(format_date(&text)),
        ColumnFormat::Decimal => match value.as_f64() {
            Some(value) => ExportCell::Number {
                value,
                text: format!("{:.2}", value),
            },
            None => ExportCell::Text(text),
        },
        ColumnFormat::Integer => match value.as_f64() {
            Some(value) => ExportCell::Number {
                value,
                text: format!("{:.0}", value),
            },
            None => ExportCell::Text(text),
        },
        ColumnFormat::Status => ExportCell::Text(
            serde_json::from_value::<Status>(serde_json::Value::String(text.clone()))
                .map(|s| s.label().to_string())
                .unwrap_or(text),
        ),
    }
}

/// `YYYY-MM-DD` (or an RFC 3339 timestamp) as `dd/mm/yyyy`
fn format_date(text: &str) -> String {
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.date_naive())
    });
    match date {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => text.to_string(),
    }
}

/// A rendered export as an HTTP attachment
pub struct ExportFile {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn build(table: &ExportTable, format: ExportFormat) -> Result<Self, ExportError> {
        let bytes = table.render(format)?;
        tracing::info!(
            registry = %table.name,
            format = format.extension(),
            rows = table.rows.len(),
            bytes = bytes.len(),
            "export rendered"
        );
        Ok(Self {
            format,
            file_name: table.file_name(format, Utc::now()),
            bytes,
        })
    }
}

impl IntoResponse for ExportFile {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.file_name);
        let disposition = HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
        (
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(self.format.content_type()),
                ),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}
