//! Чтение и запись табличных файлов (xlsx/xls/ods/csv)

pub mod reader;
pub mod writer;

use thiserror::Error;

pub use reader::{file_extension, read_first_sheet, Sheet};
pub use writer::{write_csv, write_single_sheet};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Ошибки работы с табличными файлами
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Failed to parse file: {0}")]
    Parse(String),

    #[error("The file contains no worksheets")]
    NoWorksheets,

    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}
