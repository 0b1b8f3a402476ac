use contracts::usecases::u501_bulk_import::TemplateInfo;

use super::error::ImportError;
use super::schema::ImportSchema;
use crate::shared::spreadsheet::{self, XLSX_CONTENT_TYPE};

const TEMPLATE_SHEET_NAME: &str = "Template";

/// Готовый файл шаблона для скачивания
#[derive(Debug, Clone)]
pub struct TemplateFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Формирует xlsx-шаблон: строка с ключами колонок и строки-примеры.
/// Ошибка записи книги возвращается как `ImportError::Template`.
pub fn generate<S: ImportSchema>(schema: &S) -> Result<TemplateFile, ImportError> {
    let headers = schema.header_row();
    let rows: Vec<Vec<String>> = schema
        .template_rows()
        .iter()
        .map(|record| schema.cells(record))
        .collect();

    let bytes = spreadsheet::write_single_sheet(TEMPLATE_SHEET_NAME, &headers, &rows)
        .map_err(|e| {
            tracing::error!("[{}] Template generation failed: {}", schema.target(), e);
            ImportError::Template(e)
        })?;

    tracing::debug!(
        "[{}] Template generated: {} example rows, {} bytes",
        schema.target(),
        rows.len(),
        bytes.len()
    );

    Ok(TemplateFile {
        file_name: schema.template_file_name(),
        content_type: XLSX_CONTENT_TYPE,
        bytes,
    })
}

pub fn info<S: ImportSchema>(schema: &S) -> TemplateInfo {
    TemplateInfo {
        target: schema.target(),
        file_name: schema.template_file_name(),
        content_type: XLSX_CONTENT_TYPE.to_string(),
        columns: schema.columns(),
        accepted_file_types: schema
            .accepted_file_types()
            .iter()
            .map(|t| t.to_string())
            .collect(),
    }
}
