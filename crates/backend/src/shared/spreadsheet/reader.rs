use calamine::{open_workbook_auto_from_rs, Data, Reader};
use contracts::usecases::u501_bulk_import::CellValue;
use std::io::Cursor;

use super::SpreadsheetError;

/// Первый лист файла в виде строк ячеек (включая строку заголовка)
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

/// Расширение файла в нижнем регистре (`"Report.XLSX"` -> `"xlsx"`)
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.trim().rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Читает только первый лист книги. Остальные листы игнорируются.
pub fn read_first_sheet(file_name: &str, bytes: &[u8]) -> Result<Sheet, SpreadsheetError> {
    let ext = file_extension(file_name)
        .ok_or_else(|| SpreadsheetError::UnsupportedType(file_name.to_string()))?;

    match ext.as_str() {
        "csv" => read_csv(bytes),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(bytes),
        other => Err(SpreadsheetError::UnsupportedType(other.to_string())),
    }
}

fn read_workbook(bytes: &[u8]) -> Result<Sheet, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| SpreadsheetError::Parse(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let first = sheet_names
        .first()
        .cloned()
        .ok_or(SpreadsheetError::NoWorksheets)?;

    if sheet_names.len() > 1 {
        tracing::warn!(
            "Workbook has {} sheets, only '{}' is read (ignored: {:?})",
            sheet_names.len(),
            first,
            &sheet_names[1..]
        );
    }

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| SpreadsheetError::Parse(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(to_cell).collect())
        .collect();

    Ok(Sheet { name: first, rows })
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Blank,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}

fn read_csv(bytes: &[u8]) -> Result<Sheet, SpreadsheetError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| SpreadsheetError::Parse(format!("file is not valid UTF-8 text: {}", e)))?;

    // Strip UTF-8 BOM if present
    let text = text.trim_start_matches('\u{FEFF}');

    let text = mark_blank_lines(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SpreadsheetError::Parse(e.to_string()))?;
        if record.len() == 1 && record[0].trim().is_empty() {
            rows.push(Vec::new());
        } else {
            rows.push(record.iter().map(CellValue::from).collect());
        }
    }

    // Хвостовые пустые строки не считаются строками таблицы (как у calamine)
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }

    Ok(Sheet {
        name: "csv".to_string(),
        rows,
    })
}

/// csv пропускает пустые строки, и номера следующих строк сдвигаются.
/// Пустая строка вне кавычек получает пробел и читается как пустая запись.
fn mark_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_quotes = false;
    let mut line_start = true;

    for ch in text.chars() {
        if line_start && !in_quotes && (ch == '\n' || ch == '\r') {
            out.push(' ');
        }
        line_start = false;
        match ch {
            '"' => in_quotes = !in_quotes,
            '\n' if !in_quotes => line_start = true,
            _ => {}
        }
        out.push(ch);
    }
    out
}
