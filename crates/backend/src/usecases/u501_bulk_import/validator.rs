use contracts::usecases::u501_bulk_import::{
    cell::normalize_header, spreadsheet_row, CellValue, RawRow, ValidationError, ValidationReport,
};
use std::collections::{HashMap, HashSet};

use super::schema::{ImportSchema, RowContext};
use crate::shared::spreadsheet::{self, SpreadsheetError};

/// Проверяет загруженный файл и делит строки на валидные записи и ошибки.
///
/// Читается только первый лист, первая строка - заголовок. Ошибки уровня
/// файла (тип, разбор, пустой лист, нет колонок, слишком много строк)
/// возвращаются единственной ошибкой с `row == 0`. Функция не паникует
/// и не возвращает `Err`: все проблемы файла - это данные отчета.
pub fn validate<S: ImportSchema>(
    schema: &S,
    file_name: &str,
    bytes: &[u8],
    max_rows: usize,
) -> ValidationReport<S::Record> {
    let accepted = schema.accepted_file_types();
    let extension = spreadsheet::file_extension(file_name).unwrap_or_default();
    if !accepted.contains(&extension.as_str()) {
        return ValidationReport::rejected(ValidationError::file_level(
            format!(
                "Unsupported file type '{}'. Accepted: {}",
                extension,
                accepted.join(", ")
            ),
            file_name,
        ));
    }

    let sheet = match spreadsheet::read_first_sheet(file_name, bytes) {
        Ok(sheet) => sheet,
        Err(e) => {
            tracing::warn!("[{}] Failed to read {}: {}", schema.target(), file_name, e);
            return ValidationReport::rejected(file_error(e, file_name));
        }
    };

    if sheet.rows.len() < 2 {
        return ValidationReport::rejected(ValidationError::file_level(
            "The file must contain a header row and at least one data row",
            sheet.rows.len(),
        ));
    }

    let headers: Vec<String> = sheet.rows[0].iter().map(CellValue::normalized).collect();
    let present: HashSet<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let missing: Vec<String> = schema
        .required_keys()
        .into_iter()
        .filter(|key| !present.contains(&normalize_header(key)))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return ValidationReport::rejected(ValidationError::missing_headers(missing));
    }

    let data_rows = &sheet.rows[1..];
    if data_rows.len() > max_rows {
        return ValidationReport::rejected(ValidationError::file_level(
            format!(
                "Too many rows: {} (maximum {} per file)",
                data_rows.len(),
                max_rows
            ),
            data_rows.len(),
        ));
    }

    let mut report = ValidationReport::empty();
    report.total_rows = data_rows.len();
    let mut seen_keys: HashMap<String, u32> = HashMap::new();

    for (index, cells) in data_rows.iter().enumerate() {
        let raw = to_raw_row(spreadsheet_row(index), &headers, cells);
        let mut ctx: RowContext<'_, S::Column> = RowContext::new(&raw);

        if ctx.is_blank() {
            report.skipped_rows += 1;
            continue;
        }

        let record = schema.validate_row(&mut ctx);

        if let Some(record) = record.as_ref().filter(|_| !ctx.has_errors()) {
            if let Some((column, key)) = schema.natural_key(record) {
                let key = key.trim().to_lowercase();
                match seen_keys.get(&key) {
                    Some(first_row) => ctx.push_error(
                        column,
                        format!("Duplicate value in file (first seen at row {})", first_row),
                    ),
                    None => {
                        seen_keys.insert(key, raw.row);
                    }
                }
            }
        }

        match record {
            Some(record) if !ctx.has_errors() => report.valid.push(record),
            Some(_) => report.errors.extend(ctx.into_errors()),
            None if ctx.has_errors() => report.errors.extend(ctx.into_errors()),
            None => report.errors.push(ValidationError::new(
                raw.row,
                "row",
                "Row could not be validated",
                serde_json::Value::Null,
            )),
        }
    }

    tracing::info!(
        "[{}] Validated {}: {} rows, {} valid, {} rejected, {} skipped",
        schema.target(),
        file_name,
        report.total_rows,
        report.valid.len(),
        report.rejected_rows(),
        report.skipped_rows
    );

    report
}

fn file_error(error: SpreadsheetError, file_name: &str) -> ValidationError {
    ValidationError::file_level(error.to_string(), file_name)
}

/// Собирает строку по заголовкам; при повторе заголовка берется первая колонка
fn to_raw_row(row_number: u32, headers: &[String], cells: &[CellValue]) -> RawRow {
    let mut raw = RawRow::new(row_number);
    for (col_idx, header) in headers.iter().enumerate() {
        if header.is_empty() || raw.get(header).is_some() {
            continue;
        }
        let value = cells.get(col_idx).cloned().unwrap_or(CellValue::Blank);
        raw.insert(header, value);
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_faq::FaqImport;
    use crate::domain::a002_vehicle_make::VehicleMakeImport;
    use crate::shared::spreadsheet::write_single_sheet;
    use contracts::domain::a001_faq::FaqEntry;

    const MAX_ROWS: usize = 100;

    fn faq_csv(body: &str) -> ValidationReport<FaqEntry> {
        validate(&FaqImport, "faq.csv", body.as_bytes(), MAX_ROWS)
    }

    #[test]
    fn faq_example_scenario() {
        let report = faq_csv(
            "title,description\n\
             What is your return policy?,We offer a 30-day return policy.\n\
             ,Missing title\n\
             Valid Q,\n",
        );

        assert_eq!(
            report.valid,
            vec![FaqEntry::new(
                "What is your return policy?",
                "We offer a 30-day return policy."
            )]
        );
        assert_eq!(report.errors.len(), 2);
        assert_eq!((report.errors[0].row, report.errors[0].field.as_str()), (3, "title"));
        assert_eq!(
            (report.errors[1].row, report.errors[1].field.as_str()),
            (4, "description")
        );
    }

    #[test]
    fn blank_rows_are_skipped_and_counted() {
        let report = faq_csv("title,description\nQ1,A1\n,\n  ,  \nQ2,A2\n");
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.skipped_rows, 2);
        assert_eq!(report.valid.len(), 2);
        assert!(report.is_clean());
    }

    #[test]
    fn empty_lines_count_as_skipped_rows() {
        let report = faq_csv("title,description\nQ1,A1\n\nQ3,\n");
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!((report.errors[0].row, report.errors[0].field.as_str()), (4, "description"));
    }

    #[test]
    fn row_counts_are_conserved() {
        let report = faq_csv("title,description\nQ1,A1\n,\n,only answer\nQ3,\n,\nQ5,A5\n");
        assert_eq!(
            report.valid.len() + report.rejected_rows() + report.skipped_rows,
            report.total_rows
        );
        assert_eq!(report.valid.len(), 2);
        assert_eq!(report.rejected_rows(), 2);
        assert_eq!(report.skipped_rows, 2);
    }

    #[test]
    fn row_with_one_bad_field_is_rejected_entirely() {
        let report = validate(
            &VehicleMakeImport,
            "makes.csv",
            b"make,short_code,status\nToyota,TOY,retired\n",
            MAX_ROWS,
        );
        assert!(report.valid.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "status");
        assert_eq!(report.errors[0].row, 2);
        assert_eq!(report.errors[0].value, serde_json::json!("retired"));
    }

    #[test]
    fn every_failed_field_is_reported() {
        let report = validate(
            &VehicleMakeImport,
            "makes.csv",
            b"make,short_code,status\n,X,unknown\n",
            MAX_ROWS,
        );
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["make", "short_code", "status"]);
        assert_eq!(report.rejected_rows(), 1);
    }

    #[test]
    fn headers_are_case_insensitive_and_extra_columns_ignored() {
        let report = faq_csv(" Title ,DESCRIPTION,notes\nQ,A,ignored\n");
        assert_eq!(report.valid, vec![FaqEntry::new("Q", "A")]);
    }

    #[test]
    fn missing_headers_reject_the_file() {
        let report = faq_csv("title,answer\nQ,A\n");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 0);
        assert_eq!(report.errors[0].field, "headers");
        assert_eq!(report.errors[0].value, serde_json::json!(["description"]));
        assert!(report.valid.is_empty());
    }

    #[test]
    fn header_only_file_is_rejected() {
        let report = faq_csv("title,description\n");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "file");
        assert!(report.has_file_error());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let report = validate(&FaqImport, "faq.pdf", b"%PDF-1.4", MAX_ROWS);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "file");
        assert!(report.errors[0].message.contains("pdf"));
    }

    #[test]
    fn malformed_workbook_becomes_file_error() {
        let report = validate(&FaqImport, "faq.xlsx", b"not a workbook", MAX_ROWS);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 0);
        assert_eq!(report.errors[0].field, "file");
        assert!(report.errors[0].message.starts_with("Failed to parse file"));
    }

    #[test]
    fn too_many_rows_is_a_file_error() {
        let report = validate(&FaqImport, "faq.csv", b"title,description\nA,B\nC,D\n", 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.starts_with("Too many rows"));
    }

    #[test]
    fn duplicate_keys_in_file_are_reported() {
        let report = faq_csv("title,description\nSame,A\nsame ,B\n");
        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 3);
        assert!(report.errors[0].message.contains("row 2"));
    }

    #[test]
    fn xlsx_numbers_are_normalized() {
        let headers = vec![
            "make".to_string(),
            "short_code".to_string(),
            "status".to_string(),
        ];
        let rows = vec![vec![
            " Lada ".to_string(),
            "vaz".to_string(),
            "ACTIVE".to_string(),
        ]];
        let bytes = write_single_sheet("Makes", &headers, &rows).unwrap();
        let report = validate(&VehicleMakeImport, "makes.xlsx", &bytes, MAX_ROWS);
        assert!(report.is_clean(), "{:?}", report.errors);
        assert_eq!(report.valid[0].make, "Lada");
        assert_eq!(report.valid[0].short_code, "VAZ");
    }
}
