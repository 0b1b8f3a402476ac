use rust_xlsxwriter::{Format, Workbook};

use super::SpreadsheetError;

const MIN_COLUMN_WIDTH: usize = 12;
const MAX_COLUMN_WIDTH: usize = 60;

/// Книга из одного листа: жирная строка заголовка и строки данных.
/// Ширина колонок подбирается по самому длинному значению.
pub fn write_single_sheet(
    sheet_name: &str,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<Vec<u8>, SpreadsheetError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(row_idx as u32 + 1, col as u16, value)?;
        }
    }

    for (col, header) in headers.iter().enumerate() {
        let longest = rows
            .iter()
            .filter_map(|row| row.get(col))
            .map(|value| value.chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0);
        let width = (longest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// CSV с заголовком (используется для выгрузки отчета об ошибках)
pub fn write_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, SpreadsheetError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| SpreadsheetError::Csv(csv::Error::from(e.into_error())))
}
