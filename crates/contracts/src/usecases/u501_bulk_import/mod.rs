//! Пакетный импорт записей из таблицы: загрузка шаблона, проверка файла,
//! поштучное создание записей во внешнем API.

pub mod cell;
pub mod result;
pub mod session;
pub mod validation;

pub use cell::{CellValue, RawRow};
pub use result::{ImportResult, ImportRowError, UNKNOWN_ERROR};
pub use session::{
    ColumnView, CreateSessionResponse, ImportState, PreviewResponse, SessionView, TemplateInfo,
};
pub use validation::{ValidationError, ValidationReport};

/// Номер строки таблицы для записи с индексом `index` в списке данных.
/// Заголовок занимает строку 1, первая строка данных получает номер 2.
pub fn spreadsheet_row(index: usize) -> u32 {
    index as u32 + 2
}
