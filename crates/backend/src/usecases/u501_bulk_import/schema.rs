use contracts::enums::ImportTarget;
use contracts::usecases::u501_bulk_import::{CellValue, ColumnView, RawRow, ValidationError};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

/// Типы файлов, которые принимаются по умолчанию
pub const DEFAULT_ACCEPTED_FILE_TYPES: &[&str] = &["xlsx", "xls", "csv"];

/// Колонка шаблона импорта.
///
/// Каждая цель импорта описывает свои колонки перечислением, поэтому
/// правила проверки могут обращаться только к колонкам шаблона.
pub trait ImportColumn: Copy + Eq + std::fmt::Debug + Send + Sync + 'static {
    /// Все колонки в порядке шаблона
    const ALL: &'static [Self];

    /// Ключ колонки: заголовок в файле и в шаблоне
    fn key(self) -> &'static str;

    /// Заголовок для таблицы предпросмотра
    fn title(self) -> &'static str;

    /// Должна ли колонка присутствовать в заголовке файла
    fn required(self) -> bool {
        true
    }
}

/// Статическая конфигурация одной цели импорта
pub trait ImportSchema: Send + Sync + 'static {
    type Column: ImportColumn;
    type Record: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    fn target(&self) -> ImportTarget;

    fn template_file_name(&self) -> String {
        format!("{}_import_template.xlsx", self.target().code().replace('-', "_"))
    }

    /// Расширения файлов без точки, в нижнем регистре
    fn accepted_file_types(&self) -> &'static [&'static str] {
        DEFAULT_ACCEPTED_FILE_TYPES
    }

    /// Примеры записей для шаблона. Должны проходить проверку.
    fn template_rows(&self) -> Vec<Self::Record>;

    /// Значение ячейки для записи (шаблон, предпросмотр)
    fn cell(&self, record: &Self::Record, column: Self::Column) -> String;

    /// Отображение в предпросмотре, по умолчанию совпадает с `cell`
    fn render(&self, record: &Self::Record, column: Self::Column) -> String {
        self.cell(record, column)
    }

    /// Проверяет одну строку. Ошибки по полям накапливаются в `row`,
    /// запись принимается только если ошибок нет.
    fn validate_row(&self, row: &mut RowContext<'_, Self::Column>) -> Option<Self::Record>;

    /// Естественный ключ записи для поиска повторов внутри файла
    fn natural_key(&self, _record: &Self::Record) -> Option<(Self::Column, String)> {
        None
    }

    fn columns(&self) -> Vec<ColumnView> {
        Self::Column::ALL
            .iter()
            .map(|c| ColumnView {
                key: c.key().to_string(),
                title: c.title().to_string(),
                required: c.required(),
            })
            .collect()
    }

    fn required_keys(&self) -> Vec<&'static str> {
        Self::Column::ALL
            .iter()
            .filter(|c| c.required())
            .map(|c| c.key())
            .collect()
    }

    fn header_row(&self) -> Vec<String> {
        Self::Column::ALL
            .iter()
            .map(|c| c.key().to_string())
            .collect()
    }

    fn cells(&self, record: &Self::Record) -> Vec<String> {
        Self::Column::ALL
            .iter()
            .map(|c| self.cell(record, *c))
            .collect()
    }

    fn rendered(&self, record: &Self::Record) -> Vec<String> {
        Self::Column::ALL
            .iter()
            .map(|c| self.render(record, *c))
            .collect()
    }
}

/// Контекст проверки одной строки
pub struct RowContext<'a, C: ImportColumn> {
    row: &'a RawRow,
    errors: Vec<ValidationError>,
    _columns: PhantomData<C>,
}

impl<'a, C: ImportColumn> RowContext<'a, C> {
    pub fn new(row: &'a RawRow) -> Self {
        Self {
            row,
            errors: Vec::new(),
            _columns: PhantomData,
        }
    }

    pub fn row_number(&self) -> u32 {
        self.row.row
    }

    /// Обрезанное значение колонки, `""` если пусто
    pub fn text(&self, column: C) -> String {
        self.row.text(column.key())
    }

    /// Строка пустая по всем колонкам шаблона
    pub fn is_blank(&self) -> bool {
        C::ALL.iter().all(|c| self.text(*c).is_empty())
    }

    /// Применяет правило к значению колонки. При ошибке она запоминается
    /// и возвращается `None`.
    pub fn field<T>(
        &mut self,
        column: C,
        rule: impl FnOnce(&str) -> Result<T, String>,
    ) -> Option<T> {
        let value = self.text(column);
        match rule(&value) {
            Ok(v) => Some(v),
            Err(message) => {
                self.push_error(column, message);
                None
            }
        }
    }

    pub fn push_error(&mut self, column: C, message: impl Into<String>) {
        let value = self
            .row
            .get(column.key())
            .map(cell_json)
            .unwrap_or(serde_json::Value::Null);
        self.errors
            .push(ValidationError::new(self.row.row, column.key(), message, value));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

fn cell_json(cell: &CellValue) -> serde_json::Value {
    match cell {
        CellValue::Blank => serde_json::Value::Null,
        CellValue::Bool(b) => serde_json::Value::Bool(*b),
        CellValue::Number(n) => serde_json::json!(n),
        CellValue::Text(s) => serde_json::Value::String(s.clone()),
    }
}
