use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ошибка проверки одной ячейки (или всего файла при `row == 0`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Номер строки в таблице; 0 - ошибка уровня файла
    pub row: u32,
    pub field: String,
    pub message: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl ValidationError {
    pub fn new(
        row: u32,
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
            value: value.into(),
        }
    }

    /// Ошибка уровня файла (не удалось прочитать, нет листов, нет данных)
    pub fn file_level(message: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(0, "file", message, value)
    }

    /// В заголовке не хватает обязательных колонок
    pub fn missing_headers(missing: Vec<String>) -> Self {
        let message = format!("Missing required columns: {}", missing.join(", "));
        Self::new(0, "headers", message, missing)
    }

    pub fn is_file_level(&self) -> bool {
        self.row == 0
    }
}

/// Результат проверки файла: ошибки и записи, прошедшие проверку целиком
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport<T> {
    pub errors: Vec<ValidationError>,
    pub valid: Vec<T>,
    /// Количество строк данных (без заголовка)
    pub total_rows: usize,
    /// Полностью пустые строки, пропущенные без проверки
    pub skipped_rows: usize,
}

impl<T> ValidationReport<T> {
    pub fn empty() -> Self {
        Self {
            errors: Vec::new(),
            valid: Vec::new(),
            total_rows: 0,
            skipped_rows: 0,
        }
    }

    /// Отчет с единственной ошибкой уровня файла
    pub fn rejected(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
            ..Self::empty()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_file_error(&self) -> bool {
        self.errors.iter().any(ValidationError::is_file_level)
    }

    /// Количество разных строк, по которым есть хотя бы одна ошибка
    pub fn rejected_rows(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| !e.is_file_level())
            .map(|e| e.row)
            .collect::<BTreeSet<_>>()
            .len()
    }
}
