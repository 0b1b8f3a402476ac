use serde::{Deserialize, Serialize};

use super::spreadsheet_row;

/// Текст ошибки, если внешний API не вернул сообщения
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Ошибка создания одной записи
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRowError {
    /// Номер строки в исходной таблице (та же нумерация, что у ошибок проверки)
    pub row: u32,
    pub error: String,
}

/// Итог импорта пачки записей
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<ImportRowError>,
}

impl ImportResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.success += 1;
    }

    /// Фиксирует неудачу для записи с индексом `index` в списке валидных записей
    pub fn record_failure(&mut self, index: usize, message: impl Into<String>) {
        let message = message.into();
        let error = if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        };
        self.failed += 1;
        self.errors.push(ImportRowError {
            row: spreadsheet_row(index),
            error,
        });
    }

    /// Сколько записей было отправлено
    pub fn attempted(&self) -> usize {
        self.success + self.failed
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}
