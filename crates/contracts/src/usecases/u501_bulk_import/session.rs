use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ImportResult, ValidationError};
use crate::enums::ImportTarget;

/// Состояние сессии импорта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportState {
    /// Файл не выбран
    Idle,
    /// Файл выбран, проверка еще не запускалась
    FileSelected,
    /// Идет проверка файла
    Validating,
    /// Проверка нашла ошибки, импорт недоступен
    ValidationFailed,
    /// Ошибок нет, записи готовы к импорту
    PreviewReady,
    /// Идет создание записей
    Importing,
    /// Импорт завершен (с ошибками или без)
    ImportComplete,
}

impl ImportState {
    /// Можно ли сейчас принять новый файл
    pub fn accepts_file(&self) -> bool {
        !matches!(self, ImportState::Validating | ImportState::Importing)
    }

    pub fn can_import(&self) -> bool {
        matches!(self, ImportState::PreviewReady)
    }
}

/// Колонка таблицы предпросмотра
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnView {
    pub key: String,
    pub title: String,
    pub required: bool,
}

/// Снимок состояния сессии для клиента
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub target: ImportTarget,
    pub state: ImportState,
    pub file_name: Option<String>,
    pub errors: Vec<ValidationError>,
    pub valid_count: usize,
    pub skipped_rows: usize,
    /// Сколько записей уже отправлено во время импорта
    pub processed: usize,
    pub result: Option<ImportResult>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub columns: Vec<ColumnView>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Описание шаблона для загрузки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub target: ImportTarget,
    pub file_name: String,
    pub content_type: String,
    pub columns: Vec<ColumnView>,
    pub accepted_file_types: Vec<String>,
}
