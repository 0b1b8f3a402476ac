use thiserror::Error;

use super::session::SessionError;
use crate::shared::spreadsheet::SpreadsheetError;

/// Ошибки UseCase пакетного импорта.
///
/// Ошибки проверки файла сюда не попадают: они возвращаются как данные
/// в `ValidationReport`.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Template generation failed: {0}")]
    Template(#[source] SpreadsheetError),

    #[error("Failed to build report: {0}")]
    Report(#[source] SpreadsheetError),

    #[error("Import session not found: {0}")]
    SessionNotFound(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Import task failed: {0}")]
    Task(String),
}
