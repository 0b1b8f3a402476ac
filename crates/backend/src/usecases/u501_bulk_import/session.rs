use chrono::{DateTime, Utc};
use contracts::enums::ImportTarget;
use contracts::usecases::u501_bulk_import::{
    ImportResult, ImportState, SessionView, ValidationError, ValidationReport,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session is busy ({0:?}), try again when it finishes")]
    Busy(ImportState),

    #[error("Cannot {action} in state {state:?}")]
    InvalidState {
        state: ImportState,
        action: &'static str,
    },
}

/// Выбранный пользователем файл
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Сессия импорта одного файла.
///
/// Переходы:
/// `Idle -> FileSelected -> Validating -> ValidationFailed | PreviewReady`,
/// `PreviewReady -> Importing -> ImportComplete` (или `Idle`, если ошибок нет),
/// `ValidationFailed -> Idle` через `clear_errors`.
/// Пока идет проверка или импорт, новый файл не принимается.
#[derive(Debug)]
pub struct ImportSession<R> {
    id: String,
    target: ImportTarget,
    state: ImportState,
    file: Option<StagedFile>,
    errors: Vec<ValidationError>,
    valid: Vec<R>,
    skipped_rows: usize,
    processed: Arc<AtomicUsize>,
    result: Option<ImportResult>,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<R: Clone> ImportSession<R> {
    pub fn new(id: impl Into<String>, target: ImportTarget) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            target,
            state: ImportState::Idle,
            file: None,
            errors: Vec::new(),
            valid: Vec::new(),
            skipped_rows: 0,
            processed: Arc::new(AtomicUsize::new(0)),
            result: None,
            started_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn result(&self) -> Option<&ImportResult> {
        self.result.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.name.as_str())
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Счетчик отправленных записей; обновляется без блокировки сессии
    pub fn progress_counter(&self) -> Arc<AtomicUsize> {
        self.processed.clone()
    }

    /// Новый файл сбрасывает результаты предыдущей проверки и импорта
    pub fn select_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<(), SessionError> {
        if !self.state.accepts_file() {
            return Err(SessionError::Busy(self.state));
        }
        self.clear_staging();
        self.result = None;
        self.file = Some(StagedFile {
            name: name.into(),
            bytes,
        });
        self.transition(ImportState::FileSelected);
        Ok(())
    }

    /// `FileSelected -> Validating`; возвращает копию файла для проверки
    pub fn begin_validation(&mut self) -> Result<StagedFile, SessionError> {
        self.require(ImportState::FileSelected, "validate")?;
        let file = self
            .file
            .clone()
            .ok_or(SessionError::InvalidState {
                state: self.state,
                action: "validate without a file",
            })?;
        self.transition(ImportState::Validating);
        Ok(file)
    }

    /// `Validating -> ValidationFailed | PreviewReady`
    pub fn finish_validation(&mut self, report: ValidationReport<R>) -> Result<ImportState, SessionError> {
        self.require(ImportState::Validating, "finish validation")?;

        self.skipped_rows = report.skipped_rows;
        self.valid = report.valid;
        self.errors = report.errors;

        if self.errors.is_empty() && self.valid.is_empty() {
            self.errors.push(ValidationError::file_level(
                "The file contains no data rows",
                report.total_rows,
            ));
        }

        let next = if self.errors.is_empty() {
            ImportState::PreviewReady
        } else {
            ImportState::ValidationFailed
        };
        self.transition(next);
        Ok(next)
    }

    /// Проверка файла в одном вызове (для синхронных сценариев и тестов)
    pub fn validate_with(
        &mut self,
        validate: impl FnOnce(&str, &[u8]) -> ValidationReport<R>,
    ) -> Result<ImportState, SessionError> {
        let file = self.begin_validation()?;
        let report = validate(&file.name, &file.bytes);
        self.finish_validation(report)
    }

    /// Записи для предпросмотра
    pub fn preview(&self) -> Result<&[R], SessionError> {
        match self.state {
            ImportState::PreviewReady | ImportState::ImportComplete => Ok(&self.valid),
            state => Err(SessionError::InvalidState {
                state,
                action: "preview records",
            }),
        }
    }

    pub fn valid_count(&self) -> usize {
        self.valid.len()
    }

    /// `PreviewReady -> Importing`; возвращает записи для отправки
    pub fn begin_import(&mut self) -> Result<Vec<R>, SessionError> {
        if self.state == ImportState::Importing {
            return Err(SessionError::Busy(self.state));
        }
        self.require(ImportState::PreviewReady, "import")?;
        self.processed.store(0, Ordering::SeqCst);
        self.result = None;
        self.transition(ImportState::Importing);
        Ok(self.valid.clone())
    }

    /// `Importing -> ImportComplete`.
    /// Если ошибок нет, файл и записи очищаются и сессия возвращается в `Idle`,
    /// результат остается доступен.
    pub fn finish_import(&mut self, result: ImportResult) -> Result<ImportState, SessionError> {
        self.require(ImportState::Importing, "finish import")?;

        let next = if result.is_complete_success() {
            self.clear_staging();
            ImportState::Idle
        } else {
            ImportState::ImportComplete
        };
        self.result = Some(result);
        self.transition(next);
        Ok(next)
    }

    /// `ValidationFailed -> Idle`, чтобы загрузить исправленный файл
    pub fn clear_errors(&mut self) -> Result<(), SessionError> {
        self.require(ImportState::ValidationFailed, "clear errors")?;
        self.clear_staging();
        self.transition(ImportState::Idle);
        Ok(())
    }

    /// Полный сброс (кроме активной проверки/импорта)
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if !self.state.accepts_file() {
            return Err(SessionError::Busy(self.state));
        }
        self.clear_staging();
        self.result = None;
        self.transition(ImportState::Idle);
        Ok(())
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            target: self.target,
            state: self.state,
            file_name: self.file_name().map(str::to_string),
            errors: self.errors.clone(),
            valid_count: self.valid.len(),
            skipped_rows: self.skipped_rows,
            processed: self.processed.load(Ordering::SeqCst),
            result: self.result.clone(),
            started_at: self.started_at,
            updated_at: self.updated_at,
        }
    }

    fn clear_staging(&mut self) {
        self.file = None;
        self.errors.clear();
        self.valid.clear();
        self.skipped_rows = 0;
        self.processed.store(0, Ordering::SeqCst);
    }

    fn require(&self, expected: ImportState, action: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                state: self.state,
                action,
            })
        }
    }

    fn transition(&mut self, next: ImportState) {
        tracing::debug!(
            "[{}] session {}: {:?} -> {:?}",
            self.target,
            self.id,
            self.state,
            next
        );
        self.state = next;
        self.updated_at = Utc::now();
    }
}
