use contracts::enums::ImportTarget;
use contracts::usecases::u501_bulk_import::{
    ImportResult, PreviewResponse, SessionView, TemplateInfo, ValidationError, ValidationReport,
};
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::collection_client::CollectionClient;
use super::committer;
use super::error::ImportError;
use super::registry::{SessionRegistry, SharedSession};
use super::rest_client::RestCollectionClient;
use super::schema::ImportSchema;
use super::session::SessionError;
use super::template::{self, TemplateFile};
use super::validator;
use crate::shared::config::ImportConfig;
use crate::shared::format::format_bytes;
use crate::shared::spreadsheet;
use crate::system::auth::StaticCredentials;

/// Куда отправляются записи при импорте
pub enum CommitBackend<R> {
    /// Один клиент на все запросы (mock API, тесты)
    Fixed(Arc<dyn CollectionClient<R>>),
    /// Внешний REST API. Токен пользователя из запроса важнее настроенного.
    Rest(RestCollectionClient<R>),
}

impl<R: Serialize + Send + Sync + 'static> CommitBackend<R> {
    pub fn client_for(&self, user_token: Option<String>) -> Arc<dyn CollectionClient<R>> {
        match self {
            CommitBackend::Fixed(client) => client.clone(),
            CommitBackend::Rest(client) => match user_token {
                Some(token) => Arc::new(client.with_credentials(Arc::new(StaticCredentials::new(token)))),
                None => Arc::new(client.clone()),
            },
        }
    }
}

/// UseCase пакетного импорта для одной цели: шаблон, проверка, сессии, импорт
pub struct BulkImportService<S: ImportSchema> {
    schema: Arc<S>,
    registry: SessionRegistry<S::Record>,
    backend: CommitBackend<S::Record>,
    limits: ImportConfig,
}

impl<S: ImportSchema> BulkImportService<S> {
    pub fn new(schema: S, backend: CommitBackend<S::Record>, limits: ImportConfig) -> Self {
        let registry = SessionRegistry::new(schema.target());
        Self {
            schema: Arc::new(schema),
            registry,
            backend,
            limits,
        }
    }

    pub fn target(&self) -> ImportTarget {
        self.schema.target()
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn limits(&self) -> &ImportConfig {
        &self.limits
    }

    pub fn template(&self) -> Result<TemplateFile, ImportError> {
        template::generate(self.schema.as_ref())
    }

    pub fn template_info(&self) -> TemplateInfo {
        template::info(self.schema.as_ref())
    }

    /// Проверка файла без сессии. Разбор идет в blocking-пуле.
    pub async fn validate_file(&self, file_name: String, bytes: Vec<u8>) -> ValidationReport<S::Record> {
        run_validation(self.schema.clone(), file_name, bytes, self.limits.max_rows).await
    }

    pub async fn create_session(&self) -> String {
        self.registry.create_session().await
    }

    async fn session(&self, session_id: &str) -> Result<SharedSession<S::Record>, ImportError> {
        self.registry
            .get(session_id)
            .await
            .ok_or_else(|| ImportError::SessionNotFound(session_id.to_string()))
    }

    pub async fn session_view(&self, session_id: &str) -> Result<SessionView, ImportError> {
        let session = self.session(session_id).await?;
        let view = session.lock().await.view();
        Ok(view)
    }

    /// Удаляет сессию; во время проверки или импорта - `Busy`
    pub async fn remove_session(&self, session_id: &str) -> Result<(), ImportError> {
        let session = self.session(session_id).await?;
        session.lock().await.reset()?;
        self.registry.remove(session_id).await;
        tracing::info!("[{}] Import session removed: {}", self.target(), session_id);
        Ok(())
    }

    /// Выбор файла и его проверка.
    /// Проверка и `finish_validation` идут в отдельной задаче: если запрос
    /// оборвется, сессия все равно выйдет из `Validating`.
    pub async fn upload(
        &self,
        session_id: &str,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<SessionView, ImportError> {
        let session = self.session(session_id).await?;

        let file = {
            let mut guard = session.lock().await;
            guard.select_file(file_name, bytes)?;
            guard.begin_validation()?
        };

        tracing::info!(
            "[{}] session {}: validating {} ({})",
            self.target(),
            session_id,
            file.name,
            format_bytes(file.bytes.len())
        );

        let schema = self.schema.clone();
        let max_rows = self.limits.max_rows;
        let task = tokio::spawn(async move {
            let report = run_validation(schema, file.name, file.bytes, max_rows).await;
            let mut guard = session.lock().await;
            guard.finish_validation(report)?;
            Ok::<_, SessionError>(guard.view())
        });

        let view = task.await.map_err(|e| ImportError::Task(e.to_string()))??;
        Ok(view)
    }

    pub async fn preview(&self, session_id: &str) -> Result<PreviewResponse, ImportError> {
        let session = self.session(session_id).await?;
        let guard = session.lock().await;
        let records = guard.preview()?;
        Ok(PreviewResponse {
            columns: self.schema.columns(),
            rows: records.iter().map(|r| self.schema.rendered(r)).collect(),
        })
    }

    pub async fn clear_errors(&self, session_id: &str) -> Result<SessionView, ImportError> {
        let session = self.session(session_id).await?;
        let mut guard = session.lock().await;
        guard.clear_errors()?;
        Ok(guard.view())
    }

    /// Запускает импорт в фоне и сразу возвращает состояние сессии.
    /// Прогресс виден через `session_view`.
    pub async fn start_import(
        &self,
        session_id: &str,
        user_token: Option<String>,
    ) -> Result<SessionView, ImportError> {
        self.spawn_import(session_id, user_token).await?;
        self.session_view(session_id).await
    }

    /// Импорт с ожиданием результата
    pub async fn run_import(
        &self,
        session_id: &str,
        user_token: Option<String>,
    ) -> Result<ImportResult, ImportError> {
        let handle = self.spawn_import(session_id, user_token).await?;
        handle.await.map_err(|e| ImportError::Task(e.to_string()))
    }

    /// Переводит сессию в `Importing` и отправляет записи в отдельной задаче,
    /// чтобы обрыв HTTP-запроса не оставил сессию в `Importing`.
    async fn spawn_import(
        &self,
        session_id: &str,
        user_token: Option<String>,
    ) -> Result<tokio::task::JoinHandle<ImportResult>, ImportError> {
        let session = self.session(session_id).await?;
        let (records, progress) = {
            let mut guard = session.lock().await;
            let records = guard.begin_import()?;
            (records, guard.progress_counter())
        };

        let target = self.target();
        let client = self.backend.client_for(user_token);
        let session_id = session_id.to_string();
        tracing::info!(
            "[{}] session {}: importing {} records",
            target,
            session_id,
            records.len()
        );

        Ok(tokio::spawn(async move {
            let result = committer::commit(&records, client.as_ref(), |done, _| {
                progress.store(done, Ordering::SeqCst)
            })
            .await;

            let mut guard = session.lock().await;
            match guard.finish_import(result.clone()) {
                Ok(state) => tracing::info!(
                    "[{}] session {}: import finished ({} ok, {} failed) -> {:?}",
                    target,
                    session_id,
                    result.success,
                    result.failed,
                    state
                ),
                Err(e) => tracing::error!("[{}] session {}: {}", target, session_id, e),
            }
            result
        }))
    }

    /// CSV-отчет: ошибки проверки и ошибки создания записей
    pub async fn error_report_csv(&self, session_id: &str) -> Result<Vec<u8>, ImportError> {
        let session = self.session(session_id).await?;
        let guard = session.lock().await;

        let mut rows: Vec<Vec<String>> = guard
            .errors()
            .iter()
            .map(|e| {
                vec![
                    e.row.to_string(),
                    e.field.clone(),
                    e.message.clone(),
                    value_text(&e.value),
                ]
            })
            .collect();

        if let Some(result) = guard.result() {
            rows.extend(result.errors.iter().map(|e| {
                vec![
                    e.row.to_string(),
                    "import".to_string(),
                    e.error.clone(),
                    String::new(),
                ]
            }));
        }

        spreadsheet::write_csv(&["row", "field", "message", "value"], &rows)
            .map_err(ImportError::Report)
    }

    pub async fn cleanup(&self) -> usize {
        self.registry
            .cleanup_old_sessions(self.limits.session_max_age_hours)
            .await
    }
}

async fn run_validation<S: ImportSchema>(
    schema: Arc<S>,
    file_name: String,
    bytes: Vec<u8>,
    max_rows: usize,
) -> ValidationReport<S::Record> {
    let target = schema.target();
    let name = file_name.clone();

    let task = tokio::task::spawn_blocking(move || {
        validator::validate(schema.as_ref(), &name, &bytes, max_rows)
    });

    match task.await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("[{}] Validation task failed for {}: {}", target, file_name, e);
            ValidationReport::rejected(ValidationError::file_level(
                format!("Validation failed unexpectedly: {}", e),
                file_name,
            ))
        }
    }
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_faq::FaqImport;
    use crate::usecases::u501_bulk_import::collection_client::{CommitError, InMemoryCollection};
    use async_trait::async_trait;
    use contracts::domain::a001_faq::FaqEntry;
    use contracts::usecases::u501_bulk_import::ImportState;
    use tokio::sync::Semaphore;

    const FAQ_CSV: &str = "title,description\nQ1,A1\nQ2,A2\nQ3,A3\n";

    fn service_with(collection: Arc<InMemoryCollection<FaqEntry>>) -> BulkImportService<FaqImport> {
        BulkImportService::new(
            FaqImport,
            CommitBackend::Fixed(collection),
            ImportConfig::default(),
        )
    }

    fn faq_collection() -> Arc<InMemoryCollection<FaqEntry>> {
        Arc::new(InMemoryCollection::new("faqs", |e: &FaqEntry| e.title.to_lowercase()))
    }

    #[tokio::test]
    async fn full_import_consumes_the_file() {
        let collection = faq_collection();
        let service = service_with(collection.clone());
        let id = service.create_session().await;

        let view = service
            .upload(&id, "faq.csv".into(), FAQ_CSV.as_bytes().to_vec())
            .await
            .unwrap();
        assert_eq!(view.state, ImportState::PreviewReady);
        assert_eq!(view.valid_count, 3);

        let preview = service.preview(&id).await.unwrap();
        assert_eq!(preview.rows[0], vec!["Q1".to_string(), "A1".to_string()]);

        let result = service.run_import(&id, None).await.unwrap();
        assert_eq!(result.success, 3);
        assert_eq!(collection.len().await, 3);

        let view = service.session_view(&id).await.unwrap();
        assert_eq!(view.state, ImportState::Idle);
        assert!(view.file_name.is_none());
        assert_eq!(view.result.unwrap().success, 3);
    }

    #[tokio::test]
    async fn partial_failure_keeps_session_for_review() {
        let collection = faq_collection();
        collection.create(&FaqEntry::new("q2", "existing")).await.unwrap();
        let service = service_with(collection.clone());
        let id = service.create_session().await;

        service
            .upload(&id, "faq.csv".into(), FAQ_CSV.as_bytes().to_vec())
            .await
            .unwrap();
        let result = service.run_import(&id, None).await.unwrap();

        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors[0].row, 3);
        assert_eq!(result.errors[0].error, "duplicate");

        let view = service.session_view(&id).await.unwrap();
        assert_eq!(view.state, ImportState::ImportComplete);
        assert_eq!(view.file_name.as_deref(), Some("faq.csv"));

        let report = String::from_utf8(service.error_report_csv(&id).await.unwrap()).unwrap();
        assert!(report.contains("3,import,duplicate,"));
    }

    #[tokio::test]
    async fn validation_errors_block_import() {
        let service = service_with(faq_collection());
        let id = service.create_session().await;

        let view = service
            .upload(&id, "faq.csv".into(), b"title,description\n,A1\n".to_vec())
            .await
            .unwrap();
        assert_eq!(view.state, ImportState::ValidationFailed);
        assert_eq!(view.errors[0].row, 2);

        let err = service.run_import(&id, None).await.unwrap_err();
        assert!(matches!(
            err,
            ImportError::Session(SessionError::InvalidState { .. })
        ));

        let view = service.clear_errors(&id).await.unwrap();
        assert_eq!(view.state, ImportState::Idle);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let service = service_with(faq_collection());
        assert!(matches!(
            service.session_view("missing").await,
            Err(ImportError::SessionNotFound(_))
        ));
    }

    /// Клиент, который ждет разрешения на каждую запись
    struct GatedClient {
        gate: Semaphore,
    }

    #[async_trait]
    impl CollectionClient<FaqEntry> for GatedClient {
        async fn create(&self, _record: &FaqEntry) -> Result<(), CommitError> {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| CommitError::Network(e.to_string()))?;
            permit.forget();
            Ok(())
        }
    }

    #[tokio::test]
    async fn new_file_is_rejected_while_importing() {
        let client = Arc::new(GatedClient {
            gate: Semaphore::new(0),
        });
        let service = BulkImportService::new(
            FaqImport,
            CommitBackend::Fixed(client.clone()),
            ImportConfig::default(),
        );
        let id = service.create_session().await;
        service
            .upload(&id, "faq.csv".into(), FAQ_CSV.as_bytes().to_vec())
            .await
            .unwrap();

        let view = service.start_import(&id, None).await.unwrap();
        assert_eq!(view.state, ImportState::Importing);

        let err = service
            .upload(&id, "other.csv".into(), FAQ_CSV.as_bytes().to_vec())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::Session(SessionError::Busy(ImportState::Importing))
        ));
        assert!(service.remove_session(&id).await.is_err());

        client.gate.add_permits(3);
        for _ in 0..100 {
            if service.session_view(&id).await.unwrap().state == ImportState::Idle {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let view = service.session_view(&id).await.unwrap();
        assert_eq!(view.state, ImportState::Idle);
        assert_eq!(view.result.unwrap().success, 3);
    }

    #[tokio::test]
    async fn dropped_upload_still_finishes_validation() {
        let service = service_with(faq_collection());
        let id = service.create_session().await;

        let mut body = String::from("title,description\n");
        for i in 0..4000 {
            body.push_str(&format!("Question {i},Answer {i}\n"));
        }

        // запрос обрывается, пока файл еще проверяется
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(1),
            service.upload(&id, "faq.csv".into(), body.into_bytes()),
        )
        .await;

        for _ in 0..200 {
            if service.session_view(&id).await.unwrap().state != ImportState::Validating {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let view = service.session_view(&id).await.unwrap();
        assert_eq!(view.state, ImportState::PreviewReady);
        assert_eq!(view.valid_count, 4000);

        let view = service
            .upload(&id, "faq.csv".into(), FAQ_CSV.as_bytes().to_vec())
            .await
            .unwrap();
        assert_eq!(view.valid_count, 3);
        service.remove_session(&id).await.unwrap();
    }

    #[tokio::test]
    async fn stateless_validation_reports_file_errors() {
        let service = service_with(faq_collection());
        let report = service
            .validate_file("faq.xlsx".into(), b"garbage".to_vec())
            .await;
        assert!(report.has_file_error());
    }
}
