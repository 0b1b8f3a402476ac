use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::usecases::u501_bulk_import::{
    CreateSessionResponse, ImportResult, PreviewResponse, SessionView, TemplateInfo,
    ValidationReport,
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::shared::spreadsheet::CSV_CONTENT_TYPE;
use crate::system::auth::BearerToken;
use crate::usecases::u501_bulk_import::{BulkImportService, ImportSchema};

/// Состояние роутера одной цели импорта
pub type ServiceState<S> = State<Arc<BulkImportService<S>>>;

/// Файл из поля `file` multipart-запроса
async fn read_file(mut multipart: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no name".to_string()))?;
        let bytes = field.bytes().await?;
        return Ok((file_name, bytes.to_vec()));
    }
    Err(ApiError::BadRequest(
        "Multipart field 'file' is missing".to_string(),
    ))
}

fn attachment(content_type: &str, file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// GET /api/import/{target}/template
pub async fn template<S: ImportSchema>(
    State(service): ServiceState<S>,
) -> Result<Response, ApiError> {
    let file = service.template()?;
    Ok(attachment(file.content_type, &file.file_name, file.bytes))
}

/// GET /api/import/{target}/template/info
pub async fn template_info<S: ImportSchema>(State(service): ServiceState<S>) -> Json<TemplateInfo> {
    Json(service.template_info())
}

/// POST /api/import/{target}/validate
///
/// Проверка без сессии: отчет с валидными записями и ошибками.
pub async fn validate<S: ImportSchema>(
    State(service): ServiceState<S>,
    multipart: Multipart,
) -> Result<Json<ValidationReport<S::Record>>, ApiError> {
    let (file_name, bytes) = read_file(multipart).await?;
    Ok(Json(service.validate_file(file_name, bytes).await))
}

/// POST /api/import/{target}/sessions
pub async fn create_session<S: ImportSchema>(
    State(service): ServiceState<S>,
) -> Json<CreateSessionResponse> {
    let session_id = service.create_session().await;
    Json(CreateSessionResponse { session_id })
}

/// GET /api/import/{target}/sessions/:id
pub async fn get_session<S: ImportSchema>(
    State(service): ServiceState<S>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(service.session_view(&id).await?))
}

/// DELETE /api/import/{target}/sessions/:id
pub async fn delete_session<S: ImportSchema>(
    State(service): ServiceState<S>,
    Path(id): Path<String>,
) -> Result<(), ApiError> {
    service.remove_session(&id).await?;
    Ok(())
}

/// POST /api/import/{target}/sessions/:id/file
pub async fn upload_file<S: ImportSchema>(
    State(service): ServiceState<S>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<SessionView>, ApiError> {
    let (file_name, bytes) = read_file(multipart).await?;
    Ok(Json(service.upload(&id, file_name, bytes).await?))
}

/// GET /api/import/{target}/sessions/:id/preview
pub async fn preview<S: ImportSchema>(
    State(service): ServiceState<S>,
    Path(id): Path<String>,
) -> Result<Json<PreviewResponse>, ApiError> {
    Ok(Json(service.preview(&id).await?))
}

/// POST /api/import/{target}/sessions/:id/import
///
/// Ждет окончания импорта и возвращает итог.
pub async fn run_import<S: ImportSchema>(
    State(service): ServiceState<S>,
    Path(id): Path<String>,
    BearerToken(token): BearerToken,
) -> Result<Json<ImportResult>, ApiError> {
    Ok(Json(service.run_import(&id, token).await?))
}

/// POST /api/import/{target}/sessions/:id/import/start
///
/// Импорт в фоне, прогресс через GET сессии.
pub async fn start_import<S: ImportSchema>(
    State(service): ServiceState<S>,
    Path(id): Path<String>,
    BearerToken(token): BearerToken,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(service.start_import(&id, token).await?))
}

/// POST /api/import/{target}/sessions/:id/clear-errors
pub async fn clear_errors<S: ImportSchema>(
    State(service): ServiceState<S>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(service.clear_errors(&id).await?))
}

/// GET /api/import/{target}/sessions/:id/errors.csv
pub async fn error_report<S: ImportSchema>(
    State(service): ServiceState<S>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = service.error_report_csv(&id).await?;
    let file_name = format!("{}_errors.csv", service.target().code().replace('-', "_"));
    Ok(attachment(CSV_CONTENT_TYPE, &file_name, bytes))
}
