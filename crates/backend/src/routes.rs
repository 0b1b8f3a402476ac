use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use contracts::enums::ImportTarget;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers::u501_bulk_import as import;
use crate::api::ImportServices;
use crate::system;
use crate::usecases::u501_bulk_import::{BulkImportService, ImportSchema};

/// Конфигурация всех роутов приложения
pub fn configure_routes(services: &ImportServices, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/import/targets", get(list_targets))
        // ========================================
        // U501 BULK IMPORT
        // ========================================
        .nest(&import_prefix(ImportTarget::Faq), import_routes(services.faq.clone()))
        .nest(
            &import_prefix(ImportTarget::VehicleMake),
            import_routes(services.vehicle_make.clone()),
        )
        .nest(&import_prefix(ImportTarget::User), import_routes(services.user.clone()))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(middleware::from_fn(system::middleware::request_logger))
}

fn import_prefix(target: ImportTarget) -> String {
    format!("/api/import/{}", target.code())
}

/// Роуты одной цели импорта
fn import_routes<S: ImportSchema>(service: Arc<BulkImportService<S>>) -> Router {
    Router::new()
        .route("/template", get(import::template::<S>))
        .route("/template/info", get(import::template_info::<S>))
        .route("/validate", post(import::validate::<S>))
        .route("/sessions", post(import::create_session::<S>))
        .route(
            "/sessions/:id",
            get(import::get_session::<S>).delete(import::delete_session::<S>),
        )
        .route("/sessions/:id/file", post(import::upload_file::<S>))
        .route("/sessions/:id/preview", get(import::preview::<S>))
        .route("/sessions/:id/import", post(import::run_import::<S>))
        .route("/sessions/:id/import/start", post(import::start_import::<S>))
        .route("/sessions/:id/clear-errors", post(import::clear_errors::<S>))
        .route("/sessions/:id/errors.csv", get(import::error_report::<S>))
        .with_state(service)
}

/// GET /api/import/targets
async fn list_targets() -> Json<serde_json::Value> {
    let targets: Vec<serde_json::Value> = ImportTarget::all()
        .into_iter()
        .map(|t| {
            json!({
                "code": t.code(),
                "name": t.display_name(),
                "collection": t.collection(),
            })
        })
        .collect();
    Json(json!(targets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::{parse_config, Config};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use contracts::usecases::u501_bulk_import::{
        CreateSessionResponse, ImportResult, ImportState, SessionView,
    };
    use tower::ServiceExt;

    const BOUNDARY: &str = "import-test-boundary";

    fn test_config() -> Config {
        parse_config(
            r#"
            [server]
            host = "127.0.0.1"
            port = 0

            [backend]
            mode = "mock"
            base_url = "http://127.0.0.1:4000/api"

            [import]
            max_upload_bytes = 65536
            max_rows = 100
            session_max_age_hours = 1
            "#,
        )
        .unwrap()
    }

    fn app() -> Router {
        let config = test_config();
        let services = ImportServices::from_config(&config).unwrap();
        configure_routes(&services, config.import.max_upload_bytes)
    }

    fn multipart_request(uri: &str, file_name: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = file_name,
            c = content
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn template_download_is_xlsx_attachment() {
        let response = app()
            .oneshot(empty_request("GET", "/api/import/faq/template"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("faq_import_template.xlsx"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn session_flow_over_http() {
        let app = app();

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/import/vehicle-make/sessions"))
            .await
            .unwrap();
        let created: CreateSessionResponse = json_body(response).await;
        let base = format!("/api/import/vehicle-make/sessions/{}", created.session_id);

        let response = app
            .clone()
            .oneshot(multipart_request(
                &format!("{}/file", base),
                "makes.csv",
                "make,short_code,status\nToyota,toy,active\nSaab,SAAB,inactive",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let view: SessionView = json_body(response).await;
        assert_eq!(view.state, ImportState::PreviewReady);
        assert_eq!(view.valid_count, 2);

        let response = app
            .clone()
            .oneshot(empty_request("POST", &format!("{}/import", base)))
            .await
            .unwrap();
        let result: ImportResult = json_body(response).await;
        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 0);

        // повторный импорт того же файла невозможен: сессия вернулась в Idle
        let response = app
            .oneshot(empty_request("POST", &format!("{}/import", base)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn stateless_validation_returns_report() {
        let response = app()
            .oneshot(multipart_request(
                "/api/import/faq/validate",
                "faq.csv",
                "title,description\nQ,A\n,B",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report: serde_json::Value = json_body(response).await;
        assert_eq!(report["valid"].as_array().unwrap().len(), 1);
        assert_eq!(report["errors"][0]["row"], 3);
        assert_eq!(report["errors"][0]["field"], "title");
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let response = app()
            .oneshot(empty_request("GET", "/api/import/user/sessions/missing"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn upload_without_file_field_is_400() {
        let app = app();
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/import/faq/sessions"))
            .await
            .unwrap();
        let created: CreateSessionResponse = json_body(response).await;

        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{b}--\r\n",
            b = BOUNDARY
        );
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/import/faq/sessions/{}/file", created.session_id))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn targets_are_listed() {
        let response = app()
            .oneshot(empty_request("GET", "/api/import/targets"))
            .await
            .unwrap();
        let targets: serde_json::Value = json_body(response).await;
        let codes: Vec<&str> = targets
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["faq", "vehicle-make", "user"]);
    }
}
