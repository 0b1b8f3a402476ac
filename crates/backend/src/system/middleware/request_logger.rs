use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::shared::format::format_bytes;

/// Middleware для логирования HTTP запросов
///
/// Пишет в tracing: метод, путь, статус, длительность и размер ответа.
/// Ответы с ошибкой (4xx/5xx) логируются уровнем warn.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{} {} -> {} | {}ms | body error: {}",
                method,
                uri.path(),
                parts.status.as_u16(),
                start.elapsed().as_millis(),
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let elapsed_ms = start.elapsed().as_millis();
    let status = parts.status;
    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            "{} {} -> {} | {}ms | {}",
            method,
            uri.path(),
            status.as_u16(),
            elapsed_ms,
            format_bytes(bytes.len())
        );
    } else {
        tracing::info!(
            "{} {} -> {} | {}ms | {}",
            method,
            uri.path(),
            status.as_u16(),
            elapsed_ms,
            format_bytes(bytes.len())
        );
    }

    Response::from_parts(parts, Body::from(bytes))
}
