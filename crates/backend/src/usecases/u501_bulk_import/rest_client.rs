use async_trait::async_trait;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use super::collection_client::{CollectionClient, CommitError};
use crate::system::auth::CredentialProvider;

const MAX_ERROR_BODY_CHARS: usize = 300;

/// HTTP-клиент коллекции внешнего REST API: `POST {base_url}/{collection}`
pub struct RestCollectionClient<R> {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    credentials: Arc<dyn CredentialProvider>,
    _record: PhantomData<fn(&R)>,
}

impl<R> Clone for RestCollectionClient<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            collection: self.collection.clone(),
            credentials: self.credentials.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> RestCollectionClient<R> {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, CommitError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CommitError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            collection: collection.into(),
            credentials,
            _record: PhantomData,
        })
    }

    /// Тот же клиент с другим источником токена
    pub fn with_credentials(&self, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            credentials,
            ..self.clone()
        }
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.collection.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl<R: Serialize + Sync> CollectionClient<R> for RestCollectionClient<R> {
    async fn create(&self, record: &R) -> Result<(), CommitError> {
        let url = self.endpoint();

        let mut request = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(record);

        if let Some(token) = self.credentials.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CommitError::Network(format!("POST {}: {}", url, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        tracing::debug!("POST {} -> {}: {}", url, status, message);

        if message.is_empty() {
            return Err(CommitError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }

        // 4xx с сообщением API - это отказ по самой записи (дубликат, конфликт)
        if status.is_client_error() {
            Err(CommitError::Rejected(message))
        } else {
            Err(CommitError::Http {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Достает текст ошибки из тела ответа:
/// `{"message": ..}`, `{"error": ..}`, `{"error": {"message": ..}}` или сам текст.
fn extract_error_message(body: &str) -> String {
    let body = body.trim();
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let candidates = [
            json.get("message"),
            json.get("error").and_then(|e| e.get("message")),
            json.get("error"),
            json.get("detail"),
        ];
        if let Some(text) = candidates
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str())
        {
            return text.trim().to_string();
        }
    }
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::auth::{EnvCredentials, NoCredentials, StaticCredentials};
    use axum::{extract::Json, http::HeaderMap, http::StatusCode, routing::post, Router};
    use contracts::domain::a001_faq::FaqEntry;
    use std::sync::Mutex;

    #[test]
    fn error_message_shapes() {
        assert_eq!(extract_error_message(r#"{"message":"duplicate"}"#), "duplicate");
        assert_eq!(extract_error_message(r#"{"error":"taken"}"#), "taken");
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"nested"}}"#),
            "nested"
        );
        assert_eq!(extract_error_message("plain text"), "plain text");
        assert_eq!(extract_error_message(""), "");
    }

    #[test]
    fn endpoint_joins_slashes() {
        let client: RestCollectionClient<FaqEntry> = RestCollectionClient::new(
            "http://api.local/v1/",
            "/faqs",
            Duration::from_secs(1),
            Arc::new(NoCredentials),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://api.local/v1/faqs");
    }

    #[tokio::test]
    async fn posts_json_with_bearer_token() {
        let seen_auth: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = seen_auth.clone();

        let app = Router::new().route(
            "/api/faqs",
            post(move |headers: HeaderMap, Json(entry): Json<FaqEntry>| {
                let seen = seen.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    seen.lock().unwrap().push(auth);
                    if entry.title == "taken" {
                        (
                            StatusCode::CONFLICT,
                            Json(serde_json::json!({ "message": "duplicate" })),
                        )
                    } else {
                        (StatusCode::CREATED, Json(serde_json::json!({ "id": 1 })))
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client: RestCollectionClient<FaqEntry> = RestCollectionClient::new(
            format!("http://{}/api", addr),
            "faqs",
            Duration::from_secs(5),
            Arc::new(StaticCredentials::new("secret")),
        )
        .unwrap();

        client.create(&FaqEntry::new("ok", "fine")).await.unwrap();
        let err = client.create(&FaqEntry::new("taken", "dup")).await.unwrap_err();
        assert_eq!(err.to_string(), "duplicate");

        // незаданная переменная с токеном: запрос уходит без Authorization
        let anonymous = client.with_credentials(Arc::new(EnvCredentials::new(
            "BULK_IMPORT_REST_TEST_TOKEN_NOT_SET",
        )));
        anonymous.create(&FaqEntry::new("anon", "fine")).await.unwrap();

        let seen = seen_auth.lock().unwrap().clone();
        assert_eq!(seen, vec!["Bearer secret", "Bearer secret", ""]);
    }

    #[tokio::test]
    async fn unreachable_api_is_a_network_error() {
        let client: RestCollectionClient<FaqEntry> = RestCollectionClient::new(
            "http://127.0.0.1:9",
            "faqs",
            Duration::from_millis(500),
            Arc::new(NoCredentials),
        )
        .unwrap();
        let err = client.create(&FaqEntry::new("a", "b")).await.unwrap_err();
        assert!(matches!(err, CommitError::Network(_)));
    }
}
