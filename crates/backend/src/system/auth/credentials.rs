use async_trait::async_trait;
use std::env::VarError;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credential not available: {0}")]
    Missing(String),
}

/// Источник токена для запросов к внешнему API.
///
/// Клиент коллекции получает провайдер явно, а не читает токен
/// из глобального состояния.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Bearer-токен; `None` - запрос уходит без авторизации
    async fn bearer_token(&self) -> Result<Option<String>, CredentialError>;
}

/// Запросы без авторизации (mock API, локальная разработка)
#[derive(Debug, Clone, Default)]
pub struct NoCredentials;

#[async_trait]
impl CredentialProvider for NoCredentials {
    async fn bearer_token(&self) -> Result<Option<String>, CredentialError> {
        Ok(None)
    }
}

/// Фиксированный токен (например, пришедший в запросе пользователя)
#[derive(Clone)]
pub struct StaticCredentials {
    token: String,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("token", &"***")
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn bearer_token(&self) -> Result<Option<String>, CredentialError> {
        Ok(Some(self.token.clone()))
    }
}

/// Токен из переменной окружения, читается при каждом запросе.
/// Пустая или незаданная переменная: запрос без авторизации.
#[derive(Debug)]
pub struct EnvCredentials {
    var: String,
    warned: AtomicBool,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            warned: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentials {
    async fn bearer_token(&self) -> Result<Option<String>, CredentialError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            Err(VarError::NotUnicode(_)) => Err(CredentialError::Missing(format!(
                "environment variable {} is not valid unicode",
                self.var
            ))),
            _ => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!(
                        "{} is not set, requests to the import API are sent without authorization",
                        self.var
                    );
                }
                Ok(None)
            }
        }
    }
}
