use async_trait::async_trait;
use contracts::usecases::u501_bulk_import::UNKNOWN_ERROR;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::system::auth::CredentialError;

/// Ошибка создания записи во внешнем API
#[derive(Debug, Error)]
pub enum CommitError {
    /// Отказ API с сообщением (например, `duplicate`)
    #[error("{0}")]
    Rejected(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authorization failed: {0}")]
    Credentials(#[from] CredentialError),

    #[error("{}", UNKNOWN_ERROR)]
    Unknown,
}

/// Коллекция внешнего API, в которую импорт создает записи.
/// Импорт зависит только от успеха или неуспеха `create`.
#[async_trait]
pub trait CollectionClient<R>: Send + Sync {
    async fn create(&self, record: &R) -> Result<(), CommitError>;
}

type KeyFn<R> = Box<dyn Fn(&R) -> String + Send + Sync>;

/// In-memory коллекция (mock REST API).
/// Повтор естественного ключа отклоняется с сообщением `duplicate`.
pub struct InMemoryCollection<R> {
    name: String,
    records: RwLock<Vec<R>>,
    key: KeyFn<R>,
}

impl<R: Clone + Send + Sync> InMemoryCollection<R> {
    pub fn new(name: impl Into<String>, key: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            records: RwLock::new(Vec::new()),
            key: Box::new(key),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn records(&self) -> Vec<R> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> CollectionClient<R> for InMemoryCollection<R> {
    async fn create(&self, record: &R) -> Result<(), CommitError> {
        let key = (self.key)(record);
        let mut records = self.records.write().await;
        if records.iter().any(|existing| (self.key)(existing) == key) {
            tracing::debug!("[mock:{}] duplicate key '{}'", self.name, key);
            return Err(CommitError::Rejected("duplicate".to_string()));
        }
        records.push(record.clone());
        Ok(())
    }
}
