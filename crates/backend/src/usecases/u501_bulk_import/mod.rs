//! Пакетный импорт записей из таблиц: шаблон, проверка, предпросмотр, импорт.

pub mod collection_client;
pub mod committer;
pub mod error;
pub mod registry;
pub mod rest_client;
pub mod schema;
pub mod service;
pub mod session;
pub mod template;
pub mod validator;
pub mod validators;

pub use collection_client::{CollectionClient, CommitError, InMemoryCollection};
pub use error::ImportError;
pub use rest_client::RestCollectionClient;
pub use schema::{ImportColumn, ImportSchema, RowContext};
pub use service::{BulkImportService, CommitBackend};
pub use session::{ImportSession, SessionError};
pub use template::TemplateFile;
