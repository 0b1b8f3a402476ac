pub mod error;
pub mod handlers;

use contracts::enums::ImportTarget;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::a001_faq::FaqImport;
use crate::domain::a002_vehicle_make::VehicleMakeImport;
use crate::domain::a003_user_account::UserAccountImport;
use crate::shared::config::{BackendConfig, BackendMode, Config};
use crate::system::auth::{CredentialProvider, EnvCredentials, NoCredentials};
use crate::usecases::u501_bulk_import::{
    BulkImportService, CommitBackend, ImportSchema, InMemoryCollection, RestCollectionClient,
};

/// Сервисы импорта всех целей
#[derive(Clone)]
pub struct ImportServices {
    pub faq: Arc<BulkImportService<FaqImport>>,
    pub vehicle_make: Arc<BulkImportService<VehicleMakeImport>>,
    pub user: Arc<BulkImportService<UserAccountImport>>,
}

impl ImportServices {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        tracing::info!(
            "Import backend: {:?} ({})",
            config.backend.mode,
            config.backend.base_url
        );
        Ok(Self {
            faq: service(FaqImport, config)?,
            vehicle_make: service(VehicleMakeImport, config)?,
            user: service(UserAccountImport, config)?,
        })
    }

    /// Удаляет устаревшие сессии всех целей
    pub async fn cleanup(&self) -> usize {
        self.faq.cleanup().await + self.vehicle_make.cleanup().await + self.user.cleanup().await
    }
}

fn service<S: ImportSchema + Clone>(
    schema: S,
    config: &Config,
) -> anyhow::Result<Arc<BulkImportService<S>>> {
    let backend = commit_backend(&schema, &config.backend)?;
    Ok(Arc::new(BulkImportService::new(
        schema,
        backend,
        config.import.clone(),
    )))
}

fn commit_backend<S: ImportSchema + Clone>(
    schema: &S,
    config: &BackendConfig,
) -> anyhow::Result<CommitBackend<S::Record>> {
    let target: ImportTarget = schema.target();
    match config.mode {
        BackendMode::Mock => {
            let key_schema = schema.clone();
            let key = move |record: &S::Record| {
                key_schema
                    .natural_key(record)
                    .map(|(_, key)| key.trim().to_lowercase())
                    .unwrap_or_else(|| serde_json::to_string(record).unwrap_or_default())
            };
            let collection = InMemoryCollection::new(target.collection(), key);
            Ok(CommitBackend::Fixed(Arc::new(collection)))
        }
        BackendMode::Http => {
            let credentials: Arc<dyn CredentialProvider> = match &config.token_env {
                Some(var) => Arc::new(EnvCredentials::new(var.clone())),
                None => Arc::new(NoCredentials),
            };
            let client = RestCollectionClient::new(
                config.base_url.clone(),
                target.collection(),
                Duration::from_secs(config.timeout_secs),
                credentials,
            )?;
            Ok(CommitBackend::Rest(client))
        }
    }
}
