use crate::config::{AppConfig, StoreBackend};
use crate::core::shared::utils::{create_conn, run_migrations};
use crate::core::store::{MemoryBackend, PgBackend};
use crate::directory::DirectoryRepository;
use crate::drive::{build_object_store, ObjectStore};
use crate::security::auth_api::AuthConfig;
use crate::security::file_validation::FileValidationConfig;
use crate::security::jwt::JwtManager;
use crate::tickets::TicketRepository;
use anyhow::{anyhow, Context};
use log::info;
use std::sync::Arc;

/// Everything a handler needs. Cheap to clone; every field is shared.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tickets: Arc<dyn TicketRepository>,
    pub directory: Arc<dyn DirectoryRepository>,
    pub storage: Arc<dyn ObjectStore>,
    pub jwt: Arc<JwtManager>,
    pub auth_config: Arc<AuthConfig>,
    pub uploads: Arc<FileValidationConfig>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            tickets: Arc::clone(&self.tickets),
            directory: Arc::clone(&self.directory),
            storage: Arc::clone(&self.storage),
            jwt: Arc::clone(&self.jwt),
            auth_config: Arc::clone(&self.auth_config),
            uploads: Arc::clone(&self.uploads),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("tickets", &"Arc<dyn TicketRepository>")
            .field("directory", &"Arc<dyn DirectoryRepository>")
            .field("storage", &"Arc<dyn ObjectStore>")
            .field("jwt", &self.jwt)
            .field("auth_config", &self.auth_config)
            .field("uploads", &self.uploads)
            .finish()
    }
}

impl AppState {
    pub fn new(
        config: AppConfig,
        tickets: Arc<dyn TicketRepository>,
        directory: Arc<dyn DirectoryRepository>,
        storage: Arc<dyn ObjectStore>,
    ) -> anyhow::Result<Self> {
        let jwt = JwtManager::from_settings(&config.auth)?;
        let auth_config = AuthConfig::from_settings(&config.auth);
        let uploads = FileValidationConfig::from(&config.uploads);
        Ok(Self {
            config: Arc::new(config),
            tickets,
            directory,
            storage,
            jwt: Arc::new(jwt),
            auth_config: Arc::new(auth_config),
            uploads: Arc::new(uploads),
        })
    }

    /// One in-memory backend serving both repositories.
    pub fn in_memory(config: AppConfig, storage: Arc<dyn ObjectStore>) -> anyhow::Result<Self> {
        let backend = Arc::new(MemoryBackend::new(Arc::clone(&storage)));
        Self::new(config, backend.clone(), backend, storage)
    }

    /// Builds the configured backends, running migrations for Postgres.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let storage = build_object_store(&config.drive)
            .await
            .context("Failed to set up attachment storage")?;

        match config.database.backend {
            StoreBackend::Memory => Self::in_memory(config, storage),
            StoreBackend::Postgres => {
                let pool = create_conn(&config.database)
                    .context("Failed to create database connection pool")?;
                let migration_pool = pool.clone();
                tokio::task::spawn_blocking(move || run_migrations(&migration_pool))
                    .await?
                    .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
                info!("Database migrations applied");
                let backend = Arc::new(PgBackend::new(pool, Arc::clone(&storage)));
                Self::new(config, backend.clone(), backend, storage)
            }
        }
    }
}
