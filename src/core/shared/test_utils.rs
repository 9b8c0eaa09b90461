use crate::config::AppConfig;
use crate::core::shared::enums::Role;
use crate::core::shared::models::User;
use crate::core::shared::state::AppState;
use crate::core::store::MemoryBackend;
use crate::directory::{DirectoryRepository, NewProfile};
use crate::drive::{MemoryObjectStore, ObjectStore};
use crate::security::auth_api::AuthenticatedUser;
use std::sync::Arc;
use uuid::Uuid;

/// App state over fresh in-memory stores, with handles to the concrete
/// backends for assertions.
pub struct TestHarness {
    pub state: AppState,
    pub backend: Arc<MemoryBackend>,
    pub objects: Arc<MemoryObjectStore>,
}

impl TestHarness {
    pub fn new() -> Self {
        let config = AppConfig::in_memory();
        let objects = Arc::new(MemoryObjectStore::new(
            config.drive.public_base_url.clone(),
            config.drive.bucket.clone(),
        ));
        let storage: Arc<dyn ObjectStore> = objects.clone();
        let backend = Arc::new(MemoryBackend::new(Arc::clone(&storage)));
        let state = AppState::new(config, backend.clone(), backend.clone(), storage)
            .expect("test state");
        Self {
            state,
            backend,
            objects,
        }
    }

    pub async fn department_id(&self, name: &str) -> Uuid {
        self.backend
            .list_departments()
            .await
            .expect("departments")
            .into_iter()
            .find(|d| d.name == name)
            .map(|d| d.id)
            .expect("seeded department")
    }

    pub async fn add_user(&self, name: &str, email: &str, role: Role) -> User {
        let department_id = self.department_id("IT").await;
        self.backend
            .create_user(NewProfile {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: "not-a-real-hash".to_string(),
                role,
                department_id: Some(department_id),
            })
            .await
            .expect("create user")
    }

    pub async fn session_for(&self, name: &str, email: &str, role: Role) -> AuthenticatedUser {
        AuthenticatedUser::from(self.add_user(name, email, role).await)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
