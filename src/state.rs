use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::store::{FileStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
    /// Serializes load-modify-save cycles so two concurrent mutations cannot
    /// drop each other's writes.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = FileStore::new(&config.users_file);
        if !config.users_file.exists() {
            tracing::info!(path = %config.users_file.display(), "seeding empty user store");
            store.save_all(&[]).await?;
        }

        Ok(Self::from_parts(Arc::new(store), config))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self {
            store,
            config,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[cfg(test)]
    pub fn fake(store: Arc<dyn UserStore>) -> Self {
        use crate::config::JwtConfig;

        let config = Arc::new(AppConfig {
            users_file: "users-test.json".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_minutes: 5,
            },
        });
        Self::from_parts(store, config)
    }
}
