use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmCredentialStore};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth: Arc<AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::from_config(&config.database).await?;
        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let credentials = Arc::new(SeaOrmCredentialStore::new(store.clone()));
        let auth = Arc::new(AuthService::new(
            credentials,
            &config.limits,
            config.security.clone(),
        ));

        Self {
            config: Arc::new(config),
            store,
            auth,
        }
    }
}
