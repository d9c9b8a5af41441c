use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::rate_limit::RateLimiter;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, EmployeeService, SeaOrmAuthService, SeaOrmEmployeeService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub employee_service: Arc<dyn EmployeeService>,

    pub auth_service: Arc<dyn AuthService>,

    pub rate_limiter: Arc<RateLimiter>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let employee_service = Arc::new(SeaOrmEmployeeService::new(store.clone()))
            as Arc<dyn EmployeeService + Send + Sync + 'static>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let rate_limiter = Arc::new(RateLimiter::new(&config.security.rate_limit));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            employee_service,
            auth_service,
            rate_limiter,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
