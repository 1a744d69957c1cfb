use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::auth::{
    jwt::JwtKeys,
    repo::{MemoryUserStore, PgUserStore, UserStore},
    services::AuthService,
};
use crate::config::AppConfig;
use crate::products::{
    repo::{MemoryProductStore, PgProductStore, ProductStore},
    services::ProductService,
};

/// Services built once at startup and handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub products: ProductService,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let Some(database_url) = config.database_url.clone() else {
            warn!("DATABASE_URL not set; using in-memory stores");
            return Ok(Self::in_memory(config));
        };

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        }
        info!("connected to postgres");

        Ok(Self::from_parts(
            config,
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgProductStore::new(db)),
        ))
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        let keys = JwtKeys::from_config(&config.jwt);
        Self {
            config: Arc::new(config),
            auth: AuthService::new(users, keys),
            products: ProductService::new(products),
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryProductStore::new()),
        )
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::in_memory(AppConfig::fake())
    }
}
