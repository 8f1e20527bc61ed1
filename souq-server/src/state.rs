//! Application state for souq-server

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::provider::{GoTrueClient, IdentityProvider};
use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::db::MarketStore;
use crate::db::memory::MemoryStore;
use crate::db::pg::PgStore;
use crate::revalidate::RevalidationHub;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Listings, images, suppliers, profiles, cities
    pub store: Arc<dyn MarketStore>,
    /// Hosted identity provider
    pub identity: Arc<dyn IdentityProvider>,
    /// Staleness signal for rendered paths
    pub revalidator: RevalidationHub,
    /// Rate limiter for sign-in/registration routes
    pub rate_limiter: RateLimiter,
    /// Public origin, used to build auth redirect targets
    pub site_url: String,
    /// Mark session cookies `Secure`
    pub cookie_secure: bool,
    pub default_currency: String,
    pub catalog_page_size: i64,
    /// Verify access tokens locally when set
    pub jwt_secret: Option<String>,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn MarketStore> = if config.uses_memory_store() {
            tracing::warn!("Using in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        } else {
            let pool = PgPool::connect(&config.database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");
            Arc::new(PgStore::new(pool))
        };

        let identity = Arc::new(GoTrueClient::new(
            &config.supabase_url,
            &config.supabase_anon_key,
        ));

        Ok(Self::with_parts(config, store, identity))
    }

    /// Assemble state from already-built collaborators
    pub fn with_parts(
        config: &Config,
        store: Arc<dyn MarketStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            store,
            identity,
            revalidator: RevalidationHub::new(),
            rate_limiter: RateLimiter::new(),
            site_url: config.site_url.clone(),
            cookie_secure: !config.is_development(),
            default_currency: config.default_currency.clone(),
            catalog_page_size: config.catalog_page_size,
            jwt_secret: config.supabase_jwt_secret.clone(),
        }
    }
}
