//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// `DATABASE_URL` value that selects the in-process store
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL, or `memory://`
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Identity provider base URL (Supabase project URL)
    pub supabase_url: String,
    /// Public API key sent as `apikey` on every identity provider call
    pub supabase_anon_key: String,
    /// HS256 secret for verifying access tokens locally; without it every
    /// request asks the provider who the caller is
    pub supabase_jwt_secret: Option<String>,
    /// Public origin of this site, used in password-reset links
    pub site_url: String,
    /// Currency for listings created without one
    pub default_currency: String,
    /// Public catalog page size
    pub catalog_page_size: i64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: environment.clone(),
            supabase_url: std::env::var("SUPABASE_URL")
                .unwrap_or_else(|_| "http://localhost:54321".into())
                .trim_end_matches('/')
                .to_string(),
            supabase_anon_key: Self::require_secret("SUPABASE_ANON_KEY", &environment)?,
            supabase_jwt_secret: std::env::var("SUPABASE_JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into())
                .trim_end_matches('/')
                .to_string(),
            default_currency: std::env::var("DEFAULT_CURRENCY")
                .ok()
                .map(|c| c.trim().to_uppercase())
                .filter(|c| c.len() == 3)
                .unwrap_or_else(|| "SAR".into()),
            catalog_page_size: std::env::var("CATALOG_PAGE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|n: &i64| *n > 0)
                .unwrap_or(50),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}
