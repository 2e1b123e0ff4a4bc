use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Storefront presentation settings, loaded once at startup and immutable
/// afterwards (the site header shows up in the home and admin projections).
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub cart_cookie: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub site: SiteConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "agroshop".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "agroshop-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let site = SiteConfig {
            name: std::env::var("SITE_NAME").unwrap_or_else(|_| "AgroBioSmart".into()),
            cart_cookie: std::env::var("CART_COOKIE").unwrap_or_else(|_| "cart_session".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            site,
        })
    }
}
