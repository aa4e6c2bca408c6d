use crate::resolver::{ResolverSettings, DEFAULT_MAX_ATTEMPTS, DEFAULT_SUGGESTION_MARGIN};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Base of the public white-label URLs, `{public_url}/{slug}`.
    pub public_url: String,
    pub slugs: ResolverSettings,
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    pub fn from_env() -> Self {
        let port = parse_env("PORT").unwrap_or(39099);

        let public_url = std::env::var("UNIPET_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let slugs = ResolverSettings {
            max_attempts: parse_env("UNIPET_SLUG_MAX_ATTEMPTS")
                .filter(|n: &u32| *n > 0)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            suggestion_margin: parse_env("UNIPET_SLUG_SUGGESTION_MARGIN")
                .unwrap_or(DEFAULT_SUGGESTION_MARGIN),
        };

        Self {
            port,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:unipet.db?mode=rwc".to_string()),
            public_url,
            slugs,
        }
    }
}
