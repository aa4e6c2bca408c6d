use sqlx::SqlitePool;

use crate::resolver::ResolverSettings;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub slugs: ResolverSettings,
    pub public_url: String,
}

impl AppState {
    /// Public white-label address of a unit.
    pub fn unit_url(&self, slug: &str) -> String {
        format!("{}/{slug}", self.public_url)
    }
}
