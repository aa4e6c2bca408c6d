use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct NetworkUnitRow {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub services: Vec<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub whatsapp: Option<String>,
    pub google_maps_url: Option<String>,
    pub url_slug: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields exposed by the unauthenticated slug lookup.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUnit {
    pub id: String,
    pub name: String,
    pub address: String,
    pub url_slug: String,
}

impl From<&NetworkUnitRow> for PublicUnit {
    fn from(row: &NetworkUnitRow) -> Self {
        Self {
            id: row.id.clone(),
            name: row.name.clone(),
            address: row.address.clone(),
            url_slug: row.url_slug.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNetworkUnit {
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub services: Vec<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub whatsapp: Option<String>,
    pub google_maps_url: Option<String>,
    /// Explicit slug. Generated from `name` when absent.
    pub url_slug: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateNetworkUnit {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub services: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub whatsapp: Option<String>,
    pub google_maps_url: Option<String>,
    pub url_slug: Option<String>,
}
