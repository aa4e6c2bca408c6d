use std::future::Future;

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{is_slug_conflict, AppError};
use crate::models::unit::{CreateNetworkUnit, NetworkUnitRow, UpdateNetworkUnit};
use crate::resolver::{self, ResolverSettings, SlugLookup};
use crate::slug;

/// Writes that lose a race on the `url_slug` constraint are re-resolved and
/// retried up to this many times in total.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Holder reported for the site's own top-level paths.
pub const RESERVED_HOLDER: &str = "reserved";

/// Slug lookups against `network_units.url_slug`. Reserved site paths are
/// reported as held so units never shadow a static route.
pub struct UnitSlugs<'a>(pub &'a SqlitePool);

impl SlugLookup for UnitSlugs<'_> {
    type Error = sqlx::Error;

    async fn ids_with_slug(&self, slug: &str) -> Result<Vec<String>, sqlx::Error> {
        if slug::is_reserved(slug) {
            return Ok(vec![RESERVED_HOLDER.to_string()]);
        }
        sqlx::query_scalar("SELECT id FROM network_units WHERE url_slug = ?")
            .bind(slug)
            .fetch_all(self.0)
            .await
    }
}

fn row_to_unit(row: sqlx::sqlite::SqliteRow) -> Result<NetworkUnitRow, AppError> {
    let id: String = row.get("id");
    let services: String = row.get("services");
    let services = serde_json::from_str(&services).map_err(|e| {
        AppError::Internal(format!("corrupt services column on unit {id}: {e}"))
    })?;
    Ok(NetworkUnitRow {
        id,
        name: row.get("name"),
        address: row.get("address"),
        phone: row.get("phone"),
        services,
        image_url: row.get("image_url"),
        is_active: row.get("is_active"),
        whatsapp: row.get("whatsapp"),
        google_maps_url: row.get("google_maps_url"),
        url_slug: row.get("url_slug"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const SELECT_UNITS: &str = "SELECT id, name, address, phone, services, image_url, is_active, whatsapp, google_maps_url, url_slug, created_at, updated_at FROM network_units";

fn services_json(services: &[String]) -> Result<String, AppError> {
    serde_json::to_string(services).map_err(|e| AppError::Internal(e.to_string()))
}

pub async fn get_unit(pool: &SqlitePool, unit_id: &str) -> Result<NetworkUnitRow, AppError> {
    let row = sqlx::query(&format!("{SELECT_UNITS} WHERE id = ?"))
        .bind(unit_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("unknown_network_unit".to_string()))?;

    row_to_unit(row)
}

pub async fn get_unit_by_slug(pool: &SqlitePool, slug: &str) -> Result<NetworkUnitRow, AppError> {
    let row = sqlx::query(&format!("{SELECT_UNITS} WHERE url_slug = ?"))
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("unknown_network_unit".to_string()))?;

    row_to_unit(row)
}

pub async fn list_units(pool: &SqlitePool) -> Result<Vec<NetworkUnitRow>, AppError> {
    let rows = sqlx::query(&format!("{SELECT_UNITS} ORDER BY created_at, name"))
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(row_to_unit).collect()
}

/// Validate a slug typed by an admin and make sure nobody else holds it.
async fn check_explicit_slug(
    pool: &SqlitePool,
    requested: &str,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    slug::validate_slug(requested).map_err(|e| AppError::BadRequest(e.to_string()))?;
    if !resolver::is_slug_available(&UnitSlugs(pool), requested, exclude_id).await? {
        return Err(AppError::Conflict(format!(
            "url slug \"{requested}\" is already in use"
        )));
    }
    Ok(())
}

fn explicit_conflict(e: sqlx::Error) -> AppError {
    if is_slug_conflict(&e) {
        AppError::Conflict("url slug is already in use".to_string())
    } else {
        AppError::from(e)
    }
}

/// Resolve a slug for `name` and hand it to `write`. When a concurrent writer
/// committed the same slug first, the resolver runs again against the new
/// state, up to [`MAX_WRITE_ATTEMPTS`] writes in total.
async fn write_with_unique_slug<F, Fut>(
    pool: &SqlitePool,
    settings: &ResolverSettings,
    name: &str,
    exclude_id: Option<&str>,
    mut write: F,
) -> Result<String, AppError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<(), sqlx::Error>>,
{
    let mut attempt = 1;
    loop {
        let slug =
            resolver::resolve_unique_slug(&UnitSlugs(pool), name, exclude_id, settings).await?;

        match write(slug.clone()).await {
            Ok(()) => return Ok(slug),
            Err(e) if is_slug_conflict(&e) && attempt < MAX_WRITE_ATTEMPTS => {
                tracing::warn!(%slug, attempt, "slug taken by a concurrent write, re-resolving");
                attempt += 1;
            }
            Err(e) if is_slug_conflict(&e) => {
                tracing::error!(name, %slug, attempt, "slug still conflicting, giving up");
                return Err(AppError::Conflict("url slug is already in use".to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn insert_unit(
    pool: &SqlitePool,
    id: &str,
    input: &CreateNetworkUnit,
    services: &str,
    url_slug: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO network_units (id, name, address, phone, services, image_url, is_active, whatsapp, google_maps_url, url_slug) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&input.name)
    .bind(&input.address)
    .bind(&input.phone)
    .bind(services)
    .bind(&input.image_url)
    .bind(input.is_active.unwrap_or(true))
    .bind(&input.whatsapp)
    .bind(&input.google_maps_url)
    .bind(url_slug)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create_unit(
    pool: &SqlitePool,
    settings: &ResolverSettings,
    input: &CreateNetworkUnit,
) -> Result<NetworkUnitRow, AppError> {
    let id = Uuid::new_v4().to_string();
    let services = services_json(&input.services)?;

    match &input.url_slug {
        Some(requested) => {
            check_explicit_slug(pool, requested, None).await?;
            insert_unit(pool, &id, input, &services, requested)
                .await
                .map_err(explicit_conflict)?;
        }
        None => {
            let (id, services) = (id.as_str(), services.as_str());
            write_with_unique_slug(pool, settings, &input.name, None, move |slug| async move {
                insert_unit(pool, id, input, services, &slug).await
            })
            .await?;
        }
    }

    let unit = get_unit(pool, &id).await?;
    tracing::info!(unit_id = %unit.id, slug = %unit.url_slug, "network unit created");
    Ok(unit)
}

async fn execute_update(
    pool: &SqlitePool,
    unit_id: &str,
    sets: &[String],
    values: &[String],
    int_binds: &[i64],
    url_slug: Option<String>,
) -> Result<(), sqlx::Error> {
    let mut clauses = sets.to_vec();
    if url_slug.is_some() {
        clauses.push("url_slug = ?".to_string());
    }
    clauses.push("updated_at = datetime('now')".to_string());
    let query = format!("UPDATE network_units SET {} WHERE id = ?", clauses.join(", "));

    let mut q = sqlx::query(&query);
    for v in values {
        q = q.bind(v);
    }
    for val in int_binds {
        q = q.bind(val);
    }
    if let Some(slug) = url_slug {
        q = q.bind(slug);
    }
    q = q.bind(unit_id);
    q.execute(pool).await?;
    Ok(())
}

/// Partial update. A new `name` without an explicit `url_slug` re-slugs the
/// unit from the new name; the unit's own current slug is not a collision.
pub async fn update_unit(
    pool: &SqlitePool,
    settings: &ResolverSettings,
    unit_id: &str,
    input: &UpdateNetworkUnit,
) -> Result<NetworkUnitRow, AppError> {
    let current = get_unit(pool, unit_id).await?;

    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(ref name) = input.name {
        sets.push("name = ?".to_string());
        values.push(name.clone());
    }
    if let Some(ref address) = input.address {
        sets.push("address = ?".to_string());
        values.push(address.clone());
    }
    if let Some(ref phone) = input.phone {
        sets.push("phone = ?".to_string());
        values.push(phone.clone());
    }
    if let Some(ref services) = input.services {
        sets.push("services = ?".to_string());
        values.push(services_json(services)?);
    }
    if let Some(ref image_url) = input.image_url {
        sets.push("image_url = ?".to_string());
        values.push(image_url.clone());
    }
    if let Some(ref whatsapp) = input.whatsapp {
        sets.push("whatsapp = ?".to_string());
        values.push(whatsapp.clone());
    }
    if let Some(ref google_maps_url) = input.google_maps_url {
        sets.push("google_maps_url = ?".to_string());
        values.push(google_maps_url.clone());
    }

    let mut int_binds: Vec<i64> = Vec::new();
    if let Some(is_active) = input.is_active {
        sets.push("is_active = ?".to_string());
        int_binds.push(if is_active { 1 } else { 0 });
    }

    match (&input.url_slug, &input.name) {
        (Some(requested), _) => {
            if *requested != current.url_slug {
                check_explicit_slug(pool, requested, Some(unit_id)).await?;
            }
            execute_update(pool, unit_id, &sets, &values, &int_binds, Some(requested.clone()))
                .await
                .map_err(explicit_conflict)?;
        }
        (None, Some(name)) => {
            let (sets, values, int_binds) = (&sets, &values, &int_binds);
            let slug = write_with_unique_slug(pool, settings, name, Some(unit_id), move |slug| {
                execute_update(pool, unit_id, sets, values, int_binds, Some(slug))
            })
            .await?;
            if slug != current.url_slug {
                tracing::info!(%unit_id, old = %current.url_slug, new = %slug, "network unit re-slugged");
            }
        }
        (None, None) => {
            if sets.is_empty() {
                return Ok(current);
            }
            execute_update(pool, unit_id, &sets, &values, &int_binds, None).await?;
        }
    }

    get_unit(pool, unit_id).await
}

/// Re-derive the unit's slug from its current name.
pub async fn regenerate_slug(
    pool: &SqlitePool,
    settings: &ResolverSettings,
    unit_id: &str,
) -> Result<NetworkUnitRow, AppError> {
    let current = get_unit(pool, unit_id).await?;
    let slug = write_with_unique_slug(pool, settings, &current.name, Some(unit_id), |slug| {
        execute_update(pool, unit_id, &[], &[], &[], Some(slug))
    })
    .await?;
    tracing::info!(%unit_id, old = %current.url_slug, new = %slug, "network unit slug regenerated");
    get_unit(pool, unit_id).await
}

/// Regenerate every unit's slug. One unit failing (e.g. a name with no
/// letters or digits) does not stop the rest; each outcome is returned
/// alongside the slug the unit had before.
pub async fn regenerate_all(
    pool: &SqlitePool,
    settings: &ResolverSettings,
) -> Result<Vec<(NetworkUnitRow, Result<NetworkUnitRow, AppError>)>, AppError> {
    let mut outcomes = Vec::new();
    for unit in list_units(pool).await? {
        let result = regenerate_slug(pool, settings, &unit.id).await;
        if let Err(ref e) = result {
            tracing::warn!(unit_id = %unit.id, name = %unit.name, "skipping slug regeneration: {e}");
        }
        outcomes.push((unit, result));
    }
    Ok(outcomes)
}

pub async fn delete_unit(pool: &SqlitePool, unit_id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM network_units WHERE id = ?")
        .bind(unit_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("unknown_network_unit".to_string()));
    }
    Ok(())
}
