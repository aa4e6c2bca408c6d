use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::db;
use crate::error::AppError;
use crate::models::unit::{CreateNetworkUnit, PublicUnit, UpdateNetworkUnit};
use crate::state::AppState;

pub async fn list_units(state: State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let units = db::units::list_units(&state.db).await?;
    Ok(Json(serde_json::json!({ "data": units })))
}

pub async fn create_unit(
    state: State<AppState>,
    Json(input): Json<CreateNetworkUnit>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let unit = db::units::create_unit(&state.db, &state.slugs, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": unit })),
    ))
}

pub async fn get_unit(
    state: State<AppState>,
    Path(unit_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let unit = db::units::get_unit(&state.db, &unit_id).await?;
    Ok(Json(serde_json::json!({ "data": unit })))
}

pub async fn update_unit(
    state: State<AppState>,
    Path(unit_id): Path<String>,
    Json(input): Json<UpdateNetworkUnit>,
) -> Result<Json<serde_json::Value>, AppError> {
    let unit = db::units::update_unit(&state.db, &state.slugs, &unit_id, &input).await?;
    Ok(Json(serde_json::json!({ "data": unit })))
}

pub async fn delete_unit(
    state: State<AppState>,
    Path(unit_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    db::units::delete_unit(&state.db, &unit_id).await?;
    Ok(Json(serde_json::json!({ "data": null })))
}

pub async fn regenerate_slug(
    state: State<AppState>,
    Path(unit_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let unit = db::units::regenerate_slug(&state.db, &state.slugs, &unit_id).await?;
    let full_url = state.unit_url(&unit.url_slug);
    Ok(Json(serde_json::json!({
        "data": {
            "new_slug": unit.url_slug,
            "full_url": full_url,
            "unit": unit,
        }
    })))
}

/// Public check behind the white-label `/{slug}` pages.
pub async fn get_unit_by_slug(
    state: State<AppState>,
    Path(slug): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    match db::units::get_unit_by_slug(&state.db, &slug).await {
        Ok(unit) => Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "data": {
                    "exists": true,
                    "is_active": unit.is_active,
                    "unit": PublicUnit::from(&unit),
                }
            })),
        )),
        Err(AppError::NotFound(_)) => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "data": { "exists": false, "is_active": false }
            })),
        )),
        Err(e) => Err(e),
    }
}
