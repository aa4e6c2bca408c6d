use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::units::UnitSlugs;
use crate::error::AppError;
use crate::resolver;
use crate::slug;
use crate::state::AppState;

const DEFAULT_SUGGESTIONS: usize = 5;
const MAX_SUGGESTIONS: usize = 25;

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub text: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub slug: String,
    pub exclude_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub text: String,
}

/// Free alternatives for a name, for the "pick another address" form.
pub async fn suggestions(
    state: State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SUGGESTIONS)
        .min(MAX_SUGGESTIONS);
    let suggestions =
        resolver::suggest_slugs(&UnitSlugs(&state.db), &query.text, limit, &state.slugs).await?;
    Ok(Json(serde_json::json!({
        "data": {
            "base": slug::normalize_to_slug(&query.text),
            "suggestions": suggestions,
        }
    })))
}

pub async fn availability(
    state: State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reason = slug::validate_slug(&query.slug).err();
    let available = resolver::is_slug_available(
        &UnitSlugs(&state.db),
        &query.slug,
        query.exclude_id.as_deref(),
    )
    .await?;
    Ok(Json(serde_json::json!({
        "data": {
            "slug": query.slug,
            "valid": reason.is_none(),
            "available": available,
            "reason": reason,
        }
    })))
}

pub async fn preview(Query(query): Query<PreviewQuery>) -> Json<serde_json::Value> {
    let slug = slug::normalize_to_slug(&query.text);
    Json(serde_json::json!({
        "data": {
            "valid": slug::is_valid_slug(&slug),
            "slug": slug,
        }
    }))
}
