mod health;
mod slugs;
pub mod units;

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Network units (admin)
        .route(
            "/network-units",
            get(units::list_units).post(units::create_unit),
        )
        .route(
            "/network-units/{unit_id}",
            get(units::get_unit)
                .patch(units::update_unit)
                .delete(units::delete_unit),
        )
        .route(
            "/network-units/{unit_id}/regenerate-slug",
            put(units::regenerate_slug),
        )
        // Public unit lookup
        .route("/unit/{slug}", get(units::get_unit_by_slug))
        // Slug tooling
        .route("/slugs/suggestions", get(slugs::suggestions))
        .route("/slugs/availability", get(slugs::availability))
        .route("/slugs/preview", get(slugs::preview))
        // Version
        .route("/version", get(health::version))
}
