use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handler::{
        auth::auth_handler, captcha::captcha_handler, enquiries::enquiries_handler,
        facades::facades_handler, floorplans::floorplans_handler, listings::listings_handler,
        pages::pages_handler, quotes::quotes_handler, reviews::reviews_handler,
        service_areas::service_areas_handler, settings::settings_handler,
        upgrades::upgrades_handler, upload::upload_handler,
    },
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let upload_dir = app_state.env.upload_dir.clone();

    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/captcha", captcha_handler())
        .nest("/listings", listings_handler())
        .nest("/facades", facades_handler())
        .nest("/floorplans", floorplans_handler())
        .nest("/enquiries", enquiries_handler())
        .nest("/reviews", reviews_handler())
        .nest("/settings", settings_handler())
        .nest("/pages", pages_handler())
        .nest("/upgrades", upgrades_handler())
        .nest("/service-areas", service_areas_handler())
        .nest("/quotes", quotes_handler())
        .nest("/upload", upload_handler());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}
