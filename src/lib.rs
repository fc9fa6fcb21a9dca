pub mod api;
pub mod config;
pub mod services;
pub mod utils;

use crate::config::RelayConfig;
use crate::services::staging::StagingArea;
use crate::services::upstream::UpstreamClient;
use axum::{
    Router,
    http::header,
    routing::{get, patch},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::profile_image::upload_profile_image,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "profile", description = "Profile image relay endpoints"),
        (name = "system", description = "Service health endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn UpstreamClient>,
    pub staging: StagingArea,
    pub config: RelayConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/upload-profile-image",
            patch(api::handlers::profile_image::upload_profile_image),
        )
        // Browsers go through the relay precisely because the upstream is not
        // CORS-reachable, so the inbound surface stays wide open. The token
        // header has to be listed by name: a wildcard does not cover it.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
                .expose_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_size,
        ))
        .with_state(state)
}
