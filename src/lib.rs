pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::ServiceConfig;
use crate::services::file_service::FileService;
use crate::services::storage::StorageService;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::files::upload_file,
        api::handlers::files::get_file,
        api::handlers::files::download_file,
        api::handlers::files::delete_image,
        api::handlers::files::get_file_with_token,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::files::UploadForm,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "files", description = "Object storage endpoints"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    pub file_service: Arc<FileService>,
    pub config: ServiceConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/upload", post(api::handlers::files::upload_file))
        .route("/file/:key", get(api::handlers::files::get_file))
        .route("/download/:file_name", get(api::handlers::files::download_file))
        .route("/delete", delete(api::handlers::files::delete_image))
        .route(
            "/:file_path/:token",
            get(api::handlers::files::get_file_with_token),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_file_size + 1024 * 1024, // multipart framing overhead
        ))
        .with_state(state)
}
