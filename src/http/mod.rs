use crate::config::Settings;
use crate::router::Dispatcher;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

pub mod error;
pub mod extract;
pub mod handlers;

pub use error::{first_line, ApiError, ErrorBody};
pub use extract::{ApiJson, ApiQuery};

pub const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Map client bootstrap values.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    pub geoserver_url: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl From<&Settings> for ClientSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            geoserver_url: settings.geoserver_url.clone(),
            lat: settings.initial_lat,
            lon: settings.initial_lon,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub client: ClientSettings,
}

pub fn configure_routes(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/settings", get(handlers::client_settings))
        .route("/launch", post(handlers::launch))
        .route("/reply", post(handlers::reply))
        .route(
            "/file",
            post(handlers::file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/drawing", post(handlers::drawing))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}
