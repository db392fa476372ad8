use crate::config::Settings;
use crate::http::{configure_routes, AppState, ClientSettings};
use crate::ingest::ArtifactIngestor;
use crate::modules::{default_registry, WorkingDirs};
use crate::router::Dispatcher;
use crate::toolkit::{check_writable_dir, ConverterBinaries, Toolkit};
use axum::Router;
use std::sync::Arc;

/// Wires the six modules, the ingestor and the converters from `settings`.
pub fn build_dispatcher(settings: &Settings) -> Dispatcher {
    let toolkit = Toolkit::new(ConverterBinaries::from(&settings.converters));
    let dirs = WorkingDirs::new(&settings.input_dir, &settings.output_dir);
    let registry = default_registry(&dirs, &toolkit);
    tracing::info!(modules = ?registry.names(), "workflow modules registered");
    Dispatcher::new(registry, ArtifactIngestor::new(&settings.input_dir))
}

pub fn build_app(settings: &Settings) -> Router {
    for dir in [&settings.input_dir, &settings.output_dir] {
        if let Err(err) = check_writable_dir(dir) {
            tracing::warn!(error = %err, "working directory is not usable yet");
        }
    }
    let state = AppState {
        dispatcher: Arc::new(build_dispatcher(settings)),
        client: ClientSettings::from(settings),
    };
    configure_routes(state, &settings.public_dir)
}
