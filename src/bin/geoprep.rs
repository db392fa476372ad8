use geoprep::app::build_app;
use geoprep::config::load_settings;
use geoprep::shared::logging::init_tracing;
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(anyhow::anyhow!("failed to read .env: {err}"));
        }
    }
    let settings = load_settings()?;
    init_tracing(&settings.log_dir)?;

    let app = build_app(&settings);
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, input = %settings.input_dir.display(), output = %settings.output_dir.display(), "geoprep listening");
    axum::serve(listener, app).await?;
    Ok(())
}
