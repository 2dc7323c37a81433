use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::bootstrap;
use crate::infrastructure::config::ConfigService;
use crate::interfaces::http::start_server;

fn to_io_error(err: crate::domain::error::AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

pub async fn run() -> std::io::Result<()> {
    let config = ConfigService::load().map_err(to_io_error)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let state = bootstrap::setup(&config).map_err(|err| {
        error!(error = %err, "Failed to initialise services");
        to_io_error(err)
    })?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting HTTP server"
    );
    start_server(state, &config.server.host, config.server.port)?.await
}
