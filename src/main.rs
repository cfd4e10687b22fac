mod config;
mod routes;
mod services;
mod state;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    State(#[from] state::StateError),
    #[error("failed to bind port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring unreadable .env: {e}");
        }
    }
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env()?;
    let port = config.port;
    tracing::info!(
        backend = %config.backend_url,
        static_dir = %config.static_dir.display(),
        secure_cookies = config.cookie_secure,
        "configuration loaded"
    );

    let state = state::AppState::from_config(config)?;
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|source| StartupError::Bind { port, source })?;

    tracing::info!(%port, "finup gateway listening");
    axum::serve(listener, app).await.map_err(StartupError::Serve)
}
