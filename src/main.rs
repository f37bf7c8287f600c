//! Server entry point.

use signcoach::api::{self, ApiState};
use signcoach::auth::TokenService;
use signcoach::curriculum::{seed, CurriculumStore};
use signcoach::inference::InferenceClient;
use signcoach::practice::PracticeStore;
use signcoach::users::UserStore;
use signcoach::{Config, Db};

use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("signcoach.toml"));
    let config = Config::load(&config_path)?;

    info!(database = %config.database.path, "connecting to database");
    let db = Db::connect(&config.database.path).await?;
    seed::run(&db.pool).await?;

    let state = Arc::new(ApiState {
        users: UserStore::new(db.pool.clone()),
        curriculum: CurriculumStore::new(db.pool.clone()),
        practice: PracticeStore::new(db.pool.clone()),
        tokens: TokenService::new(&config.auth.secret, config.auth.token_ttl_hours),
        inference: InferenceClient::new(
            &config.inference.endpoint,
            config.inference.timeout_secs,
        )?,
    });

    let app = api::router(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address).await?;
    info!("listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
