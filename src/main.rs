//! HenaGame auth server
//!
//! Serves registration, login and token-bound identity lookup over HTTP.
//! - Storage: sled (one tree of users keyed by username)
//! - Tokens: HMAC JWTs, 30 minute default lifetime
//! - Docs: Swagger UI on /docs
//!
//! Usage:
//!   cargo run --bin hena_auth          # start server on APP_BIND_ADDR (default 127.0.0.1:8000)
//!   cargo run --bin hena-cli -- login -u alice -p secret123

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hena_auth::auth::{PasswordHasher, TokenService};
use hena_auth::config::Config;
use hena_auth::rest::{create_router, AppState};
use hena_auth::service::AuthService;
use hena_auth::storage::Storage;

/// Console logging always; JSON lines into a daily rolling file when
/// `LOG_DIR` is set. The guard must outlive the server so buffered lines
/// get flushed.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "hena_auth.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "hena_auth=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let _log_guard = init_tracing(&config);

    if config.uses_insecure_secret() {
        tracing::warn!("JWT_SECRET is not set; using the insecure placeholder. Set a real secret for any deployment");
    }

    let data_dir = config.data_dir();
    let storage = Storage::open(&data_dir)
        .with_context(|| format!("opening credential store at {}", data_dir.display()))?;

    let tokens = TokenService::new(
        config.jwt_secret.as_bytes(),
        config.jwt_algorithm,
        config.token_ttl()?,
    )?;
    let auth = AuthService::new(Arc::new(storage.clone()), tokens, PasswordHasher::new(config.bcrypt_cost));
    let app = create_router(AppState::new(auth, config.database_url_set()));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(
        addr = %config.bind_addr,
        data_dir = %data_dir.display(),
        algorithm = ?config.jwt_algorithm,
        ttl_minutes = config.token_ttl_minutes,
        "auth server listening"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.flush()?;
    Ok(())
}
