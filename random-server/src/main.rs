use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use color_eyre::{eyre::WrapErr, Result};
use random_core::HASH_VERSION;
use random_server::{
    config::{load_config, Config, ConfigFormat},
    http::{router, AppState},
    service::RandomService,
};
use random_telemetry::TelemetryHandle;
use tracing_subscriber::EnvFilter;

#[cfg(any(
    all(feature = "dev", feature = "test"),
    all(feature = "dev", feature = "prod"),
    all(feature = "test", feature = "prod")
))]
compile_error!(
    "Only one of the `dev`, `test`, or `prod` features may be enabled for random-server."
);

#[derive(Debug, Parser)]
#[command(
    name = "random-server",
    version,
    about = "Serves uniform and seed-deterministic random numbers over HTTP"
)]
struct Cli {
    /// Path to configuration file (TOML or YAML). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Explicit configuration format override.
    #[arg(long, value_enum, default_value_t = ConfigFormat::Auto)]
    config_format: ConfigFormat,
    /// Listen address for the HTTP and JSON-RPC routes.
    #[arg(long, env = "HTTP_LISTEN")]
    http_listen: Option<String>,
    /// Hex-encoded 32-byte seed for deterministic selection.
    #[arg(long, env = "SEED_HEX", hide_env_values = true)]
    seed_hex: Option<String>,
    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = match &cli.config {
        Some(path) => load_config(path, cli.config_format)?,
        None => Config::default(),
    };
    if let Some(listen) = cli.http_listen {
        config.server.http_listen = listen;
    }
    if let Some(seed_hex) = cli.seed_hex {
        config.selection.seed_hex = seed_hex;
    }
    config.validate()?;

    let telemetry = TelemetryHandle::from_config(config.telemetry.clone());
    let service = Arc::new(RandomService::new(config.seed()?, telemetry.clone())?);
    spawn_telemetry_flush(telemetry);

    let bind: SocketAddr = config
        .server
        .http_listen
        .parse()
        .wrap_err("invalid http-listen address")?;
    let app = router(AppState::new(
        Arc::clone(&service),
        config.server.max_probabilities_chars,
    ));

    tracing::info!(
        ?bind,
        seed = %service.seed_fingerprint(),
        hash = HASH_VERSION,
        "random server starting"
    );

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .wrap_err_with(|| format!("unable to bind {bind}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    service.telemetry().flush_to_log()?;
    tracing::info!("random server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn spawn_telemetry_flush(telemetry: TelemetryHandle) {
    let period = Duration::from_millis(telemetry.flush_interval().max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(err) = telemetry.flush_to_log() {
                tracing::warn!(error = %err, "telemetry flush failed");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
