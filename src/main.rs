//! Managed HTTP server (demo binary)
//!
//! Serves a configured instance until SIGINT/SIGTERM, then closes it
//! gracefully.
//!
//! ```text
//! managed-server --config server.toml
//! managed-server --bind 127.0.0.1:9000 --name "Demo API"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Json};
use clap::Parser;
use serde_json::json;

use managed_server::config::load_config;
use managed_server::lifecycle::shutdown_signal;
use managed_server::observability::logging;
use managed_server::{Engine, ManagedServer, PlatformConfig, ReadinessCheck, ServerOptions};

#[derive(Parser)]
#[command(name = "managed-server")]
#[command(about = "Run an HTTP server under a managed lifecycle", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overrides the config file.
    #[arg(short, long)]
    bind: Option<String>,

    /// Display name, overrides the config file.
    #[arg(short, long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(logging::DEFAULT_FILTER);

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PlatformConfig::default(),
    };

    let mut options = ServerOptions::from(config);
    if let Some(bind) = cli.bind {
        options = options.with_bind_address(bind);
    }
    if let Some(name) = cli.name {
        options = options.with_name(name);
    }

    tracing::info!(
        name = %options.name(),
        bind_address = %options.bind_address(),
        "Configuration loaded"
    );

    let app_name = options.app_name().to_string();
    let readiness = ReadinessCheck::new();
    let healthz = readiness.clone();
    let server = Arc::new(ManagedServer::new(
        move |engine: &mut Engine| {
            let app_name = app_name.clone();
            engine
                .route("/", get(move || async move { Json(json!({ "app": app_name })) }))
                .route("/healthz", healthz.route());
            Ok(())
        },
        options,
    ));
    readiness.attach(&server);

    let closer = {
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            shutdown_signal().await;
            server.close().await
        })
    };

    server.listen().await?;
    closer.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
