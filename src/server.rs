use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ServerConfig};
use crate::platform;
use crate::probe::{Host, SystemProbe};
use crate::transport::{http, stdio};

/// Logs always go to stderr; stdout belongs to the stdio transport.
pub fn init_tracing(config: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_ansi(false).init(),
    }
}

pub fn build_host(config: &ServerConfig) -> Host {
    let platform = platform::detect();
    info!(
        os = %platform.os,
        arch = platform.arch,
        wsl = platform.is_wsl,
        "platform detected"
    );
    Host::new(
        platform,
        Box::new(SystemProbe::new(Duration::from_secs(
            config.command_timeout_secs,
        ))),
        config.external_ip_url.clone(),
        Duration::from_secs(config.external_ip_timeout_secs),
    )
}

pub async fn run(config: ServerConfig) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "hostscope starting");
    let host = Arc::new(build_host(&config));

    let Some(addr) = config.http_addr() else {
        return stdio::serve(host).await;
    };

    let app = http::router(host).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;

    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("hostscope stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("interrupted, shutting down"),
        _ = terminate => info!("terminated, shutting down"),
    }
}
