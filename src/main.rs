use std::path::PathBuf;

use axum::routing::get;
use devhub::config::Configuration;
use devhub::{app, initialize_state, telemetry};
use opentelemetry::global;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::var("CONFIG_PATH").map(PathBuf::from).unwrap_or_default();

    // Logs emitted while reading the file go to stdout, before OTLP is known.
    let config = tracing::subscriber::with_default(tracing_subscriber::fmt().finish(), || {
        Configuration::default().path(path).read()
    })?;

    let otlp = match config.telemetry.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            global::set_tracer_provider(telemetry::setup_tracer(endpoint)?);
            Some(telemetry::setup_logging(endpoint)?)
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(otlp)
        .init();

    let state = initialize_state(config.clone()).await?;
    let mut router = app(state);

    if config.telemetry.metrics {
        let handle = telemetry::setup_metrics_recorder()?;
        router = router.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    let listener = TcpListener::bind(("0.0.0.0", config.port())).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        version = config.version(),
        "server is listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");

    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
