//! Prerender proxy (v1)
//!
//! An edge proxy that answers crawlers from pre-rendered snapshots and
//! proxies everyone else to the live rendering origin.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────────┐
//!                        │                   PRERENDER PROXY                     │
//!                        │                                                       │
//!   Client Request       │  ┌─────────┐   ┌──────────┐   ┌───────────┐          │
//!   ─────────────────────┼─▶│  http   │──▶│ routing  │──▶│ detection │          │
//!                        │  │ server  │   │  router  │   │ classifier│          │
//!                        │  └─────────┘   └────┬─────┘   └───────────┘          │
//!                        │                     │                                 │
//!                        │          bot + hit  │  human / miss / reserved        │
//!                        │            ┌────────┴─────────┐                       │
//!                        │            ▼                  ▼                       │
//!                        │     ┌────────────┐    ┌──────────────┐                │
//!   Client Response      │     │   store    │    │    proxy     │                │
//!   ◀────────────────────┼─────│  snapshot  │    │  upstream +  │◀───────────────┼──── Rendering
//!                        │     │   lookup   │    │  rewrite     │                │     Origin
//!                        │     └────────────┘    └──────────────┘                │
//!                        │                                                       │
//!                        │  config · observability · lifecycle                   │
//!                        └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;

use tokio::net::TcpListener;

use prerender_proxy::config::resolve_config;
use prerender_proxy::observability::{logging, metrics};
use prerender_proxy::lifecycle::signals::wait_for_shutdown_signal;
use prerender_proxy::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(|key| std::env::var(key).ok());

    let log_level = config
        .as_ref()
        .map(|c| c.observability.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    logging::init_logging(&log_level);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!("prerender-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.site.upstream_origin,
        canonical = %config.site.canonical_origin,
        debug = config.site.debug,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        trigger.trigger();
    });

    match tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse()?;
            server.run_tls(addr, &tls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
