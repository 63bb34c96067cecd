//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all handler
//! - Wire up middleware (request ID, tracing, outer timeout)
//! - Bind server to a plain or TLS listener
//! - Dispatch every request to the edge router
//! - Record per-request metrics

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, TlsConfig};
use crate::http::request::{request_id, MakeRequestUuid};
use crate::lifecycle::{build_router, build_router_with_store, ShutdownSignal, StartupError};
use crate::observability::metrics;
use crate::routing::EdgeRouter;
use crate::store::SnapshotStore;

/// How long in-flight requests get to finish on TLS shutdown.
const TLS_DRAIN_GRACE: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<EdgeRouter>,
}

/// HTTP server for the prerender proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server with the store named in the configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let edge = build_router(&config)?;
        Ok(Self::from_edge_router(&config, edge))
    }

    /// Create a server around an existing snapshot store.
    pub fn with_store(config: ProxyConfig, store: Arc<dyn SnapshotStore>) -> Result<Self, StartupError> {
        let edge = build_router_with_store(&config, store)?;
        Ok(Self::from_edge_router(&config, edge))
    }

    fn from_edge_router(config: &ProxyConfig, edge: EdgeRouter) -> Self {
        let state = AppState {
            router: Arc::new(edge),
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server on a bound listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: &TlsConfig,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
        let handle = axum_server::Handle::new();

        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown.recv().await;
            drain.graceful_shutdown(Some(TLS_DRAIN_GRACE));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Main handler: every method and path lands here.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, _body) = request.into_parts();
    let request_id = request_id(&parts.headers);

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %parts.uri.path(),
        "Handling request"
    );

    let routed = state
        .router
        .handle(&parts.method, &parts.uri, &parts.headers)
        .await;

    let status = routed.response.status();
    tracing::info!(
        request_id = %request_id,
        method = %parts.method,
        path = %parts.uri.path(),
        status = status.as_u16(),
        served_by = routed.served_by.as_str(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request served"
    );
    metrics::record_request(
        parts.method.as_str(),
        status.as_u16(),
        routed.served_by.as_str(),
        start_time,
    );

    routed.response
}
