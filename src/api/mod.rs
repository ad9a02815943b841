mod display;
mod printer;

pub use display::display_router;
pub use printer::printer_router;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::spool::PrintSpooler;

/// Shared state for both HTTP surfaces.
#[derive(Clone)]
pub struct ApiState {
    pub spooler: Arc<PrintSpooler>,
}

fn with_cors(router: Router<ApiState>, state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    router.layer(cors).with_state(state)
}

/// Serve a router until the shutdown token fires.
pub async fn serve(name: &'static str, addr: SocketAddr, app: Router, shutdown: CancellationToken) {
    tracing::info!(addr = %addr, "Starting {name} server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind {name} server");
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
    {
        tracing::error!(error = %e, "{name} server failed");
    }
}
