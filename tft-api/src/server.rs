use std::{future::Future, io, net::SocketAddr};

use axum::Router;
use log::info;
use thiserror::Error;
use tokio::net::TcpListener;

/// Errors raised while running the server.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to read the bound address")]
    LocalAddr(#[source] io::Error),
    #[error("HTTP server failed")]
    Serve(#[source] io::Error),
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = listener.local_addr().map_err(ServeError::LocalAddr)?;
    info!("HTTP API listening on http://{addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("HTTP API shutting down");
        })
        .await
        .map_err(ServeError::Serve)
}
