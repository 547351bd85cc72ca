//! Pagination proxy server
//!
//! Serves `GET|POST /api/data?limit=..&skip=..` by relaying to the configured
//! `UserSource`. The source is created once at startup and shared by every
//! connection; there is no loopback hop between the handler and the fetch.

use std::sync::Arc;

use eyre::Result;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

mod handler;
mod listener;

pub use handler::{DATA_PATH, handle, respond};
pub use listener::create_listener;

use crate::upstream::UserSource;

/// HTTP/1 server for the proxy endpoint
pub struct ProxyServer {
    source: Arc<dyn UserSource>,
}

impl ProxyServer {
    pub fn new(source: Arc<dyn UserSource>) -> Self {
        debug!("ProxyServer::new: called");
        Self { source }
    }

    /// Accept connections until a shutdown message arrives or the sender is dropped
    pub async fn serve(self, listener: TcpListener, mut shutdown_rx: mpsc::Receiver<()>) -> Result<()> {
        info!(addr = ?listener.local_addr().ok(), "Proxy server accepting connections");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };
                    debug!(%peer, "ProxyServer::serve: connection accepted");

                    let source = self.source.clone();
                    tokio::spawn(async move {
                        let service = service_fn(move |req| handler::handle(req, source.clone()));
                        if let Err(e) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                            debug!(%peer, error = %e, "ProxyServer::serve: connection error");
                        }
                    });
                }
                _ = shutdown_rx.recv() => {
                    debug!("ProxyServer::serve: shutdown requested");
                    break;
                }
            }
        }

        info!("Proxy server stopped");
        Ok(())
    }
}
