//! TCP listener for the proxy server

use std::net::SocketAddr;

use eyre::{Context, Result};
use tokio::net::TcpListener;
use tracing::debug;

/// Bind the proxy listener
///
/// Returns the bound address, which differs from `addr` when port 0 was
/// requested.
pub async fn create_listener(addr: SocketAddr) -> Result<(TcpListener, SocketAddr)> {
    debug!(%addr, "create_listener: binding");
    let listener = TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    let local_addr = listener.local_addr().context("Failed to read bound address")?;
    debug!(%local_addr, "create_listener: bound successfully");
    Ok((listener, local_addr))
}
