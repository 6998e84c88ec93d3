use std::net::SocketAddr;

use anyhow::Context;
use mio::net::TcpListener;
use tracing::info;

/// Binds the non-blocking listening socket for the management interface.
pub fn bind(listen_addr: &str) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {listen_addr}"))?;
    let listener = TcpListener::bind(addr).with_context(|| format!("binding {addr}"))?;
    info!("Listening on {addr}");
    Ok(listener)
}
