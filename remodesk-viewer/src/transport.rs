//! Connection establishment for both transports.
//!
//! Either way the receiver ends up holding a plain `TcpStream`: a
//! direct connection dials the host, a tunneled one dials the local
//! end of the SSH bridge set up by [`crate::tunnel`].

use std::net::TcpStream;

use tracing::info;

use remodesk_core::RemoError;

use crate::config::{ConnectionConfig, TransportKind};
use crate::tunnel;

/// Open the byte stream to the host.
pub fn connect(config: &ConnectionConfig) -> Result<TcpStream, RemoError> {
    match config.transport_kind()? {
        TransportKind::Direct => {
            let stream = TcpStream::connect((config.host.as_str(), config.port))?;
            info!("connected to {}:{}", config.host, config.port);
            Ok(stream)
        }
        TransportKind::Tunneled => {
            let local = tunnel::open(
                &config.host,
                config.port,
                &config.user,
                &config.password,
            )?;
            let stream = TcpStream::connect(local)?;
            info!(
                "connected to {}:{} through the tunnel",
                config.host, config.port
            );
            Ok(stream)
        }
    }
}
