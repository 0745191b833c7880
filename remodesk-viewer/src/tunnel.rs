//! Secure-shell tunnel collaborator.
//!
//! For a tunneled session the viewer authenticates over SSH, opens an
//! interactive channel, sends the fixed startup line that tells the
//! remote side to begin streaming, and from then on treats the channel
//! as the byte stream.
//!
//! `libssh2` sessions must not be driven from two threads at once, so
//! the channel is bridged to a loopback TCP socket by a single pump
//! thread; the receiver then speaks plain TCP either way.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use ssh2::Session;
use tracing::{debug, info, warn};

use remodesk_core::RemoError;

/// Sent down the interactive channel to start the stream.
const STARTUP_COMMAND: &[u8] = b"startremotedesktop\n";

/// Pump idle interval while both directions are quiet.
const PUMP_IDLE: Duration = Duration::from_millis(1);

/// Establish an SSH tunnel to `host:port` and return the loopback
/// address the byte stream is reachable at.
///
/// The bridge accepts exactly one connection; when either side closes,
/// the other is dropped and the receiver's reconnect machinery takes
/// over (which builds a fresh tunnel).
pub fn open(host: &str, port: u16, user: &str, password: &str) -> Result<SocketAddr, RemoError> {
    let tcp = TcpStream::connect((host, port))?;
    let mut sess = Session::new().map_err(|e| RemoError::Tunnel(e.to_string()))?;
    sess.set_tcp_stream(tcp);
    sess.handshake()
        .map_err(|e| RemoError::Tunnel(format!("handshake: {e}")))?;
    sess.userauth_password(user, password)
        .map_err(|e| RemoError::Tunnel(format!("auth: {e}")))?;

    let mut channel = sess
        .channel_session()
        .map_err(|e| RemoError::Tunnel(format!("channel: {e}")))?;
    channel
        .request_pty("xterm", None, None)
        .map_err(|e| RemoError::Tunnel(format!("pty: {e}")))?;
    channel
        .shell()
        .map_err(|e| RemoError::Tunnel(format!("shell: {e}")))?;
    channel.write_all(STARTUP_COMMAND)?;
    info!("tunnel established to {host}:{port}");

    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    thread::spawn(move || {
        let local = match listener.accept() {
            Ok((stream, _)) => stream,
            Err(e) => {
                warn!("tunnel bridge accept failed: {e}");
                return;
            }
        };
        pump(sess, channel, local);
        debug!("tunnel bridge closed");
    });

    Ok(addr)
}

/// Full-duplex byte pump between the SSH channel and the local socket.
///
/// Everything runs non-blocking on this one thread; short queues absorb
/// the direction that is momentarily not writable.
fn pump(sess: Session, mut channel: ssh2::Channel, local: TcpStream) {
    if local.set_nonblocking(true).is_err() {
        return;
    }
    sess.set_blocking(false);

    let mut local = local;
    let mut buf = [0u8; 16 * 1024];
    let mut to_remote: VecDeque<u8> = VecDeque::new();
    let mut to_local: VecDeque<u8> = VecDeque::new();

    loop {
        let mut moved = false;

        // local → queue
        match local.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                to_remote.extend(&buf[..n]);
                moved = true;
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(_) => break,
        }

        // queue → channel
        if !to_remote.is_empty() {
            let (front, _) = to_remote.as_slices();
            match channel.write(front) {
                Ok(n) if n > 0 => {
                    to_remote.drain(..n);
                    moved = true;
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(_) => break,
            }
        }

        // channel → queue
        match channel.read(&mut buf) {
            Ok(0) => {
                if channel.eof() {
                    break;
                }
            }
            Ok(n) => {
                to_local.extend(&buf[..n]);
                moved = true;
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(_) => break,
        }

        // queue → local
        if !to_local.is_empty() {
            let (front, _) = to_local.as_slices();
            match local.write(front) {
                Ok(n) if n > 0 => {
                    to_local.drain(..n);
                    moved = true;
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(_) => break,
            }
        }

        if !moved {
            thread::sleep(PUMP_IDLE);
        }
    }
}
