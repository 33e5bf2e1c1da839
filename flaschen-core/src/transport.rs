//! Datagram transport for wire frames.
//!
//! The sending side is abstracted behind [`DatagramSink`] so the encoder
//! can be driven against anything that accepts whole datagrams. The
//! production sink is [`UdpTransport`], a connected UDP socket.
//!
//! Delivery is fire-and-forget: no acknowledgement, no retry, no
//! ordering. A receiving display must treat every frame as an
//! independent overwrite of the region it names.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::{debug, warn};

use crate::error::FlaschenError;
use crate::wire::{MAX_PACKET, WireFrame};

// ── DatagramSink ─────────────────────────────────────────────────

/// Anything that can carry one datagram at a time.
#[async_trait]
pub trait DatagramSink: Send + Sync {
    /// Hand one complete datagram to the transport.
    async fn send(&self, datagram: &[u8]) -> io::Result<()>;
}

// ── UdpTransport ─────────────────────────────────────────────────

/// Connected UDP socket pointed at a display server.
pub struct UdpTransport {
    socket: UdpSocket,
    remote_addr: SocketAddr,
    datagrams_sent: AtomicU64,
    bytes_sent: AtomicU64,
}

impl UdpTransport {
    /// Bind an ephemeral local port and connect it to `(host, port)`.
    pub async fn connect(host: &str, port: u16) -> Result<Self, FlaschenError> {
        Self::connect_addr((host, port)).await
    }

    /// Like [`connect`](Self::connect) for any resolvable address.
    pub async fn connect_addr(addr: impl ToSocketAddrs) -> Result<Self, FlaschenError> {
        let remote_addr = tokio::net::lookup_host(addr).await?.next().ok_or_else(|| {
            FlaschenError::Connection(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "display address did not resolve",
            ))
        })?;

        let local: SocketAddr = if remote_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(remote_addr).await?;
        debug!("UDP transport {} → {remote_addr}", socket.local_addr()?);

        Ok(Self {
            socket,
            remote_addr,
            datagrams_sent: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
        })
    }

    /// The display this transport targets.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Local address of the underlying socket.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Total datagrams sent since construction.
    pub fn datagrams_sent(&self) -> u64 {
        self.datagrams_sent.load(Ordering::Relaxed)
    }

    /// Total bytes sent since construction.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DatagramSink for UdpTransport {
    async fn send(&self, datagram: &[u8]) -> io::Result<()> {
        let sent = self.socket.send(datagram).await?;
        if sent != datagram.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short datagram write: {sent} of {}", datagram.len()),
            ));
        }
        self.datagrams_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(sent as u64, Ordering::Relaxed);
        Ok(())
    }
}

// ── FrameReceiver ────────────────────────────────────────────────

/// Display-side socket that yields decoded wire frames.
pub struct FrameReceiver {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl FrameReceiver {
    /// Bind to `addr` (use port 0 for an ephemeral port).
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, FlaschenError> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket,
            buf: vec![0u8; MAX_PACKET],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive the next well-formed frame.
    ///
    /// Malformed datagrams are logged and skipped.
    pub async fn recv_frame(&mut self) -> Result<(WireFrame, SocketAddr), FlaschenError> {
        loop {
            let (len, peer) = self.socket.recv_from(&mut self.buf).await?;
            match WireFrame::decode(&self.buf[..len]) {
                Ok(frame) => return Ok((frame, peer)),
                Err(e) => warn!("dropping {len}-byte datagram from {peer}: {e}"),
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn udp_transport_send_receive() {
        let mut receiver = FrameReceiver::bind("127.0.0.1:0").await.unwrap();
        let port = receiver.local_addr().unwrap().port();
        let transport = UdpTransport::connect("127.0.0.1", port).await.unwrap();

        let frame = WireFrame {
            width: 1,
            height: 1,
            x_offset: 0,
            y_offset: 0,
            layer: 4,
            pixels: vec![9, 8, 7],
        };
        transport.send(&frame.encode()).await.unwrap();

        let (received, peer) = receiver.recv_frame().await.unwrap();
        assert_eq!(received, frame);
        assert_eq!(peer.port(), transport.local_addr().unwrap().port());
        assert_eq!(transport.datagrams_sent(), 1);
        assert_eq!(transport.bytes_sent(), frame.encoded_len() as u64);
    }

    #[tokio::test]
    async fn receiver_skips_garbage() {
        let mut receiver = FrameReceiver::bind("127.0.0.1:0").await.unwrap();
        let addr = receiver.local_addr().unwrap();
        let transport = UdpTransport::connect_addr(addr).await.unwrap();

        transport.send(b"not a frame").await.unwrap();
        transport.send(b"P6\n1 1\n255\n\x01\x02\x03").await.unwrap();

        let (frame, _) = receiver.recv_frame().await.unwrap();
        assert_eq!(frame.pixels, vec![1, 2, 3]);
    }
}
