//! Console transports: one OSC message per UDP datagram, or a shared
//! TCP connection with SLIP framing.
//!
//! Sends fail fast while disconnected. There is no reconnection and no
//! queueing; the layer above re-invokes connect.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::enums::{CoreError, Protocol};
use crate::osc::Buffer;
use crate::show::settings::OscSettings;

/// SLIP framing tables and incremental decoder
pub mod slip;

/// read buffer size for both socket kinds
const READ_BUFFER: usize = 4096;
/// inbound event channel depth
const CHANNEL_DEPTH: usize = 256;

/// Inbound transport signal stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// far side is reachable; safe to start requesting
    Ready,
    /// one framed OSC message
    Packet(Buffer),
    /// socket closed or failed; connection is gone
    Closed,
}

/// The socket behind a connected transport
enum Link {
    /// datagram socket and the console address; replies may come from
    /// any source port, so the socket stays unconnected
    Udp(Arc<UdpSocket>, SocketAddr),
    /// write half of the SLIP stream
    Tcp(OwnedWriteHalf),
    /// send attempted after close
    Down,
}

/// One console connection
pub struct Transport {
    /// live socket handle
    link: Link,
}

impl Transport {
    /// Open a transport per settings. Returns the send handle and the
    /// inbound event stream; `Ready` is the first event once the far
    /// side is reachable.
    ///
    /// # Errors
    /// connect/bind refusal is surfaced as-is; the in-memory model is
    /// untouched by a failed connect
    pub async fn connect(settings: &OscSettings) -> Result<(Self, mpsc::Receiver<TransportEvent>), CoreError> {
        let (events, rx) = mpsc::channel(CHANNEL_DEPTH);

        let link = match settings.protocol {
            Protocol::Udp => {
                let socket = UdpSocket::bind(("0.0.0.0", settings.port)).await?;
                let target = tokio::net::lookup_host((settings.ip_address.as_str(), settings.port)).await?
                    .next()
                    .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "console address did not resolve"))?;
                info!(ip = %settings.ip_address, port = settings.port, "udp transport up");

                let socket = Arc::new(socket);
                tokio::spawn(read_datagrams(socket.clone(), events.clone()));
                Link::Udp(socket, target)
            },
            Protocol::Tcp => {
                let stream = TcpStream::connect((settings.ip_address.as_str(), settings.port)).await?;
                info!(ip = %settings.ip_address, port = settings.port, "tcp transport up");

                let (read_half, write_half) = stream.into_split();
                tokio::spawn(read_stream(read_half, events.clone()));
                Link::Tcp(write_half)
            },
        };

        let _ = events.send(TransportEvent::Ready).await;
        Ok((Self { link }, rx))
    }

    /// Send one OSC message. UDP gets a single datagram; TCP gets a
    /// SLIP frame.
    ///
    /// # Errors
    /// fails fast when the socket is closed or the write errors
    pub async fn send(&mut self, buffer: &Buffer) -> Result<(), CoreError> {
        match &mut self.link {
            Link::Udp(socket, target) => {
                socket.send_to(buffer.as_slice(), *target).await?;
                Ok(())
            },
            Link::Tcp(write_half) => {
                let framed = slip::encode(buffer.as_slice());
                write_half.write_all(&framed).await?;
                Ok(())
            },
            Link::Down => Err(CoreError::NotConnected),
        }
    }

    /// Drop the socket; subsequent sends fail fast
    pub fn close(&mut self) {
        self.link = Link::Down;
    }
}

/// UDP reader task: one message per datagram
async fn read_datagrams(socket: Arc<UdpSocket>, events: mpsc::Sender<TransportEvent>) {
    let mut buf = [0_u8; READ_BUFFER];
    loop {
        match socket.recv_from(&mut buf).await {
            Ok((len, from)) => {
                debug!(len, %from, "datagram received");
                if events.send(TransportEvent::Packet(Buffer::from(&buf[..len]))).await.is_err() {
                    return;
                }
            },
            Err(error) => {
                warn!(%error, "udp socket failed");
                let _ = events.send(TransportEvent::Closed).await;
                return;
            },
        }
    }
}

/// TCP reader task: accumulate segments, emit each completed SLIP frame
async fn read_stream(mut read_half: tokio::net::tcp::OwnedReadHalf, events: mpsc::Sender<TransportEvent>) {
    let mut decoder = slip::Decoder::new();
    let mut buf = [0_u8; READ_BUFFER];

    loop {
        match read_half.read(&mut buf).await {
            Ok(0) => {
                info!("tcp stream closed by console");
                let _ = events.send(TransportEvent::Closed).await;
                return;
            },
            Ok(len) => {
                for frame in decoder.push(&buf[..len]) {
                    if events.send(TransportEvent::Packet(Buffer::from(frame))).await.is_err() {
                        return;
                    }
                }
            },
            Err(error) => {
                warn!(%error, "tcp socket failed");
                let _ = events.send(TransportEvent::Closed).await;
                return;
            },
        }
    }
}
