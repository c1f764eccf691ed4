//! TCP transport implementation: a listener plus framed connections.
//!
//! Each accepted `TcpStream` is wrapped in a [`Framed`] with the
//! [`FrameCodec`], then split so that reads and writes can proceed
//! concurrently. The write half sits behind its own mutex, which is what
//! serializes frame sends per connection.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_util::codec::Framed;

use crate::frame::FrameCodec;
use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type FramedStream = Framed<TcpStream, FrameCodec>;

/// A TCP [`Transport`] that listens for incoming framed connections.
pub struct TcpTransport {
    listener: TcpListener,
    codec: FrameCodec,
}

impl TcpTransport {
    /// Binds a listener to the given address with the default frame cap.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        Self::bind_with_codec(addr, FrameCodec::default()).await
    }

    /// Binds a listener with a custom frame codec (frame size cap).
    pub async fn bind_with_codec(
        addr: &str,
        codec: FrameCodec,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener, codec })
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = TcpConnection::from_stream(stream, self.codec);
        tracing::debug!(id = %conn.id(), %addr, "accepted TCP connection");
        Ok(conn)
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A single framed TCP connection.
///
/// Reads and writes are independently locked, so a task blocked on
/// [`recv`](Connection::recv) never starves a concurrent
/// [`send`](Connection::send).
pub struct TcpConnection {
    id: ConnectionId,
    reader: Mutex<SplitStream<FramedStream>>,
    writer: Mutex<SplitSink<FramedStream, Vec<u8>>>,
}

impl TcpConnection {
    fn from_stream(stream: TcpStream, codec: FrameCodec) -> Self {
        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        let (writer, reader) = Framed::new(stream, codec).split();
        Self {
            id,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    /// Connects to a remote server, for the client side of the protocol.
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::ConnectFailed)?;
        tracing::debug!(addr, "connected to server");
        Ok(Self::from_stream(stream, FrameCodec::default()))
    }
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .send(data.to_vec())
            .await
            .map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        match self.reader.lock().await.next().await {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(TransportError::ReceiveFailed(e)),
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .close()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
