//! `ChatServer` builder and accept loop.
//!
//! This is the entry point for running a chatwire server. It ties
//! together the layers: transport → protocol → session → relay.

use std::sync::Arc;

use chatwire_protocol::PacketRegistry;
use chatwire_transport::{
    FrameCodec, TcpTransport, Transport, DEFAULT_MAX_FRAME_BYTES,
};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::relay::Roster;
use crate::ChatError;

/// Tunable server limits.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How long a fresh connection may sit unauthenticated before the
    /// server closes it.
    pub handshake_timeout_secs: u64,
    /// Maximum accepted frame size on the wire.
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_secs: 30,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// roster is the only mutable piece and sits behind a `Mutex`; the
/// registry is read-only after startup.
pub(crate) struct ServerState {
    pub(crate) roster: Mutex<Roster>,
    pub(crate) registry: PacketRegistry,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a chat server.
///
/// # Example
///
/// ```rust,ignore
/// use chatwire::ChatServer;
///
/// let server = ChatServer::builder()
///     .bind("0.0.0.0:5000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ChatServerBuilder {
    bind_addr: String,
    config: ServerConfig,
}

impl ChatServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the handshake timeout in seconds.
    pub fn handshake_timeout_secs(mut self, secs: u64) -> Self {
        self.config.handshake_timeout_secs = secs;
        self
    }

    /// Sets the maximum accepted frame size.
    pub fn max_frame_bytes(mut self, bytes: usize) -> Self {
        self.config.max_frame_bytes = bytes;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<ChatServer, ChatError> {
        let codec = FrameCodec::new(self.config.max_frame_bytes);
        let transport =
            TcpTransport::bind_with_codec(&self.bind_addr, codec).await?;

        let state = Arc::new(ServerState {
            roster: Mutex::new(Roster::new()),
            registry: PacketRegistry::with_defaults(),
            config: self.config,
        });

        Ok(ChatServer { transport, state })
    }
}

impl Default for ChatServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running chat server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ChatServer {
    transport: TcpTransport,
    state: Arc<ServerState>,
}

impl ChatServer {
    /// Creates a new builder.
    pub fn builder() -> ChatServerBuilder {
        ChatServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// An accept error is logged and the loop continues; the server runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), ChatError> {
        tracing::info!("chatwire server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
