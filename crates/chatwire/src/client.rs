//! Terminal chat client.
//!
//! [`ChatClient`] is the I/O shell around
//! [`ClientSession`](chatwire_session::ClientSession): stdin lines go in,
//! the session says what each line means right now, and inbound packets
//! from a spawned reader task drive the handshake verdicts. All protocol
//! rules live in the session; this module only moves bytes and prints.

use std::sync::Arc;

use chatwire_protocol::{Packet, PacketRegistry};
use chatwire_session::{AuthVerdict, ClientSession, InputAction};
use chatwire_transport::{Connection, TcpConnection};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::ChatError;

/// Something the reader task saw on the wire.
enum NetEvent {
    Packet(Packet),
    Closed,
}

/// Interactive client over stdin/stdout.
pub struct ChatClient {
    registry: PacketRegistry,
    session: ClientSession,
}

impl ChatClient {
    /// Creates a client with the default packet registry.
    pub fn new() -> Self {
        Self {
            registry: PacketRegistry::with_defaults(),
            session: ClientSession::new(),
        }
    }

    /// Runs the client until stdin reaches EOF.
    ///
    /// Connection loss does not exit: the session moves to its terminal
    /// offline state and further input is rejected with a visible error,
    /// so the user can still read the backlog and quit cleanly.
    pub async fn run(mut self) -> Result<(), ChatError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let (net_tx, mut net_rx) = mpsc::unbounded_channel::<NetEvent>();

        let mut conn: Option<Arc<TcpConnection>> = None;
        // Input typed mid-handshake; replayed once the nickname is granted.
        let mut held: Vec<String> = Vec::new();

        println!("Please enter the server's IP address and port.");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break; // stdin EOF, clean exit
                    };
                    self.handle_line(&line, &mut conn, &net_tx, &mut held)
                        .await;
                }

                event = net_rx.recv() => {
                    let Some(event) = event else { continue };
                    match event {
                        NetEvent::Packet(packet) => {
                            self.handle_packet(
                                packet, &conn, &mut held,
                            )
                            .await;
                        }
                        NetEvent::Closed => {
                            self.session.connection_lost();
                            conn = None;
                            println!("Lost connection to the server.");
                        }
                    }
                }
            }
        }

        if let Some(conn) = conn {
            let _ = conn.close().await;
        }
        Ok(())
    }

    /// Acts on one line of user input.
    async fn handle_line(
        &mut self,
        line: &str,
        conn: &mut Option<Arc<TcpConnection>>,
        net_tx: &mpsc::UnboundedSender<NetEvent>,
        held: &mut Vec<String>,
    ) {
        match self.session.submit(line) {
            InputAction::Connect { host, port } => {
                println!("Trying to connect...");
                match TcpConnection::connect(&format!("{host}:{port}")).await {
                    Ok(new_conn) => {
                        self.session.connect_succeeded();
                        let new_conn = Arc::new(new_conn);
                        spawn_reader(
                            Arc::clone(&new_conn),
                            self.registry.clone(),
                            net_tx.clone(),
                        );
                        *conn = Some(new_conn);
                        println!("Now connected to {host}:{port}!");
                    }
                    Err(e) => {
                        self.session.connect_failed();
                        tracing::debug!(error = %e, "connect failed");
                        println!("Failed to connect to {host}:{port}.");
                    }
                }
            }
            InputAction::InvalidAddress => {
                println!(
                    "Invalid format.  Format is (for example) 192.168.1.1:5000"
                );
            }
            InputAction::SendAuthRequest { username } => {
                self.send(conn, Packet::AuthRequest { username }).await;
            }
            InputAction::HeldBack => {
                held.push(line.to_string());
            }
            InputAction::SendChat { text } => {
                self.send(conn, Packet::Chat { text }).await;
            }
            InputAction::RejectedOffline { line } => {
                println!(
                    "No connection to server.  \
                     The following message was not sent: <{line}>"
                );
            }
        }
    }

    /// Acts on one inbound packet.
    async fn handle_packet(
        &mut self,
        packet: Packet,
        conn: &Option<Arc<TcpConnection>>,
        held: &mut Vec<String>,
    ) {
        match packet {
            Packet::Chat { text } => println!("{text}"),
            Packet::AuthResponse { success, message } => {
                match self.session.auth_response(success, &message) {
                    Some(AuthVerdict::Accepted { .. }) => {
                        // Lines typed mid-handshake go out as chat now.
                        for line in held.drain(..) {
                            if let InputAction::SendChat { text } =
                                self.session.submit(&line)
                            {
                                self.send(conn, Packet::Chat { text }).await;
                            }
                        }
                    }
                    Some(AuthVerdict::Rejected { taken_nick }) => {
                        held.clear();
                        if let Some(nick) = taken_nick {
                            println!(
                                "Sorry, the nickname '{nick}' is already taken."
                            );
                        }
                        println!("Please select a different username:");
                    }
                    None => {
                        tracing::debug!("ignoring stray auth response");
                    }
                }
            }
            // Only the client sends these; a server echoing one is noise.
            Packet::AuthRequest { .. } => {}
        }
    }

    /// Encodes and sends a packet on the current connection, if any.
    async fn send(
        &mut self,
        conn: &Option<Arc<TcpConnection>>,
        packet: Packet,
    ) {
        let Some(conn) = conn else {
            tracing::debug!("send with no connection");
            return;
        };
        let bytes = match self.registry.encode(&packet) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "packet encode failed");
                return;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(error = %e, "send failed");
            self.session.connection_lost();
            println!("Lost connection to the server.");
        }
    }
}

impl Default for ChatClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads frames off the connection and forwards decoded packets until
/// the connection ends, then reports `Closed`.
fn spawn_reader(
    conn: Arc<TcpConnection>,
    registry: PacketRegistry,
    net_tx: mpsc::UnboundedSender<NetEvent>,
) {
    tokio::spawn(async move {
        loop {
            match conn.recv().await {
                Ok(Some(frame)) => match registry.decode(&frame) {
                    Ok(packet) => {
                        if net_tx.send(NetEvent::Packet(packet)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "bad frame from server");
                        let _ = net_tx.send(NetEvent::Closed);
                        break;
                    }
                },
                Ok(None) => {
                    let _ = net_tx.send(NetEvent::Closed);
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "recv error");
                    let _ = net_tx.send(NetEvent::Closed);
                    break;
                }
            }
        }
    });
}
