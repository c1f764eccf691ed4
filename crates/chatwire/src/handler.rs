//! Per-connection handler: nickname handshake and chat relay.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Send the welcome prompt
//!   2. PreAuth: wait for an `AuthRequest`, claim the nickname
//!   3. Authenticated: relay inbound chat, drain outbound broadcasts
//!   4. On disconnect, release the nickname and announce the departure

use std::sync::Arc;
use std::time::Duration;

use chatwire_protocol::Packet;
use chatwire_session::{Session, SessionError, NICK_IN_USE_PREFIX};
use chatwire_transport::{Connection, TcpConnection};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::server::ServerState;
use crate::ChatError;

/// Greeting pushed to every connection before it has said anything.
const WELCOME_PROMPT: &str =
    "Server: Welcome to the server!  Please select a username:";

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: TcpConnection,
    state: Arc<ServerState>,
) -> Result<(), ChatError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let mut session = Session::new(conn_id);
    let (tx, mut rx) = mpsc::unbounded_channel::<Packet>();

    let handshake_deadline = Instant::now()
        + Duration::from_secs(state.config.handshake_timeout_secs);

    send_packet(&conn, &state, Packet::Chat {
        text: WELCOME_PROMPT.to_string(),
    })
    .await?;

    let result = connection_loop(
        &conn,
        &state,
        &mut session,
        &tx,
        &mut rx,
        handshake_deadline,
    )
    .await;

    // Cleanup runs for every exit path: clean close, decode error,
    // transport error, handshake timeout.
    session.close();
    let departed = state.roster.lock().await.leave(conn_id);
    if let Some(nick) = departed {
        tracing::info!(%conn_id, nick, "peer left");
        state
            .roster
            .lock()
            .await
            .broadcast(&format!("{nick} has left the chat."));
    }
    let _ = conn.close().await;

    result
}

/// Runs the receive/relay loop until the connection ends.
async fn connection_loop(
    conn: &TcpConnection,
    state: &Arc<ServerState>,
    session: &mut Session,
    tx: &mpsc::UnboundedSender<Packet>,
    rx: &mut mpsc::UnboundedReceiver<Packet>,
    handshake_deadline: Instant,
) -> Result<(), ChatError> {
    loop {
        tokio::select! {
            // Outbound: broadcasts queued for this peer.
            outbound = rx.recv() => {
                // The roster holds the only other sender clone; `tx`
                // lives as long as this loop, so recv never yields None
                // here, but a closed channel just ends the connection.
                let Some(packet) = outbound else {
                    return Ok(());
                };
                send_packet(conn, state, packet).await?;
            }

            // Inbound: the peer's next frame.
            inbound = conn.recv() => {
                let frame = match inbound {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        tracing::debug!(
                            conn = %session.conn_id(),
                            "connection closed cleanly"
                        );
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::debug!(
                            conn = %session.conn_id(),
                            error = %e,
                            "recv error"
                        );
                        return Ok(());
                    }
                };

                let packet = match state.registry.decode(&frame) {
                    Ok(packet) => packet,
                    Err(e) => {
                        // A peer speaking garbage is cut off; only its
                        // own connection is affected.
                        tracing::warn!(
                            conn = %session.conn_id(),
                            error = %e,
                            "malformed frame, closing connection"
                        );
                        return Ok(());
                    }
                };

                if !session.accepts(packet.kind()) {
                    tracing::debug!(
                        conn = %session.conn_id(),
                        kind = %packet.kind(),
                        state = %session.state(),
                        "dropping packet not accepted in this state"
                    );
                    continue;
                }

                match packet {
                    Packet::AuthRequest { username } => {
                        handle_auth_request(
                            conn, state, session, tx, &username,
                        )
                        .await?;
                    }
                    Packet::Chat { text } => {
                        let line = state
                            .roster
                            .lock()
                            .await
                            .relay_chat(session.conn_id(), &text);
                        if line.is_none() {
                            tracing::debug!(
                                conn = %session.conn_id(),
                                "chat dropped"
                            );
                        }
                    }
                    // accepts() filters AuthResponse out in every state.
                    Packet::AuthResponse { .. } => {}
                }
            }

            // A connection that never authenticates is cut loose.
            _ = tokio::time::sleep_until(handshake_deadline),
                if !session.is_authenticated() =>
            {
                tracing::info!(
                    conn = %session.conn_id(),
                    "handshake timed out"
                );
                return Err(SessionError::HandshakeTimeout(
                    state.config.handshake_timeout_secs,
                )
                .into());
            }
        }
    }
}

/// Tries to claim a nickname for this connection and answers the peer.
///
/// Claim and peer registration happen under one roster lock, so two
/// connections racing the same name get exactly one winner. A rejected
/// peer stays `PreAuth` and may retry on the same connection.
async fn handle_auth_request(
    conn: &TcpConnection,
    state: &Arc<ServerState>,
    session: &mut Session,
    tx: &mpsc::UnboundedSender<Packet>,
    username: &str,
) -> Result<(), ChatError> {
    let joined = state
        .roster
        .lock()
        .await
        .join(session.conn_id(), username, tx.clone());

    match joined {
        Ok(()) => {
            session.authenticate()?;
            send_packet(conn, state, Packet::AuthResponse {
                success: true,
                message: username.to_string(),
            })
            .await?;
            state.roster.lock().await.broadcast(&format!(
                "Server: Please welcome {username} to the server!"
            ));
            Ok(())
        }
        Err(SessionError::NicknameUnavailable(nick)) => {
            tracing::debug!(
                conn = %session.conn_id(),
                nick,
                "nickname unavailable"
            );
            send_packet(conn, state, Packet::AuthResponse {
                success: false,
                message: format!("{NICK_IN_USE_PREFIX}{nick}"),
            })
            .await
        }
        Err(e) => Err(e.into()),
    }
}

/// Encodes and sends one packet on this connection.
async fn send_packet(
    conn: &TcpConnection,
    state: &Arc<ServerState>,
    packet: Packet,
) -> Result<(), ChatError> {
    let bytes = state.registry.encode(&packet)?;
    conn.send(&bytes).await.map_err(ChatError::Transport)
}
