//! The chat relay roster: authenticated peers and the fan-out broadcast.
//!
//! [`Roster`] is the one piece of mutable state shared by every
//! connection handler. It pairs the nickname directory with each
//! authenticated peer's outbound channel, so that claiming a name and
//! becoming reachable by broadcast happen under the same lock — two
//! handlers racing `join` for the same nickname get exactly one winner.
//!
//! Broadcast is best-effort per peer: a peer whose channel is gone is
//! pruned and the message still reaches everyone else. Senders receive
//! their own relayed messages back; the original system broadcast to
//! all rather than to-others, and that behavior is kept.

use std::collections::HashMap;

use chatwire_protocol::Packet;
use chatwire_session::{NicknameDirectory, SessionError};
use chatwire_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel end used to hand a packet to one peer's writer task.
pub type PeerSender = mpsc::UnboundedSender<Packet>;

/// Authenticated peers and their nicknames, behind one lock at the server.
#[derive(Debug, Default)]
pub struct Roster {
    directory: NicknameDirectory,
    peers: HashMap<ConnectionId, PeerSender>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `nick` for `conn` and registers its outbound
    /// channel. On failure nothing changes and the caller should send a
    /// rejection; the connection may retry.
    pub fn join(
        &mut self,
        conn: ConnectionId,
        nick: &str,
        sender: PeerSender,
    ) -> Result<(), SessionError> {
        if !self.directory.try_claim(conn, nick) {
            return Err(SessionError::NicknameUnavailable(nick.to_string()));
        }
        self.peers.insert(conn, sender);
        Ok(())
    }

    /// Removes `conn` from the roster, returning its nickname if it had
    /// authenticated. Safe to call for connections that never joined.
    pub fn leave(&mut self, conn: ConnectionId) -> Option<String> {
        self.peers.remove(&conn);
        self.directory.release(conn)
    }

    /// Returns the nickname held by `conn`, if any.
    pub fn nickname(&self, conn: ConnectionId) -> Option<&str> {
        self.directory.nickname(conn)
    }

    /// Number of authenticated peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Returns `true` when nobody is authenticated.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Sends a chat line to every authenticated peer, the sender
    /// included. Peers whose channel has closed are pruned; one dead
    /// peer never blocks delivery to the rest. Returns how many peers
    /// the message was handed to.
    pub fn broadcast(&mut self, text: &str) -> usize {
        let packet = Packet::Chat { text: text.to_string() };
        let directory = &mut self.directory;
        let mut delivered = 0;
        self.peers.retain(|conn, sender| {
            if sender.send(packet.clone()).is_ok() {
                delivered += 1;
                true
            } else {
                tracing::warn!(%conn, "dropping peer with closed channel");
                directory.release(*conn);
                false
            }
        });
        tracing::debug!(delivered, text, "broadcast");
        delivered
    }

    /// Relays one inbound chat line from an authenticated sender,
    /// prefixed with the sender's nickname.
    ///
    /// Returns the broadcast line, or `None` when the message is
    /// dropped: empty text (silently ignored per protocol) or a sender
    /// with no nickname.
    pub fn relay_chat(
        &mut self,
        from: ConnectionId,
        text: &str,
    ) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        let nick = self.directory.nickname(from)?;
        let line = format!("{nick}: {text}");
        self.broadcast(&line);
        Some(line)
    }
}

// =========================================================================
// Tests
// =========================================================================
