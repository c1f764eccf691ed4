//! Server-side session state: what a connection is allowed to do.
//!
//! Every accepted connection starts anonymous and must win the nickname
//! handshake before any of its chat traffic is relayed. The state machine
//! is small but strict:
//!
//! ```text
//!   PreAuth ──(AuthRequest, nick available)──→ Authenticated
//!      │ └──(AuthRequest, nick taken)──→ PreAuth   (may retry)
//!      │
//!      └──────────(disconnect)──→ Closed ←──(disconnect)── Authenticated
//! ```
//!
//! While `PreAuth`, packets other than `AuthRequest` are silently ignored
//! rather than treated as errors — the peer may be racing our state.

use std::fmt;

use chatwire_protocol::PacketKind;
use chatwire_transport::ConnectionId;

use crate::SessionError;

/// Lifecycle state of one server-side connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected but anonymous; only `AuthRequest` is acted on.
    PreAuth,

    /// Holds a nickname; chat traffic is relayed.
    Authenticated,

    /// The connection is gone. Terminal.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PreAuth => "pre-auth",
            Self::Authenticated => "authenticated",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// One connection's session on the server.
#[derive(Debug)]
pub struct Session {
    conn_id: ConnectionId,
    state: SessionState,
}

impl Session {
    /// Creates a session for a freshly accepted connection, in `PreAuth`.
    pub fn new(conn_id: ConnectionId) -> Self {
        Self {
            conn_id,
            state: SessionState::PreAuth,
        }
    }

    /// The connection this session belongs to.
    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` once the handshake has been won.
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Whether a packet of the given kind is acted on in the current
    /// state. Packets that are not accepted are dropped silently by the
    /// handler; per protocol they are never an error.
    pub fn accepts(&self, kind: PacketKind) -> bool {
        match self.state {
            SessionState::PreAuth => kind == PacketKind::AuthRequest,
            SessionState::Authenticated => kind == PacketKind::Chat,
            SessionState::Closed => false,
        }
    }

    /// Marks the handshake as won: `PreAuth` → `Authenticated`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] if the session is not
    /// in `PreAuth`; a connection cannot authenticate twice.
    pub fn authenticate(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::PreAuth {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                event: "authenticate",
            });
        }
        self.state = SessionState::Authenticated;
        tracing::debug!(conn = %self.conn_id, "session authenticated");
        Ok(())
    }

    /// Marks the connection as gone. Idempotent; legal from any state.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(ConnectionId::new(1))
    }

    #[test]
    fn test_new_session_starts_pre_auth() {
        let s = session();
        assert_eq!(s.state(), SessionState::PreAuth);
        assert!(!s.is_authenticated());
    }

    #[test]
    fn test_pre_auth_accepts_only_auth_request() {
        let s = session();
        assert!(s.accepts(PacketKind::AuthRequest));
        assert!(!s.accepts(PacketKind::Chat));
        assert!(!s.accepts(PacketKind::AuthResponse));
    }

    #[test]
    fn test_authenticated_accepts_only_chat() {
        let mut s = session();
        s.authenticate().unwrap();
        assert!(s.accepts(PacketKind::Chat));
        assert!(!s.accepts(PacketKind::AuthRequest));
        assert!(!s.accepts(PacketKind::AuthResponse));
    }

    #[test]
    fn test_closed_accepts_nothing() {
        let mut s = session();
        s.close();
        assert!(!s.accepts(PacketKind::Chat));
        assert!(!s.accepts(PacketKind::AuthRequest));
    }

    #[test]
    fn test_authenticate_twice_is_invalid() {
        let mut s = session();
        s.authenticate().unwrap();
        assert!(matches!(
            s.authenticate(),
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_authenticate_after_close_is_invalid() {
        let mut s = session();
        s.close();
        assert!(s.authenticate().is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut s = session();
        s.close();
        s.close();
        assert_eq!(s.state(), SessionState::Closed);
    }
}
