//! Error types for the session layer.

use crate::SessionState;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The requested nickname is empty or already bound. Expected and
    /// recoverable: the connection stays open and may retry.
    #[error("nickname {0:?} is unavailable")]
    NicknameUnavailable(String),

    /// The connection sat in pre-auth past the configured deadline.
    /// Unauthenticated connections are not allowed to hold a handler
    /// forever.
    #[error("handshake timed out after {0} seconds")]
    HandshakeTimeout(u64),

    /// A lifecycle event arrived in a state that cannot accept it.
    #[error("cannot {event} a {from} session")]
    InvalidTransition {
        /// State the session was in.
        from: SessionState,
        /// The attempted event.
        event: &'static str,
    },
}
