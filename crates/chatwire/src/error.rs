//! Unified error type for the chatwire crate.

use chatwire_protocol::ProtocolError;
use chatwire_session::SessionError;
use chatwire_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically. Every
/// value of this type is local to one connection's handler (or the
/// client's session); none of them take the process down.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// A transport-level error (bind, connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (malformed packet, unknown tag).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (handshake timeout, state violation).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A local I/O error (terminal input, that sort of thing).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectFailed(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        let chat_err: ChatError = err.into();
        assert!(matches!(chat_err, ChatError::Transport(_)));
        assert!(chat_err.to_string().contains("connect failed"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::UnknownType(99);
        let chat_err: ChatError = err.into();
        assert!(matches!(chat_err, ChatError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::NicknameUnavailable("sam".into());
        let chat_err: ChatError = err.into();
        assert!(matches!(chat_err, ChatError::Session(_)));
    }
}
