//! Client-side session state machine.
//!
//! [`ClientSession`] is pure state — no sockets, no terminal. The CLI
//! client feeds it user input lines and inbound auth verdicts, and it
//! answers with the one action legal in the current state. That split
//! keeps the protocol rules testable without I/O.
//!
//! ```text
//! PreConnection ──(connect ok)──→ ConnectedWithoutAuth
//!      ↑ └───────(connect fails; prompt retry)
//!      │
//! ConnectedWithoutAuth ──(username entered)──→ AwaitingAuthResponse
//!      ↑                                          │
//!      └──(AuthResponse success=false)────────────┤
//!                                                 ▼
//!                          ConnectedWithAuth ←─(success=true)
//!
//! any ──(connection closed)──→ PostConnection (terminal)
//! ```
//!
//! While `AwaitingAuthResponse`, user input is held back — neither sent
//! nor cleared — so no chat traffic or second auth request can leak out
//! mid-handshake.

/// Reason prefix the server attaches to a rejected nickname claim.
pub const NICK_IN_USE_PREFIX: &str = "NickInUse:";

/// Lifecycle state of the client's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Not connected; input is interpreted as a `host:port` address.
    PreConnection,
    /// Connected; input is interpreted as a username.
    ConnectedWithoutAuth,
    /// Auth request in flight; input is held back.
    AwaitingAuthResponse,
    /// Handshake won; input is chat text.
    ConnectedWithAuth,
    /// Connection lost or closed. Terminal; input is rejected.
    PostConnection,
}

/// What the client should do with one line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Attempt a TCP connection to this address.
    Connect { host: String, port: u16 },

    /// The line was not a valid `host:port`; prompt again.
    InvalidAddress,

    /// Send an `AuthRequest` carrying this username.
    SendAuthRequest { username: String },

    /// Mid-handshake: do not send, do not clear the input line.
    HeldBack,

    /// Send a `Chat` packet carrying this text.
    SendChat { text: String },

    /// Offline: surface an error that carries the unsent line.
    RejectedOffline { line: String },
}

/// Verdict delivered by an inbound `AuthResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthVerdict {
    /// Nickname granted; the session is now fully connected.
    Accepted { nickname: String },

    /// Nickname refused. `taken_nick` is parsed from a
    /// `NickInUse:<nick>` reason when the server supplied one.
    Rejected { taken_nick: Option<String> },
}

/// The client half of the authentication state machine.
#[derive(Debug)]
pub struct ClientSession {
    state: ClientState,
}

impl ClientSession {
    /// Creates a session in `PreConnection`.
    pub fn new() -> Self {
        Self {
            state: ClientState::PreConnection,
        }
    }

    /// Current state.
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Maps one line of user input to the action legal right now.
    ///
    /// Does not transition on its own except where the transition is
    /// purely input-driven (`SendAuthRequest`); connection attempts
    /// transition via [`connect_succeeded`](Self::connect_succeeded) /
    /// [`connect_failed`](Self::connect_failed) once the I/O result is
    /// known.
    pub fn submit(&mut self, line: &str) -> InputAction {
        match self.state {
            ClientState::PreConnection => match parse_address(line) {
                Some((host, port)) => InputAction::Connect { host, port },
                None => InputAction::InvalidAddress,
            },
            ClientState::ConnectedWithoutAuth => {
                self.state = ClientState::AwaitingAuthResponse;
                InputAction::SendAuthRequest {
                    username: line.to_string(),
                }
            }
            ClientState::AwaitingAuthResponse => InputAction::HeldBack,
            ClientState::ConnectedWithAuth => InputAction::SendChat {
                text: line.to_string(),
            },
            ClientState::PostConnection => InputAction::RejectedOffline {
                line: line.to_string(),
            },
        }
    }

    /// Records a successful connect: `PreConnection` → `ConnectedWithoutAuth`.
    pub fn connect_succeeded(&mut self) {
        if self.state == ClientState::PreConnection {
            self.state = ClientState::ConnectedWithoutAuth;
        }
    }

    /// Records a failed connect; stays in `PreConnection` for a retry.
    pub fn connect_failed(&mut self) {
        debug_assert_eq!(self.state, ClientState::PreConnection);
    }

    /// Feeds an inbound `AuthResponse` into the machine.
    ///
    /// Returns `None` when no auth request is in flight — a stray
    /// response is ignored, not an error. On rejection the state returns
    /// to `ConnectedWithoutAuth` so the user can retry with a different
    /// name, without reconnecting.
    pub fn auth_response(
        &mut self,
        success: bool,
        message: &str,
    ) -> Option<AuthVerdict> {
        if self.state != ClientState::AwaitingAuthResponse {
            return None;
        }
        if success {
            self.state = ClientState::ConnectedWithAuth;
            Some(AuthVerdict::Accepted {
                nickname: message.to_string(),
            })
        } else {
            self.state = ClientState::ConnectedWithoutAuth;
            let taken_nick = message
                .strip_prefix(NICK_IN_USE_PREFIX)
                .map(str::to_string);
            Some(AuthVerdict::Rejected { taken_nick })
        }
    }

    /// Records connection loss: any state → `PostConnection`. Terminal.
    pub fn connection_lost(&mut self) {
        self.state = ClientState::PostConnection;
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `host:port` with a numeric port. Splits on the last colon so
/// only the port is parsed as a number.
fn parse_address(line: &str) -> Option<(String, u16)> {
    let (host, port) = line.rsplit_once(':')?;
    if host.is_empty() {
        return None;
    }
    let port: u16 = port.parse().ok()?;
    Some((host.to_string(), port))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_session() -> ClientSession {
        let mut s = ClientSession::new();
        s.connect_succeeded();
        s
    }

    fn awaiting_session() -> ClientSession {
        let mut s = connected_session();
        s.submit("sam");
        s
    }

    // =====================================================================
    // Connecting
    // =====================================================================

    #[test]
    fn test_pre_connection_valid_address_yields_connect() {
        let mut s = ClientSession::new();
        let action = s.submit("192.168.1.1:5000");
        assert_eq!(
            action,
            InputAction::Connect { host: "192.168.1.1".into(), port: 5000 }
        );
        // No transition until the connect attempt resolves.
        assert_eq!(s.state(), ClientState::PreConnection);
    }

    #[test]
    fn test_pre_connection_invalid_address_prompts_retry() {
        let mut s = ClientSession::new();
        for bad in ["nonsense", "host:notaport", ":5000", "host:99999"] {
            assert_eq!(s.submit(bad), InputAction::InvalidAddress, "input {bad:?}");
            assert_eq!(s.state(), ClientState::PreConnection);
        }
    }

    #[test]
    fn test_connect_failure_allows_retry() {
        let mut s = ClientSession::new();
        s.submit("example.com:5000");
        s.connect_failed();
        assert_eq!(s.state(), ClientState::PreConnection);
        assert!(matches!(
            s.submit("example.com:5001"),
            InputAction::Connect { .. }
        ));
    }

    #[test]
    fn test_connect_success_moves_to_unauthenticated() {
        let s = connected_session();
        assert_eq!(s.state(), ClientState::ConnectedWithoutAuth);
    }

    // =====================================================================
    // Handshake
    // =====================================================================

    #[test]
    fn test_username_input_sends_auth_request_and_awaits() {
        let mut s = connected_session();
        let action = s.submit("sam");
        assert_eq!(
            action,
            InputAction::SendAuthRequest { username: "sam".into() }
        );
        assert_eq!(s.state(), ClientState::AwaitingAuthResponse);
    }

    #[test]
    fn test_input_held_back_while_awaiting_response() {
        // No chat traffic and no second auth request mid-handshake.
        let mut s = awaiting_session();
        assert_eq!(s.submit("hello?"), InputAction::HeldBack);
        assert_eq!(s.submit("sam2"), InputAction::HeldBack);
        assert_eq!(s.state(), ClientState::AwaitingAuthResponse);
    }

    #[test]
    fn test_auth_accepted_moves_to_authenticated() {
        let mut s = awaiting_session();
        let verdict = s.auth_response(true, "sam").unwrap();
        assert_eq!(verdict, AuthVerdict::Accepted { nickname: "sam".into() });
        assert_eq!(s.state(), ClientState::ConnectedWithAuth);
    }

    #[test]
    fn test_auth_rejected_returns_to_retry_state() {
        let mut s = awaiting_session();
        let verdict = s.auth_response(false, "NickInUse:sam").unwrap();
        assert_eq!(
            verdict,
            AuthVerdict::Rejected { taken_nick: Some("sam".into()) }
        );
        // Retry with a different name, same connection.
        assert_eq!(s.state(), ClientState::ConnectedWithoutAuth);
        assert!(matches!(
            s.submit("pat"),
            InputAction::SendAuthRequest { .. }
        ));
    }

    #[test]
    fn test_auth_rejected_without_reason_prefix() {
        let mut s = awaiting_session();
        let verdict = s.auth_response(false, "go away").unwrap();
        assert_eq!(verdict, AuthVerdict::Rejected { taken_nick: None });
    }

    #[test]
    fn test_stray_auth_response_is_ignored() {
        let mut s = connected_session();
        assert_eq!(s.auth_response(true, "sam"), None);
        assert_eq!(s.state(), ClientState::ConnectedWithoutAuth);
    }

    // =====================================================================
    // Chatting and going offline
    // =====================================================================

    #[test]
    fn test_authenticated_input_is_chat() {
        let mut s = awaiting_session();
        s.auth_response(true, "sam");
        assert_eq!(
            s.submit("hi all"),
            InputAction::SendChat { text: "hi all".into() }
        );
    }

    #[test]
    fn test_connection_lost_is_terminal_and_rejects_input() {
        let mut s = awaiting_session();
        s.auth_response(true, "sam");
        s.connection_lost();

        assert_eq!(s.state(), ClientState::PostConnection);
        // The unsent line comes back so the user can see what was lost.
        assert_eq!(
            s.submit("did you get this?"),
            InputAction::RejectedOffline { line: "did you get this?".into() }
        );
    }

    #[test]
    fn test_connection_lost_before_auth_is_terminal() {
        let mut s = awaiting_session();
        s.connection_lost();
        assert_eq!(s.state(), ClientState::PostConnection);
        // A late auth response changes nothing.
        assert_eq!(s.auth_response(true, "sam"), None);
    }
}
