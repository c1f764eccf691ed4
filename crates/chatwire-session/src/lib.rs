//! Session management for chatwire.
//!
//! This crate owns everything between "a TCP connection exists" and
//! "a named participant is chatting":
//!
//! 1. **Nickname directory** ([`NicknameDirectory`]) — the bijection
//!    between connection identity and chosen name, with global
//!    uniqueness.
//! 2. **Server session state** ([`Session`], [`SessionState`]) — which
//!    packets a connection may send before and after the handshake.
//! 3. **Client session state** ([`ClientSession`]) — the mirror-image
//!    automaton the client drives, including input holdback during the
//!    handshake.
//!
//! # How it fits in the stack
//!
//! ```text
//! Relay (above)    ← asks who is authenticated and under what name
//!     ↕
//! Session (this crate)  ← nickname ownership and handshake state
//!     ↕
//! Protocol (below) ← provides the Packet types the states gate on
//! ```

mod client;
mod directory;
mod error;
mod session;

pub use client::{
    AuthVerdict, ClientSession, ClientState, InputAction, NICK_IN_USE_PREFIX,
};
pub use directory::NicknameDirectory;
pub use error::SessionError;
pub use session::{Session, SessionState};
