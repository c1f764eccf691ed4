//! # Chatwire
//!
//! A small multi-user chat service over TCP: a self-describing binary
//! packet format, a nickname handshake, and a relay that broadcasts every
//! chat line to all authenticated peers.
//!
//! The layers live in their own crates and this one ties them together:
//! `chatwire-transport` (framed TCP) → `chatwire-protocol` (packet
//! encoding and the tag registry) → `chatwire-session` (handshake state
//! machines and the nickname directory) → the server and client here.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatwire::ChatServer;
//!
//! # async fn run() -> Result<(), chatwire::ChatError> {
//! let server = ChatServer::builder()
//!     .bind("0.0.0.0:5000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod client;
mod error;
mod handler;
mod relay;
mod server;

pub use client::ChatClient;
pub use error::ChatError;
pub use relay::{PeerSender, Roster};
pub use server::{ChatServer, ChatServerBuilder, ServerConfig};
