//! Chat client binary.
//!
//! Usage: `chatwire-client`. Prompts for the server's `host:port` on
//! stdin, then for a username, then relays chat until EOF (Ctrl-D).
//! Diagnostics go to `RUST_LOG`-filtered tracing; chat itself is plain
//! stdout.

use chatwire::{ChatClient, ChatError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    ChatClient::new().run().await
}
