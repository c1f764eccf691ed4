//! Chat server binary.
//!
//! Usage: `chatwire-server [port]` (default 8080). Binds on all
//! interfaces. Log verbosity follows `RUST_LOG`, defaulting to `info`.

use chatwire::{ChatError, ChatServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let port: u16 = match std::env::args().nth(1) {
        Some(arg) => match arg.parse() {
            Ok(port) => port,
            Err(_) => {
                eprintln!("usage: chatwire-server [port]");
                std::process::exit(2);
            }
        },
        None => 8080,
    };

    let server = ChatServer::builder()
        .bind(&format!("0.0.0.0:{port}"))
        .build()
        .await?;

    if let Ok(addr) = server.local_addr() {
        tracing::info!(%addr, "listening");
    }
    server.run().await
}
