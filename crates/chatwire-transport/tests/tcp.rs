//! Integration tests for the TCP transport.
//!
//! These spin up a real listener and a real client socket to verify that
//! frames actually cross the network intact, in both directions, and that
//! a clean close surfaces as `Ok(None)`.

use chatwire_transport::{Connection, TcpConnection, TcpTransport, Transport};

/// Binds a transport on an OS-assigned port and returns it with its address.
async fn bind_transport() -> (TcpTransport, String) {
    let transport = TcpTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = transport
        .local_addr()
        .expect("should have local addr")
        .to_string();
    (transport, addr)
}

#[tokio::test]
async fn test_tcp_accept_and_send_receive() {
    let (mut transport, addr) = bind_transport().await;

    let server_handle =
        tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let client = TcpConnection::connect(&addr).await.expect("should connect");
    let server_conn = server_handle.await.expect("task should complete");

    assert!(server_conn.id().into_inner() > 0);
    assert_ne!(server_conn.id(), client.id());

    // --- Server sends, client receives ---
    server_conn
        .send(b"hello from server")
        .await
        .expect("send should succeed");
    let frame = client
        .recv()
        .await
        .expect("recv should succeed")
        .expect("should have data");
    assert_eq!(frame, b"hello from server");

    // --- Client sends, server receives ---
    client
        .send(b"hello from client")
        .await
        .expect("send should succeed");
    let frame = server_conn
        .recv()
        .await
        .expect("recv should succeed")
        .expect("should have data");
    assert_eq!(frame, b"hello from client");

    server_conn.close().await.expect("close should succeed");
}

#[tokio::test]
async fn test_tcp_recv_returns_none_on_peer_close() {
    let (mut transport, addr) = bind_transport().await;

    let server_handle =
        tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let client = TcpConnection::connect(&addr).await.expect("should connect");
    let server_conn = server_handle.await.unwrap();

    client.close().await.expect("close should succeed");

    let result = server_conn.recv().await.expect("recv should not error");
    assert!(result.is_none(), "should return None on peer close");
}

#[tokio::test]
async fn test_tcp_frames_do_not_coalesce() {
    // Two back-to-back sends must come out as two distinct frames even
    // though TCP may deliver them in a single segment.
    let (mut transport, addr) = bind_transport().await;

    let server_handle =
        tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let client = TcpConnection::connect(&addr).await.expect("should connect");
    let server_conn = server_handle.await.unwrap();

    client.send(b"first").await.unwrap();
    client.send(b"second").await.unwrap();

    assert_eq!(server_conn.recv().await.unwrap().unwrap(), b"first");
    assert_eq!(server_conn.recv().await.unwrap().unwrap(), b"second");
}

#[tokio::test]
async fn test_tcp_connect_to_closed_port_fails() {
    // Bind and immediately drop to get a port nothing listens on.
    let (transport, addr) = bind_transport().await;
    drop(transport);

    let result = TcpConnection::connect(&addr).await;
    assert!(result.is_err(), "connect to a dead port should fail");
}

#[tokio::test]
async fn test_tcp_empty_frame_round_trip() {
    let (mut transport, addr) = bind_transport().await;

    let server_handle =
        tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let client = TcpConnection::connect(&addr).await.expect("should connect");
    let server_conn = server_handle.await.unwrap();

    client.send(b"").await.unwrap();
    let frame = server_conn.recv().await.unwrap().unwrap();
    assert!(frame.is_empty());
}
