use crate::session_tests::helpers::{
    accept_client, bind_server, collecting_client, is_connection_closed, log_in_and_join,
    next_event, receive_frame,
};

use chat_core::error::connection::ConnectionError;
use chat_core::event_bus::ErrorKind;
use chat_core::{ClientEvent, Topic};

use models::Credentials;

use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

/// **VALUE**: Verifies the auth frame is the first thing the server sees.
///
/// **WHY THIS MATTERS**: The server drops connections whose first frame
/// isn't an auth request. Anything queued ahead of it kills the session.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - `connect` is published (and a subscriber sends) before auth goes out
/// - The guest nickname is lost on the way to the wire
#[tokio::test]
async fn given_guest_credentials_when_connecting_then_first_frame_is_auth() {
    // GIVEN: A local server and a guest with a nickname
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(accept_client(listener));
    let (client, mut events) = collecting_client();
    let credentials = Credentials::Guest {
        nickname: Some(String::from("night-owl")),
    };

    // WHEN: Connecting
    let _handle = client.connect(&url, &credentials).await.unwrap();
    let mut server = server.await.unwrap();

    // THEN: First frame is AuthGuest, then the connect event fires
    let first = receive_frame(&mut server).await;
    assert_eq!(first["type"]["AuthGuest"], "night-owl");
    assert_eq!(first["id"], 1);
    assert_eq!(
        next_event(&mut events, Topic::Connect).await,
        ClientEvent::Connect { url }
    );
}

/// **VALUE**: Verifies a refused connection is reported and can be retried.
///
/// **WHY THIS MATTERS**: Recovery is always the caller's call. A failed
/// attempt must hand the client back with its subscriptions so a retry
/// doesn't need the whole view layer rebuilt.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Connection refusal surfaces as a timeout or a panic
/// - Subscribers never hear about the failure
/// - The client (and its subscriptions) is dropped on failure
#[tokio::test]
async fn given_nothing_listening_when_connecting_then_client_returned_for_retry() {
    // GIVEN: A port that was bound and released
    let (listener, url) = bind_server().await;
    drop(listener);
    let (client, mut events) = collecting_client();

    // WHEN: Connecting
    let failure = client
        .connect(&url, &Credentials::guest(None))
        .await
        .unwrap_err();

    // THEN: Connect error and an error event of kind transport
    let (client, error) = failure.into_parts();
    assert!(matches!(error, ConnectionError::Connect { .. }));
    match next_event(&mut events, Topic::Error).await {
        ClientEvent::Error { kind, .. } => assert_eq!(kind, ErrorKind::Transport),
        other => panic!("expected error event, got {other:?}"),
    }

    // WHEN: Retrying the same client against a live server
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(accept_client(listener));
    let _handle = client
        .connect(&url, &Credentials::guest(None))
        .await
        .unwrap();
    let mut server = server.await.unwrap();

    // THEN: The original subscriptions still see events
    assert!(receive_frame(&mut server).await["type"].get("AuthGuest").is_some());
    assert_eq!(
        next_event(&mut events, Topic::Connect).await,
        ClientEvent::Connect { url }
    );
}

/// **VALUE**: Verifies `wss://` urls go through a TLS handshake.
///
/// **WHY THIS MATTERS**: The reference server only accepts TLS. Without a
/// TLS backend compiled in, every `wss://` connect fails before it starts.
///
/// **BUG THIS CATCHES**: Would catch the TLS feature being dropped from
/// the socket library, which reports "TLS support not compiled in".
#[tokio::test]
async fn given_wss_url_when_peer_is_not_tls_then_handshake_is_attempted() {
    // GIVEN: A plain TCP listener that hangs up on whatever it receives
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let _ = listener.accept().await;
    });
    let (client, _events) = collecting_client();

    // WHEN: Connecting over wss
    let failure = client
        .connect(&format!("wss://127.0.0.1:{port}/"), &Credentials::guest(None))
        .await
        .unwrap_err();

    // THEN: A connect error from the handshake, not from missing TLS support
    let message = failure.error.to_string();
    assert!(matches!(failure.error, ConnectionError::Connect { .. }), "got: {message}");
    assert!(!message.contains("not compiled in"), "got: {message}");
}

/// **VALUE**: Verifies a server close ends the session cleanly.
///
/// **WHY THIS MATTERS**: After a close the session model is stale. Views
/// must be told, the store must be empty, and sends must fail loudly
/// instead of vanishing.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The close reason is dropped
/// - Requests after close are silently accepted
/// - The reconnect client inherits the old channels
#[tokio::test]
async fn given_open_session_when_server_closes_then_disconnect_and_sends_fail() {
    // GIVEN: Logged in and joined
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(accept_client(listener));
    let (client, mut events) = collecting_client();
    let handle = client.connect(&url, &Credentials::guest(None)).await.unwrap();
    let mut server = server.await.unwrap();
    receive_frame(&mut server).await;
    let (_, channel) = log_in_and_join(&mut server, &mut events, "me", "lounge").await;

    // WHEN: The server closes with a reason
    server
        .send(Message::Close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "maintenance".into(),
        })))
        .await
        .unwrap();

    // THEN: Disconnect carries the reason
    assert_eq!(
        next_event(&mut events, Topic::Disconnect).await,
        ClientEvent::Disconnect {
            reason: Some(String::from("maintenance")),
        }
    );

    // THEN: Sending fails with NotOpen
    let result = handle.say(channel, "anyone?").await;
    assert!(matches!(result, Err(ConnectionError::NotOpen { .. })));
    assert!(!handle.is_open());

    // THEN: The client handed back is empty but still subscribed
    let client = handle.closed().await;
    assert!(client.store().identity().is_none());
    assert_eq!(client.store().channel_count(), 0);
}

/// **VALUE**: Verifies a client-side disconnect closes the socket.
#[tokio::test]
async fn given_open_session_when_client_disconnects_then_server_sees_close() {
    // GIVEN: Connected
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(accept_client(listener));
    let (client, mut events) = collecting_client();
    let handle = client.connect(&url, &Credentials::guest(None)).await.unwrap();
    let mut server = server.await.unwrap();
    receive_frame(&mut server).await;

    // WHEN: Disconnecting
    handle.disconnect().await.unwrap();

    // THEN: The server sees the close and the client publishes disconnect
    assert!(is_connection_closed(&mut server).await);
    assert_eq!(
        next_event(&mut events, Topic::Disconnect).await,
        ClientEvent::Disconnect {
            reason: Some(String::from("closed by client")),
        }
    );
}
