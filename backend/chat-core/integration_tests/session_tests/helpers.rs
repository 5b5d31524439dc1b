//! Test helpers for session integration tests.
//!
//! This module provides a stand-in chat server and an event collector:
//! - Binding a local websocket listener and accepting one client
//! - Sending server frames and reading client frames as JSON
//! - Collecting published client events and waiting for a topic

use chat_core::{ChatClient, ClientConfig, ClientEvent, Topic};

use models::{Event, EventKind, VOID_ID};

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};
use uuid::Uuid;

pub type ServerSocket = WebSocketStream<TcpStream>;

/// How long any single wait in these tests may take.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Test helper: Bind a listener on an ephemeral port.
pub async fn bind_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let port = listener.local_addr().expect("No local addr").port();
    (listener, format!("ws://127.0.0.1:{port}/"))
}

/// Test helper: Accept one websocket client.
pub async fn accept_client(listener: TcpListener) -> ServerSocket {
    let (stream, _) = listener.accept().await.expect("Failed to accept");
    accept_async(stream)
        .await
        .expect("Failed websocket handshake")
}

/// Test helper: A client whose every event lands in the returned receiver.
pub fn collecting_client() -> (ChatClient, mpsc::UnboundedReceiver<ClientEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut client = ChatClient::new(ClientConfig::default());
    for topic in Topic::ALL {
        let tx = tx.clone();
        client.subscribe(topic, move |event| {
            tx.send(event.clone()).map_err(|e| e.to_string().into())
        });
    }
    (client, rx)
}

/// Test helper: Wait for the next event on `topic`, skipping others.
pub async fn next_event(
    events: &mut mpsc::UnboundedReceiver<ClientEvent>,
    topic: Topic,
) -> ClientEvent {
    tokio::time::timeout(TEST_TIMEOUT, async {
        loop {
            let event = events.recv().await.expect("Event channel closed");
            if event.topic() == topic {
                return event;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("Timed out waiting for {topic}"))
}

/// Test helper: Send one server frame.
pub async fn send_event(server: &mut ServerSocket, event: Event) {
    let json = serde_json::to_string(&event).expect("Failed to encode event");
    server
        .send(Message::text(json))
        .await
        .expect("Failed to send event");
}

/// Test helper: Read the next client frame as raw JSON.
pub async fn receive_frame(server: &mut ServerSocket) -> serde_json::Value {
    loop {
        let message = tokio::time::timeout(TEST_TIMEOUT, server.next())
            .await
            .expect("Timed out waiting for client frame")
            .expect("Client stream ended")
            .expect("Error receiving client frame");

        match message {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Client sent invalid JSON");
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Expected text frame, got {other:?}"),
        }
    }
}

/// Test helper: Authenticate the client as `name` and join it to a channel.
///
/// Returns (self id, channel id) once the client has published both.
pub async fn log_in_and_join(
    server: &mut ServerSocket,
    events: &mut mpsc::UnboundedReceiver<ClientEvent>,
    name: &str,
    channel_name: &str,
) -> (Uuid, Uuid) {
    let me = Uuid::new_v4();
    let channel = Uuid::new_v4();

    send_event(
        server,
        Event::new(EventKind::AuthOk(me, name.to_string()), VOID_ID, VOID_ID, ""),
    )
    .await;
    next_event(events, Topic::Authenticated).await;

    send_event(
        server,
        Event::new(
            EventKind::Join(name.to_string(), models::NO_ADDRESS),
            me,
            channel,
            channel_name,
        ),
    )
    .await;
    next_event(events, Topic::ChannelJoined).await;

    (me, channel)
}

/// Test helper: Check if the client closed the websocket.
pub async fn is_connection_closed(server: &mut ServerSocket) -> bool {
    match tokio::time::timeout(TEST_TIMEOUT, server.next()).await {
        Err(_) => false,
        Ok(None) => true,
        Ok(Some(Ok(Message::Close(_)))) => true,
        Ok(Some(Ok(_))) => false,
        Ok(Some(Err(_))) => true,
    }
}
