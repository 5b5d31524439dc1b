use crate::session_tests::helpers::{
    ServerSocket, accept_client, bind_server, collecting_client, log_in_and_join, next_event,
    receive_frame, send_event,
};

use chat_core::error::CoreError;
use chat_core::event_bus::ErrorKind;
use chat_core::{ClientEvent, SessionHandle, Topic};

use models::{ChannelOptions, Credentials, Event, EventKind, NO_ADDRESS, VOID_ID};

use futures_util::SinkExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// Connected as a guest, auth frame already consumed by the server.
async fn connected() -> (SessionHandle, ServerSocket, mpsc::UnboundedReceiver<ClientEvent>) {
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(accept_client(listener));
    let (client, events) = collecting_client();
    let handle = client
        .connect(&url, &Credentials::guest(None))
        .await
        .expect("Failed to connect");
    let mut server = server.await.expect("Accept task failed");
    receive_frame(&mut server).await;
    (handle, server, events)
}

/// **VALUE**: Verifies the client answers keepalives on its own.
///
/// **WHY THIS MATTERS**: The server disconnects clients that miss pongs.
/// The application never sees pings, so the engine must answer them.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The pong nonce differs from the ping
/// - The reply is dropped instead of written to the socket
#[tokio::test]
async fn given_server_ping_when_received_then_client_replies_with_pong() {
    // GIVEN: Connected
    let (_handle, mut server, _events) = connected().await;

    // WHEN: Server pings
    send_event(
        &mut server,
        Event::new(EventKind::Ping(777), VOID_ID, VOID_ID, ""),
    )
    .await;

    // THEN: Pong with the same nonce
    let reply = receive_frame(&mut server).await;
    assert_eq!(reply["type"]["Pong"], 777);
    assert_eq!(reply["target"], VOID_ID.to_string());
}

/// **VALUE**: Verifies one bad frame doesn't end the session.
///
/// **BUG THIS CATCHES**: Would catch if a decode failure closes the socket
/// or stops the read loop.
#[tokio::test]
async fn given_garbage_frame_when_received_then_error_event_and_session_continues() {
    // GIVEN: Connected
    let (handle, mut server, mut events) = connected().await;

    // WHEN: Server sends garbage, then a ping
    server.send(Message::text("{\"type\":")).await.unwrap();
    send_event(&mut server, Event::new(EventKind::Ping(1), VOID_ID, VOID_ID, "")).await;

    // THEN: A decode error event, and the ping still gets its pong
    match next_event(&mut events, Topic::Error).await {
        ClientEvent::Error { kind, .. } => assert_eq!(kind, ErrorKind::Decode),
        other => panic!("expected error event, got {other:?}"),
    }
    assert_eq!(receive_frame(&mut server).await["type"]["Pong"], 1);
    assert!(handle.is_open());
}

#[tokio::test]
async fn given_member_message_when_received_then_message_event_published() {
    // GIVEN: Joined to lounge with bob present
    let (_handle, mut server, mut events) = connected().await;
    let (_, lounge) = log_in_and_join(&mut server, &mut events, "me", "lounge").await;
    let bob = Uuid::new_v4();
    send_event(
        &mut server,
        Event::new(EventKind::Join(String::from("bob"), NO_ADDRESS), bob, lounge, ""),
    )
    .await;
    next_event(&mut events, Topic::MemberJoined).await;

    // WHEN: Bob speaks
    send_event(
        &mut server,
        Event::new(EventKind::Message(String::from("hi all")), bob, lounge, "bob"),
    )
    .await;

    // THEN: Message event with bob as sender
    match next_event(&mut events, Topic::MessageReceived).await {
        ClientEvent::MessageReceived {
            channel,
            sender,
            text,
        } => {
            assert_eq!(channel, lounge);
            assert_eq!(sender.id, bob);
            assert_eq!(sender.name, "bob");
            assert_eq!(text, "hi all");
        }
        other => panic!("expected message, got {other:?}"),
    }
}

/// **VALUE**: Verifies typed commands reach the server as frames.
#[tokio::test]
async fn given_join_command_when_sent_then_server_receives_join() {
    // GIVEN: Connected
    let (handle, mut server, _events) = connected().await;

    // WHEN: Typing /join lounge
    handle.command(VOID_ID, "/join lounge").await.unwrap();

    // THEN: Join by name
    let frame = receive_frame(&mut server).await;
    assert_eq!(frame["type"]["Join"][0], "lounge");
    assert_eq!(frame["type"]["Join"][1], "0.0.0.0");
}

#[tokio::test]
async fn given_invalid_command_when_sent_then_command_error_and_nothing_sent() {
    let (handle, mut server, _events) = connected().await;

    let result = handle.command(VOID_ID, "/join x").await;
    assert!(matches!(result, Err(CoreError::Command(_))));

    // The next frame the server sees is the one sent after the bad command.
    handle.say(VOID_ID, "marker").await.unwrap();
    assert_eq!(receive_frame(&mut server).await["type"]["Message"], "marker");
}

/// **VALUE**: Verifies outgoing typing is throttled end to end.
///
/// **BUG THIS CATCHES**: Would catch if the throttle lives on a copy of the
/// session and never sees the first ping.
#[tokio::test]
async fn given_joined_channel_when_typing_twice_then_one_ping_sent() {
    // GIVEN: Joined
    let (handle, mut server, mut events) = connected().await;
    let (_, lounge) = log_in_and_join(&mut server, &mut events, "me", "lounge").await;

    // WHEN: Typing twice in quick succession
    let first = handle.typing(lounge).await.unwrap();
    let second = handle.typing(lounge).await.unwrap();

    // THEN: Only the first went out
    assert!(first);
    assert!(!second);
    let frame = receive_frame(&mut server).await;
    assert_eq!(frame["type"]["Typing"][1], lounge.to_string());
}

/// **VALUE**: Verifies channel settings send only what changed.
///
/// **BUG THIS CATCHES**: Would catch if an unchanged topic is resent
/// alongside a mode change.
#[tokio::test]
async fn given_unchanged_topic_when_updating_settings_then_only_modes_sent() {
    // GIVEN: Joined, topic already "news"
    let (handle, mut server, mut events) = connected().await;
    let (_, lounge) = log_in_and_join(&mut server, &mut events, "me", "lounge").await;
    send_event(
        &mut server,
        Event::new(EventKind::Topic(String::from("news")), VOID_ID, lounge, ""),
    )
    .await;
    next_event(&mut events, Topic::TopicChanged).await;

    // WHEN: Same topic, new options
    let sent = handle
        .update_channel_settings(lounge, "news", ChannelOptions::PERSIST)
        .await
        .unwrap();

    // THEN: One SetChannelModes frame
    assert_eq!(sent, 1);
    let frame = receive_frame(&mut server).await;
    assert_eq!(frame["type"]["SetChannelModes"], 16);
    assert_eq!(frame["target"], lounge.to_string());
}

/// **VALUE**: Verifies leave sends a Part for that channel.
///
/// **BUG THIS CATCHES**: Would catch if the payload names us instead of
/// the void id, or the channel is only in the payload and not in `target`.
#[tokio::test]
async fn given_joined_channel_when_leaving_then_server_receives_part() {
    // GIVEN: Joined
    let (handle, mut server, mut events) = connected().await;
    let (_, lounge) = log_in_and_join(&mut server, &mut events, "me", "lounge").await;

    // WHEN: Leaving
    handle.leave(lounge).await.unwrap();

    // THEN: Part [void, channel, 0.0.0.0] targeting the channel
    let frame = receive_frame(&mut server).await;
    assert_eq!(
        frame["type"]["Part"],
        serde_json::json!([VOID_ID, lounge, "0.0.0.0"])
    );
    assert_eq!(frame["target"], lounge.to_string());
}

/// **VALUE**: Verifies kick sends channel, user and reason in that order.
///
/// **BUG THIS CATCHES**: Would catch swapped channel/user positions, which
/// the server reads as a kick from a channel that doesn't exist.
#[tokio::test]
async fn given_member_when_kicking_then_server_receives_kick() {
    // GIVEN: Joined
    let (handle, mut server, mut events) = connected().await;
    let (_, lounge) = log_in_and_join(&mut server, &mut events, "me", "lounge").await;
    let bob = Uuid::new_v4();

    // WHEN: Kicking bob
    handle.kick(lounge, bob, "flooding").await.unwrap();

    // THEN: Kick [channel, user, reason] targeting the channel
    let frame = receive_frame(&mut server).await;
    assert_eq!(
        frame["type"]["Kick"],
        serde_json::json!([lounge, bob, "flooding"])
    );
    assert_eq!(frame["target"], lounge.to_string());
}

#[tokio::test]
async fn given_user_when_killing_then_server_receives_kill_with_void_target() {
    // GIVEN: Connected
    let (handle, mut server, _events) = connected().await;
    let bob = Uuid::new_v4();

    // WHEN: Killing bob
    handle.kill(bob, "spam bot").await.unwrap();

    // THEN: Kill [user, reason], void target and source
    let frame = receive_frame(&mut server).await;
    assert_eq!(frame["type"]["Kill"], serde_json::json!([bob, "spam bot"]));
    assert_eq!(frame["target"], VOID_ID.to_string());
    assert_eq!(frame["source"], VOID_ID.to_string());
}
