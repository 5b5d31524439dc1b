use crate::view::{ChatView, Input};

use chat_core::ClientEvent;
use chat_core::event_bus::ErrorKind;

use models::{Identity, ProblemCode, VOID_ID};

use uuid::Uuid;

fn joined(view: &mut ChatView, name: &str) -> Uuid {
    let channel = Uuid::new_v4();
    view.render(&ClientEvent::ChannelJoined {
        channel,
        name: name.to_string(),
    });
    channel
}

/// **VALUE**: Verifies plain text goes to the most recently joined channel.
///
/// **BUG THIS CATCHES**: Would catch if the current channel isn't updated
/// on join, which sends messages to the wrong room.
#[test]
fn given_two_joins_when_typing_text_then_said_in_latest_channel() {
    // GIVEN: Joined lounge then dev
    let mut view = ChatView::new();
    joined(&mut view, "lounge");
    let dev = joined(&mut view, "dev");

    // WHEN: Typing plain text
    let input = view.interpret("  hello there ");

    // THEN: Said in dev, trimmed
    assert_eq!(input, Input::Say(dev, String::from("hello there")));
}

#[test]
fn given_no_channel_when_typing_text_then_notice_instead_of_send() {
    let view = ChatView::new();

    assert!(matches!(view.interpret("hello"), Input::Notice(_)));
    assert_eq!(view.interpret("   "), Input::Empty);
}

#[test]
fn given_slash_lines_when_interpreting_then_local_and_engine_commands_split() {
    let mut view = ChatView::new();
    let lounge = joined(&mut view, "lounge");

    assert_eq!(view.interpret("/QUIT"), Input::Quit);
    assert_eq!(view.interpret("/leave"), Input::Leave(lounge));
    assert_eq!(
        view.interpret("/join dev"),
        Input::Command(lounge, String::from("/join dev"))
    );
}

#[test]
fn given_no_channel_when_running_command_then_void_channel_is_used() {
    let view = ChatView::new();

    assert_eq!(
        view.interpret("/channels"),
        Input::Command(VOID_ID, String::from("/channels"))
    );
}

/// **VALUE**: Verifies leaving the current channel falls back to another.
#[test]
fn given_current_channel_left_when_rendering_then_current_moves_on() {
    // GIVEN: lounge and dev, dev current
    let mut view = ChatView::new();
    let lounge = joined(&mut view, "lounge");
    let dev = joined(&mut view, "dev");

    // WHEN: Kicked from dev
    let line = view.render(&ClientEvent::KickedFromChannel {
        channel: dev,
        name: String::from("dev"),
        reason: String::from("spam"),
    });

    // THEN: Line names reason; lounge is current
    assert_eq!(line.as_deref(), Some("* Kicked from dev: spam"));
    assert_eq!(view.current(), Some(lounge));
}

#[test]
fn given_message_when_rendering_then_channel_name_and_sender_shown() {
    let mut view = ChatView::new();
    let lounge = joined(&mut view, "lounge");

    let line = view.render(&ClientEvent::MessageReceived {
        channel: lounge,
        sender: Identity::new(Uuid::new_v4(), "bob"),
        text: String::from("hi"),
    });

    assert_eq!(line.as_deref(), Some("[lounge] <bob> hi"));
}

#[test]
fn given_problem_when_rendering_then_title_is_used() {
    let mut view = ChatView::new();

    let line = view.render(&ClientEvent::Error {
        kind: ErrorKind::Problem(ProblemCode::NameInUse),
        text: String::from("taken"),
    });

    let line = line.unwrap();
    assert!(line.starts_with("! "));
    assert!(line.ends_with(": taken"));
}

#[test]
fn given_disconnect_when_rendering_then_current_channel_is_cleared() {
    let mut view = ChatView::new();
    joined(&mut view, "lounge");

    let line = view.render(&ClientEvent::Disconnect { reason: None });

    assert_eq!(line.as_deref(), Some("* Disconnected"));
    assert_eq!(view.current(), None);
}
