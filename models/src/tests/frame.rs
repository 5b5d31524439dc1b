use crate::{ChannelListing, Event, EventKind, NO_ADDRESS, ProblemCode, REQUEST_ID, Request, VOID_ID};

use common::RedactedSecret;

use serde_json::{Value, json};
use uuid::Uuid;

const LOUNGE: &str = "6f1c2a3e-8b4d-4c5e-9f60-718293a4b5c6";
const ALICE: &str = "0a1b2c3d-4e5f-4a6b-8c7d-8e9f0a1b2c3d";

fn lounge() -> Uuid {
    Uuid::parse_str(LOUNGE).unwrap()
}

fn to_value(request: &Request) -> Value {
    serde_json::to_value(request).unwrap()
}

/// **VALUE**: Verifies the envelope every outgoing frame is sent in.
///
/// **WHY THIS MATTERS**: The server deserializes a fixed struct; a renamed
/// field (e.g. `kind` instead of `type`) makes every request unreadable.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The `type` rename is lost
/// - `source` stops being the void id
/// - The constant request id changes
#[test]
fn given_part_request_when_serializing_then_envelope_matches_wire_format() {
    // GIVEN: A part request for a channel
    let request = Request::part(lounge());

    // WHEN: Serializing
    let value = to_value(&request);

    // THEN: Exact wire shape
    assert_eq!(
        value,
        json!({
            "id": REQUEST_ID,
            "type": {"Part": [VOID_ID, LOUNGE, "0.0.0.0"]},
            "target": LOUNGE,
            "source": VOID_ID,
            "message": ""
        })
    );
}

/// **VALUE**: Verifies the agent password reaches the wire but not the logs.
///
/// **WHY THIS MATTERS**: The auth frame is the only place the password may
/// appear in clear. Request frames are debug-logged before sending.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The password serializes through `RedactedSecret`'s refusing impl
/// - `Debug` output of a request leaks the password
#[test]
fn given_agent_auth_when_serializing_and_debugging_then_only_wire_has_password() {
    // GIVEN: An agent auth request
    let request = Request::auth_agent(
        String::from("Op"),
        String::from("operator"),
        RedactedSecret::new("hunter2"),
    );

    // WHEN: Serializing and formatting for logs
    let value = to_value(&request);
    let debug = format!("{request:?}");

    // THEN: Wire carries the clear password, debug output does not
    assert_eq!(value["type"], json!({"AuthAgent": ["Op", "operator", "hunter2"]}));
    assert!(!debug.contains("hunter2"));
}

#[test]
fn given_directory_and_join_requests_when_serializing_then_payloads_match() {
    let channels = to_value(&Request::channels());
    let join = to_value(&Request::join_by_name("lounge"));
    let guest = to_value(&Request::auth_guest(None));

    assert_eq!(channels["type"], json!("Channels"));
    assert_eq!(join["type"], json!({"Join": ["lounge", "0.0.0.0"]}));
    assert_eq!(join["target"], json!(VOID_ID));
    assert_eq!(guest["type"], json!({"AuthGuest": null}));
}

/// **VALUE**: Verifies a server join frame decodes with its hidden address.
#[test]
fn given_join_frame_when_decoding_then_name_and_sentinel_address_are_read() {
    // GIVEN: A join frame as the server sends it to non-agents
    let raw = json!({
        "id": 8812734,
        "type": {"Join": ["alice", "0.0.0.0"]},
        "source": ALICE,
        "target": LOUNGE,
        "message": ""
    });

    // WHEN: Decoding
    let event: Event = serde_json::from_value(raw).unwrap();

    // THEN: Typed payload
    assert_eq!(event.kind, EventKind::Join(String::from("alice"), NO_ADDRESS));
    assert_eq!(event.target, lounge());
    assert_eq!(event.kind.tag(), "Join");
}

/// **VALUE**: Verifies the nullable payloads the server emits.
///
/// **WHY THIS MATTERS**: `UserList` and `ChannelModes` are `null` for an
/// empty channel. Treating that as a decode error would drop the frame and
/// surface a spurious error notice.
#[test]
fn given_null_payloads_when_decoding_then_none_is_produced() {
    // GIVEN: Null roster and null modes
    let roster = json!({"id": 1, "type": {"UserList": null}, "source": VOID_ID, "target": LOUNGE, "message": ""});
    let modes = json!({"id": 1, "type": {"ChannelModes": null}, "source": VOID_ID, "target": LOUNGE, "message": ""});

    // WHEN: Decoding
    let roster: Event = serde_json::from_value(roster).unwrap();
    let modes: Event = serde_json::from_value(modes).unwrap();

    // THEN: None payloads
    assert_eq!(roster.kind, EventKind::UserList(None));
    assert_eq!(modes.kind, EventKind::ChannelModes(None));
}

/// **VALUE**: Verifies positional channel directory rows decode into listings.
#[test]
fn given_channel_list_frame_when_decoding_then_rows_become_listings() {
    // GIVEN: One directory row
    let raw = json!({
        "id": 3,
        "type": {"ChannelList": [[LOUNGE, "lounge", "general chat", 4, 9]]},
        "source": VOID_ID,
        "target": VOID_ID,
        "message": ""
    });

    // WHEN: Decoding
    let event: Event = serde_json::from_value(raw).unwrap();

    // THEN: Named fields
    assert_eq!(
        event.kind,
        EventKind::ChannelList(vec![ChannelListing {
            id: lounge(),
            name: String::from("lounge"),
            topic: String::from("general chat"),
            member_count: 4,
            mode_bits: 9,
        }])
    );
}

#[test]
fn given_problem_frame_when_decoding_then_code_and_text_are_read() {
    let raw = json!({
        "id": 5,
        "type": {"Problem": "NameInUse"},
        "source": VOID_ID,
        "target": VOID_ID,
        "message": "that name is taken"
    });

    let event: Event = serde_json::from_value(raw).unwrap();

    assert_eq!(event.kind, EventKind::Problem(ProblemCode::NameInUse));
    assert_eq!(event.message, "that name is taken");
    assert_eq!(ProblemCode::NameInUse.to_string(), "Name In Use");
}

/// **VALUE**: Verifies that tags the client does not handle fail to decode.
///
/// **BUG THIS CATCHES**: Would catch if an unknown tag is silently mapped
/// onto a handled variant.
#[test]
fn given_unknown_tag_when_decoding_then_returns_error() {
    let raw = json!({"id": 1, "type": {"Walladmin": "hi"}, "source": VOID_ID, "target": VOID_ID, "message": ""});

    let result = serde_json::from_value::<Event>(raw);

    assert!(result.is_err());
}
