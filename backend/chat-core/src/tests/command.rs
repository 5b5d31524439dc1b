use crate::command::patterns::{get_channel_name_regex, get_dotted_quad_regex, get_uuid_v4_regex};
use crate::command::{parse, parse_line};
use crate::error::command::CommandError;

use models::{NO_ADDRESS, RequestKind, VOID_ID};

use uuid::Uuid;

const SAMPLE_UUID: &str = "550e8400-e29b-41d4-a716-446655440000";

fn here() -> Uuid {
    Uuid::new_v4()
}

fn validation_title(result: Result<models::Request, CommandError>) -> String {
    match result {
        Err(CommandError::Validation { title, .. }) => title,
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// **VALUE**: Verifies that JOIN with a channel id targets that id.
///
/// **WHY THIS MATTERS**: Joining by id is how directory entries and invites
/// work. The server reads the id from `target`; the name payload must be
/// empty or the server tries to create a channel by that name instead.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The UUID branch is checked after the name branch (ids are valid names too)
/// - The id ends up in the payload instead of `target`
#[test]
fn given_uuid_argument_when_parsing_join_then_targets_that_channel() {
    // GIVEN: A JOIN with a v4 uuid
    let args = [SAMPLE_UUID];

    // WHEN: Parsing
    let request = parse(here(), "JOIN", &args).unwrap();

    // THEN: Join targeting the uuid, empty name
    assert_eq!(request.target, Uuid::parse_str(SAMPLE_UUID).unwrap());
    assert_eq!(request.kind, RequestKind::Join(String::new(), NO_ADDRESS));
}

/// **VALUE**: Verifies that JOIN with a name produces a by-name join.
#[test]
fn given_name_argument_when_parsing_join_then_targets_void_with_name() {
    // GIVEN: A plain room name, lower-case command word
    let args = ["lounge"];

    // WHEN: Parsing
    let request = parse(here(), "join", &args).unwrap();

    // THEN: Name payload, void target
    assert_eq!(request.target, VOID_ID);
    assert_eq!(request.kind, RequestKind::Join(String::from("lounge"), NO_ADDRESS));
    assert_eq!(request.source, VOID_ID);
}

/// **VALUE**: Verifies that multi-word names are joined with single spaces.
///
/// **BUG THIS CATCHES**: Would catch if only the first token is used, which
/// would silently join "help" instead of "help desk".
#[test]
fn given_multi_word_name_when_parsing_join_then_tokens_are_joined() {
    let request = parse(here(), "JOIN", &["help", "desk"]).unwrap();

    assert_eq!(
        request.kind,
        RequestKind::Join(String::from("help desk"), NO_ADDRESS)
    );
}

/// **VALUE**: Verifies that a too-short name is rejected locally.
///
/// **WHY THIS MATTERS**: The server answers bad names with `ChannelNameBad`;
/// rejecting here gives the user the reason without a round trip.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The `{3,50}` length bound is dropped
/// - Invalid input falls through to a request
#[test]
fn given_one_char_name_when_parsing_join_then_returns_validation_error() {
    // GIVEN: A one-character argument (neither uuid nor valid name)
    let args = ["x"];

    // WHEN: Parsing
    let result = parse(here(), "JOIN", &args);

    // THEN: Validation error with the dialog title
    assert_eq!(validation_title(result), "Invalid Channel Argument");
}

#[test]
fn given_no_argument_when_parsing_join_then_reports_missing_channel() {
    let result = parse(here(), "JOIN", &[]);

    assert_eq!(validation_title(result), "Missing Channel Argument");
}

/// **VALUE**: Verifies PART needs a channel id.
///
/// **BUG THIS CATCHES**: Would catch if PART accepts a name; the server only
/// understands ids for parts, so a name would be a silent no-op.
#[test]
fn given_part_with_name_when_parsing_then_returns_validation_error() {
    let result = parse(here(), "PART", &["lounge"]);

    assert_eq!(validation_title(result), "Invalid Channel Argument");
}

#[test]
fn given_part_with_uuid_when_parsing_then_parts_that_channel() {
    // GIVEN: PART with an id different from the current channel
    let channel = Uuid::parse_str(SAMPLE_UUID).unwrap();

    // WHEN: Parsing
    let request = parse(here(), "Part", &[SAMPLE_UUID]).unwrap();

    // THEN: Part frame for that channel
    assert_eq!(request.target, channel);
    assert_eq!(
        request.kind,
        RequestKind::Part(VOID_ID, channel, NO_ADDRESS)
    );
}

#[test]
fn given_channels_when_parsing_then_requests_directory() {
    let request = parse(here(), "CHANNELS", &[]).unwrap();

    assert_eq!(request.kind, RequestKind::Channels);
    assert_eq!(request.target, VOID_ID);
}

/// **VALUE**: Verifies KLINE falls back to the default expiry.
///
/// **WHY THIS MATTERS**: A typo in the expiry should still ban for a sane
/// period rather than failing or banning forever.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - A non-numeric expiry is rejected instead of defaulted
/// - The reason tokens are shifted by one
#[test]
fn given_non_numeric_expiry_when_parsing_kline_then_defaults_to_an_hour() {
    // GIVEN: KLINE with a bad expiry
    let args = ["10.0.0.1", "not-a-number", "spam"];

    // WHEN: Parsing
    let request = parse(here(), "KLINE", &args).unwrap();

    // THEN: 3600 seconds, reason kept
    assert_eq!(
        request.kind,
        RequestKind::Kline(String::from("10.0.0.1"), 3600, String::from("spam"))
    );
}

/// **VALUE**: Pins that a negative expiry falls back to the default.
///
/// **WHY THIS MATTERS**: Expiries are unsigned on the wire. `-5` is not a
/// valid expiry, so it gets the same hour-long default as any other typo.
#[test]
fn given_negative_expiry_when_parsing_kline_then_defaults_to_an_hour() {
    let request = parse(here(), "KLINE", &["10.0.0.1", "-5", "spam"]).unwrap();

    assert_eq!(
        request.kind,
        RequestKind::Kline(String::from("10.0.0.1"), 3600, String::from("spam"))
    );
}

#[test]
fn given_kline_without_reason_when_parsing_then_reason_is_none_given() {
    let request = parse(here(), "kline", &["192.168.1.20", "60"]).unwrap();

    assert_eq!(
        request.kind,
        RequestKind::Kline(String::from("192.168.1.20"), 60, String::from("none given"))
    );
}

/// **VALUE**: Verifies KLINE rejects an address that isn't dotted-quad shaped.
#[test]
fn given_bad_ip_when_parsing_kline_then_returns_validation_error() {
    let result = parse(here(), "KLINE", &["bad-ip", "60", "x"]);

    assert_eq!(validation_title(result), "Invalid KLine Ip");
}

#[test]
fn given_kline_without_arguments_when_parsing_then_returns_validation_error() {
    let result = parse(here(), "KLINE", &[]);

    assert_eq!(validation_title(result), "Invalid KLine Ip");
}

/// **VALUE**: Verifies that known-but-unimplemented commands are reported.
///
/// **WHY THIS MATTERS**: Users type WHOIS/KICK expecting something to happen.
/// A silent no-op looks like a hung client.
///
/// **BUG THIS CATCHES**: Would catch if any of these start producing a
/// half-formed request or fall through silently.
#[test]
fn given_unimplemented_commands_when_parsing_then_each_is_unsupported() {
    // GIVEN: Every command the client knows but doesn't implement, plus garbage
    let commands = [
        "WHOIS", "TITLE", "KICK", "KILL", "MODIFY", "STATS", "TYPING", "FROBNICATE",
    ];

    // WHEN/THEN: Each is Unsupported and names the command
    for command in commands {
        match parse(here(), command, &["arg"]) {
            Err(CommandError::Unsupported { command: reported, .. }) => {
                assert_eq!(reported, command);
            }
            other => panic!("{command}: expected Unsupported, got {other:?}"),
        }
    }
}

#[test]
fn given_slash_line_when_parsing_line_then_splits_and_delegates() {
    let request = parse_line(here(), "/join   help desk ").unwrap();

    assert_eq!(
        request.kind,
        RequestKind::Join(String::from("help desk"), NO_ADDRESS)
    );
}

#[test]
fn given_empty_line_when_parsing_line_then_returns_validation_error() {
    assert_eq!(validation_title(parse_line(here(), "/")), "Missing Command");
    assert_eq!(validation_title(parse_line(here(), "   ")), "Missing Command");
}

/// **VALUE**: Pins the three input patterns.
///
/// **BUG THIS CATCHES**: Would catch anchoring mistakes (`^`/`$` dropped)
/// that let `lounge; drop` or `1.2.3.4.5` through.
#[test]
fn given_edge_inputs_when_matching_patterns_then_anchors_hold() {
    // UUID: case-insensitive, version 4 only
    assert!(get_uuid_v4_regex().is_match("550E8400-E29B-41D4-A716-446655440000"));
    assert!(!get_uuid_v4_regex().is_match("550e8400-e29b-11d4-a716-446655440000"));

    // Names: 3-50 of letters, digits, dash, space
    assert!(get_channel_name_regex().is_match("a-b"));
    assert!(!get_channel_name_regex().is_match("lounge;"));
    assert!(!get_channel_name_regex().is_match(&"a".repeat(51)));

    // Dotted quad: shape only, 999 is accepted
    assert!(get_dotted_quad_regex().is_match("999.1.1.1"));
    assert!(!get_dotted_quad_regex().is_match("1.2.3.4.5"));
    assert!(!get_dotted_quad_regex().is_match("1.2.3"));
}
