use crate::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` records the call site it was handed.
///
/// **WHY THIS MATTERS**: Every error in the chat engine (connection, command parsing,
/// config) embeds an `ErrorLocation`. If the captured file or line drifts, the log line
/// printed for a failed send or a rejected `/join` points nowhere useful.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The file path is dropped or replaced
/// - Line/column are read from the wrong `Location` accessor
#[test]
fn given_caller_location_when_error_location_created_then_matches_source_position() {
    // GIVEN / WHEN: Capturing the location on a known line
    let expected_line = line!() + 1;
    let location = ErrorLocation::from(Location::caller());

    // THEN: File and line point at this test
    assert!(
        location.file.ends_with("error_location.rs"),
        "Should capture this file, got {}",
        location.file
    );
    assert_eq!(location.line, expected_line, "Should capture the calling line");
    assert!(location.column > 0, "Column is 1-based");
}

/// **VALUE**: Verifies the `[file:line:column]` rendering used in every error message.
///
/// **WHY THIS MATTERS**: Error `Display` strings are built as `"{message} {location}"` and
/// end up in the session log. A broken format makes those lines unparseable by eye.
///
/// **BUG THIS CATCHES**: Would catch if the brackets or separators change.
#[test]
fn given_error_location_when_displayed_then_uses_bracketed_triplet() {
    // GIVEN: A fixed location
    let location = ErrorLocation {
        file: "backend/chat-core/src/dispatcher.rs",
        line: 42,
        column: 7,
    };

    // WHEN: Formatting
    let formatted = location.to_string();

    // THEN: Exact bracketed format
    assert_eq!(formatted, "[backend/chat-core/src/dispatcher.rs:42:7]");
}

/// **VALUE**: Verifies that `#[track_caller]` helpers report their caller, not themselves.
///
/// **WHY THIS MATTERS**: The `From` conversions for tungstenite and serde errors rely on
/// `#[track_caller]` so that `?` sites show up in the log instead of the conversion impl.
///
/// **BUG THIS CATCHES**: Would catch if location propagation through helpers stops working.
#[test]
fn given_track_caller_helper_when_called_twice_then_lines_differ() {
    // GIVEN: A helper that captures its caller
    #[track_caller]
    fn capture() -> ErrorLocation {
        ErrorLocation::from(Location::caller())
    }

    // WHEN: Calling from two consecutive lines
    let first = capture();
    let second = capture();

    // THEN: Same file, consecutive lines
    assert_eq!(first.file, second.file);
    assert_eq!(first.line + 1, second.line, "Lines should be sequential");
}
