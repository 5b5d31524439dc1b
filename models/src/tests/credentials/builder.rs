use crate::{Credentials, CredentialsBuilder, ModelError, RequestKind};

use common::RedactedSecret;

/// **VALUE**: Verifies that agent login without a username is rejected.
///
/// **WHY THIS MATTERS**: The server checks agent logins against its account
/// store by username. Sending an `AuthAgent` frame with an empty username
/// always fails, and the user only learns that after a round trip.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Username validation is removed from `build()`
/// - Blank strings stop being treated as absent
#[test]
fn given_agent_without_username_when_building_then_returns_validation_error() {
    // GIVEN: Agent builder with a whitespace-only username
    let builder = CredentialsBuilder::default()
        .with_guest(false)
        .with_username("   ")
        .with_password(RedactedSecret::new("hunter2"));

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "Username is required for agent login");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// **VALUE**: Verifies that agent login requires a non-empty password.
///
/// **WHY THIS MATTERS**: An empty password can never authenticate; rejecting
/// it locally avoids a pointless `InvalidAuth` problem from the server.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The missing-password check is dropped
/// - An empty `RedactedSecret` slips through
#[test]
fn given_agent_with_empty_password_when_building_then_returns_validation_error() {
    // GIVEN: Agent builder with an empty password
    let builder = CredentialsBuilder::default()
        .with_guest(false)
        .with_username("operator")
        .with_password(RedactedSecret::new(""));

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "Password cannot be empty");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// **VALUE**: Verifies that a blank guest nickname becomes "no nickname".
///
/// **WHY THIS MATTERS**: The server assigns a generated name when
/// `AuthGuest` carries null, but rejects an empty string as `NameInvalid`.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Blank nicknames are forwarded as `Some("")`
#[test]
fn given_guest_with_blank_nickname_when_building_then_nickname_is_none() {
    // GIVEN: Guest builder with a blank nickname
    let builder = CredentialsBuilder::default()
        .with_guest(true)
        .with_nickname("");

    // WHEN: Building
    let credentials = builder.build().unwrap();

    // THEN: Nickname is absent and the auth frame carries null
    assert_eq!(credentials, Credentials::Guest { nickname: None });
    assert_eq!(credentials.to_request().kind, RequestKind::AuthGuest(None));
}

/// **VALUE**: Verifies that an agent without a nickname uses the username.
///
/// **WHY THIS MATTERS**: `AuthAgent` requires a nickname string on the wire;
/// a null would make the server drop the frame.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The nickname fallback is removed
/// - The password is not carried into the auth frame
#[test]
fn given_agent_without_nickname_when_building_then_nickname_defaults_to_username() {
    // GIVEN: Agent builder with username and password only
    let builder = CredentialsBuilder::default()
        .with_guest(false)
        .with_username("operator")
        .with_password(RedactedSecret::new("hunter2"));

    // WHEN: Building and producing the auth frame
    let credentials = builder.build().unwrap();
    let request = credentials.to_request();

    // THEN: Nickname falls back to username
    assert!(credentials.is_agent());
    match request.kind {
        RequestKind::AuthAgent(nickname, username, password) => {
            assert_eq!(nickname, "operator");
            assert_eq!(username, "operator");
            assert_eq!(password.expose(), "hunter2");
        }
        other => panic!("expected AuthAgent, got {other:?}"),
    }
}

/// **VALUE**: Verifies that the login mode must be chosen explicitly.
///
/// **BUG THIS CATCHES**: Would catch if `build()` silently defaults to guest
/// and an operator ends up logged in without privileges.
#[test]
fn given_no_login_mode_when_building_then_returns_validation_error() {
    // GIVEN: Builder without mode
    let builder = CredentialsBuilder::default().with_username("operator");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    assert!(matches!(result, Err(ModelError::Validation { .. })));
}
