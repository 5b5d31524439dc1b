//! User command text to outgoing requests.
//!
//! `parse` never touches the socket or the session; it either produces a
//! ready-to-send [`Request`] or says why it can't.

pub(crate) mod patterns;

use crate::command::patterns::{get_channel_name_regex, get_dotted_quad_regex, get_uuid_v4_regex};
use crate::error::command::CommandError;

use common::ErrorLocation;
use models::Request;

use std::panic::Location;

use log::debug;
use uuid::Uuid;

const DEFAULT_KLINE_EXPIRY_SECS: u64 = 3600;
const DEFAULT_KLINE_REASON: &str = "none given";

/// Translate one command into a request.
///
/// `command` is matched case-insensitively. `channel` is the channel the
/// command was typed in.
///
/// # Errors
///
/// - [`CommandError::Validation`] for malformed arguments
/// - [`CommandError::Unsupported`] for commands this client doesn't implement
#[track_caller]
pub fn parse(channel: Uuid, command: &str, args: &[&str]) -> Result<Request, CommandError> {
    debug!("Parsing command {command} ({} args) in {channel}", args.len());

    match command.to_ascii_uppercase().as_str() {
        "JOIN" => parse_join(args),
        "PART" => parse_part(args),
        "CHANNELS" => Ok(Request::channels()),
        "KLINE" => parse_kline(args),
        _ => Err(CommandError::Unsupported {
            command: command.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Split a raw input line like `/join lounge` and [`parse`] it.
///
/// # Errors
///
/// Returns [`CommandError::Validation`] for an empty line, otherwise
/// whatever [`parse`] returns.
#[track_caller]
pub fn parse_line(channel: Uuid, line: &str) -> Result<Request, CommandError> {
    let line = line.trim();
    let line = line.strip_prefix('/').unwrap_or(line);
    let mut tokens = line.split_whitespace();

    let Some(command) = tokens.next() else {
        return Err(validation(
            "Missing Command",
            "Type a command after the slash, e.g. /join lounge",
        ));
    };

    let args: Vec<&str> = tokens.collect();
    parse(channel, command, &args)
}

#[track_caller]
fn parse_join(args: &[&str]) -> Result<Request, CommandError> {
    if args.is_empty() {
        return Err(validation(
            "Missing Channel Argument",
            "The JOIN command requires a channel parameter, either a uuid, or room name.",
        ));
    }

    let target = args.join(" ");

    if get_uuid_v4_regex().is_match(&target) {
        return channel_id(&target).map(Request::join_by_id);
    }

    if get_channel_name_regex().is_match(&target) {
        return Ok(Request::join_by_name(target));
    }

    Err(validation(
        "Invalid Channel Argument",
        "The JOIN command requires a channel parameter, either a uuid, or room name (a-zA-Z0-9 {3,50})",
    ))
}

#[track_caller]
fn parse_part(args: &[&str]) -> Result<Request, CommandError> {
    if args.is_empty() {
        return Err(validation(
            "Missing Channel Argument",
            "The PART command requires a channel uuid parameter.",
        ));
    }

    let target = args.join(" ");

    if get_uuid_v4_regex().is_match(&target) {
        return channel_id(&target).map(Request::part);
    }

    Err(validation(
        "Invalid Channel Argument",
        "The PART command requires a channel uuid parameter",
    ))
}

#[track_caller]
fn parse_kline(args: &[&str]) -> Result<Request, CommandError> {
    let Some(&address) = args.first().filter(|ip| get_dotted_quad_regex().is_match(ip)) else {
        return Err(validation(
            "Invalid KLine Ip",
            "The parameters are <ip> <expiry_in_seconds> <reason>",
        ));
    };

    // Anything that isn't a u64, negatives included, gets the default.
    let expiry = args
        .get(1)
        .and_then(|secs| secs.parse::<u64>().ok())
        .unwrap_or(DEFAULT_KLINE_EXPIRY_SECS);

    let reason = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
    let reason = if reason.trim().is_empty() {
        DEFAULT_KLINE_REASON.to_string()
    } else {
        reason
    };

    Ok(Request::kline(address, expiry, reason))
}

#[track_caller]
fn channel_id(text: &str) -> Result<Uuid, CommandError> {
    Uuid::parse_str(text).map_err(|e| CommandError::Validation {
        title: String::from("Invalid Channel Argument"),
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn validation(title: &str, message: &str) -> CommandError {
    CommandError::Validation {
        title: title.to_string(),
        message: message.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}
