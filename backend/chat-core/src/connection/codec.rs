//! JSON frames over websocket messages.

use crate::error::connection::ConnectionError;

use common::ErrorLocation;
use models::{Event, Request};

use std::panic::Location;

use log::trace;
use tokio_tungstenite::tungstenite::Message;

/// What an inbound socket message turned out to be.
#[derive(Debug)]
pub(crate) enum Inbound {
    Frame(Box<Event>),
    /// Ping/pong and raw frames; the socket library answers pings itself.
    Control,
    Closed(Option<String>),
}

#[track_caller]
pub(crate) fn encode(request: &Request) -> Result<Message, ConnectionError> {
    let json = serde_json::to_string(request).map_err(|e| ConnectionError::Encode {
        message: format!("Failed to encode {:?} frame: {e}", request.kind),
        location: ErrorLocation::from(Location::caller()),
    })?;
    Ok(Message::text(json))
}

/// Decode one socket message.
///
/// Binary messages are read as UTF-8 JSON the same way text messages are.
#[track_caller]
pub(crate) fn decode(message: Message) -> Result<Inbound, ConnectionError> {
    let parsed = match message {
        Message::Text(text) => serde_json::from_str::<Event>(text.as_str()),
        Message::Binary(bytes) => serde_json::from_slice::<Event>(&bytes),
        Message::Close(frame) => {
            return Ok(Inbound::Closed(
                frame.map(|f| f.reason.as_str().to_string()).filter(|r| !r.is_empty()),
            ));
        }
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {
            trace!("Control message");
            return Ok(Inbound::Control);
        }
    };

    parsed
        .map(|event| Inbound::Frame(Box::new(event)))
        .map_err(|e| ConnectionError::Decode {
            message: format!("Failed to decode frame: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
