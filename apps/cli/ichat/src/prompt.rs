//! The stdin prompt loop.
//!
//! Reads lines until the user quits, input ends, or the session closes
//! underneath us, whichever comes first.

use crate::error::IchatError;
use crate::view::{ChatView, Input, perform};

use chat_core::{ChatClient, SessionHandle, Topic};

use common::ErrorLocation;

use std::panic::Location;
use std::sync::{Arc, Mutex};

use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Notify;

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptExit {
    Quit,
    InputClosed,
    SessionClosed,
}

/// Subscribe a signal that fires when the session disconnects.
///
/// A disconnect while nobody is waiting is kept until the next wait.
pub fn session_closed_signal(client: &mut ChatClient) -> Arc<Notify> {
    let closed = Arc::new(Notify::new());
    let signal = Arc::clone(&closed);
    client.subscribe(Topic::Disconnect, move |_| {
        signal.notify_one();
        Ok(())
    });
    closed
}

pub async fn run<R>(
    input: R,
    handle: &SessionHandle,
    view: &Mutex<ChatView>,
    session_closed: &Notify,
) -> Result<PromptExit, IchatError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            _ = session_closed.notified() => {
                info!("Session closed, leaving prompt");
                return Ok(PromptExit::SessionClosed);
            }
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Input closed");
                if let Err(e) = handle.disconnect().await {
                    info!("Session already closed: {e}");
                }
                return Ok(PromptExit::InputClosed);
            }
            Err(e) => {
                return Err(IchatError::Ichat {
                    message: format!("Failed to read input: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let input = match view.lock() {
            Ok(view) => view.interpret(&line),
            Err(e) => {
                return Err(IchatError::Ichat {
                    message: format!("Transcript state poisoned: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let quitting = input == Input::Quit;
        if !perform(handle, input).await {
            return Ok(if quitting {
                PromptExit::Quit
            } else {
                PromptExit::SessionClosed
            });
        }
    }
}
