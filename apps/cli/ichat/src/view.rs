//! Terminal transcript.
//!
//! [`ChatView`] turns engine events into transcript lines and remembers
//! which channel plain text goes to: the most recently joined one.

use chat_core::event_bus::ErrorKind;
use chat_core::{ClientEvent, SessionHandle};

use models::VOID_ID;

use std::collections::HashMap;

use log::warn;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ChatView {
    current: Option<Uuid>,
    names: HashMap<Uuid, String>,
}

/// What a line typed at the prompt should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Quit,
    Leave(Uuid),
    Command(Uuid, String),
    Say(Uuid, String),
    /// Nothing to send; show this instead.
    Notice(String),
    Empty,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel plain text is sent to.
    pub fn current(&self) -> Option<Uuid> {
        self.current
    }

    fn label(&self, channel: &Uuid) -> String {
        self.names
            .get(channel)
            .cloned()
            .unwrap_or_else(|| channel.to_string())
    }

    /// Apply `event` and render it.
    ///
    /// Returns `None` for events that don't belong in the transcript.
    pub fn render(&mut self, event: &ClientEvent) -> Option<String> {
        let line = match event {
            ClientEvent::Connect { url } => format!("* Connected to {url}"),
            ClientEvent::Authenticated { identity } => {
                format!("* Logged in as {} ({})", identity.name, identity.id)
            }
            ClientEvent::ChannelJoined { channel, name } => {
                self.names.insert(*channel, name.clone());
                self.current = Some(*channel);
                format!("* Now talking in {name} ({channel})")
            }
            ClientEvent::MemberJoined { channel, member, ip } => match ip {
                Some(ip) => format!("[{}] * {} ({ip}) joined", self.label(channel), member.name),
                None => format!("[{}] * {} joined", self.label(channel), member.name),
            },
            ClientEvent::ChannelLeft { channel, name } => {
                self.forget(channel);
                format!("* Left {name}")
            }
            ClientEvent::MemberLeft { channel, member } => {
                format!("[{}] * {} left", self.label(channel), member.name)
            }
            ClientEvent::KickedFromChannel {
                channel,
                name,
                reason,
            } => {
                self.forget(channel);
                format!("* Kicked from {name}: {reason}")
            }
            ClientEvent::MemberKicked {
                channel,
                member,
                reason,
            } => format!(
                "[{}] * {} was kicked: {reason}",
                self.label(channel),
                member.name
            ),
            ClientEvent::MemberDisconnected {
                channel,
                member,
                reason,
            } => format!(
                "[{}] * {} disconnected: {reason}",
                self.label(channel),
                member.name
            ),
            ClientEvent::MessageReceived {
                channel,
                sender,
                text,
            } => format!("[{}] <{}> {text}", self.label(channel), sender.name),
            // A terminal can't clear a line later; typing is not shown.
            ClientEvent::MemberTyping { .. } => return None,
            ClientEvent::TopicChanged { channel, topic } => {
                format!("[{}] * Topic: {topic}", self.label(channel))
            }
            ClientEvent::ModesChanged { channel, modes, .. } => {
                let modes: Vec<&str> = modes.iter().map(String::as_str).collect();
                format!("[{}] * Modes: {}", self.label(channel), modes.join(", "))
            }
            ClientEvent::RosterBulkUpdated {
                channel,
                roster_size,
                ..
            } => format!("[{}] * {roster_size} members", self.label(channel)),
            ClientEvent::ChannelDirectory { channels } => {
                let mut lines = vec![format!("* {} channels", channels.len())];
                for listing in channels {
                    lines.push(format!(
                        "  {} {} ({} members) {}",
                        listing.id, listing.name, listing.member_count, listing.topic
                    ));
                }
                lines.join("\n")
            }
            ClientEvent::OperatorNotice { text, .. } => format!("!! {text}"),
            ClientEvent::Error { kind, text } => match kind {
                ErrorKind::Problem(code) => format!("! {}: {text}", code.title()),
                ErrorKind::Decode => format!("! Unreadable frame: {text}"),
                ErrorKind::Transport => format!("! Connection problem: {text}"),
            },
            ClientEvent::WelcomeNotice { title, text } => format!("== {title} ==\n{text}"),
            ClientEvent::Disconnect { reason } => {
                self.current = None;
                self.names.clear();
                match reason {
                    Some(reason) => format!("* Disconnected: {reason}"),
                    None => String::from("* Disconnected"),
                }
            }
        };

        Some(line)
    }

    fn forget(&mut self, channel: &Uuid) {
        self.names.remove(channel);
        if self.current == Some(*channel) {
            self.current = self.names.keys().next().copied();
        }
    }

    /// Decide what a prompt line means.
    pub fn interpret(&self, line: &str) -> Input {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Input::Empty;
        }

        if let Some(command) = trimmed.strip_prefix('/') {
            let word = command.split_whitespace().next().unwrap_or_default();
            if word.eq_ignore_ascii_case("quit") {
                return Input::Quit;
            }
            if word.eq_ignore_ascii_case("leave") {
                return match self.current {
                    Some(channel) => Input::Leave(channel),
                    None => Input::Notice(String::from("* Not in a channel")),
                };
            }
            return Input::Command(self.current.unwrap_or(VOID_ID), trimmed.to_string());
        }

        match self.current {
            Some(channel) => Input::Say(channel, trimmed.to_string()),
            None => Input::Notice(String::from("* Join a channel first: /join <name>")),
        }
    }
}

/// Carry out `input` against the session.
///
/// Returns `false` when the prompt loop should stop.
pub async fn perform(handle: &SessionHandle, input: Input) -> bool {
    let result = match input {
        Input::Quit => {
            if let Err(e) = handle.disconnect().await {
                warn!("Disconnect failed: {e}");
            }
            return false;
        }
        Input::Empty => return true,
        Input::Notice(text) => {
            println!("{text}");
            return true;
        }
        Input::Leave(channel) => handle.leave(channel).await.map_err(|e| e.to_string()),
        Input::Command(channel, line) => handle
            .command(channel, &line)
            .await
            .map_err(|e| e.to_string()),
        Input::Say(channel, text) => handle.say(channel, text).await.map_err(|e| e.to_string()),
    };

    if let Err(e) = result {
        println!("! {e}");
    }

    handle.is_open()
}
