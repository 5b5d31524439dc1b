//! Socket lifecycle and the session task.
//!
//! # Architecture
//!
//! [`ChatClient::connect`] opens the socket, sends the auth frame, and
//! spawns one task that owns the [`Dispatcher`] (and therefore the session
//! store). That task handles exactly one thing at a time: either the next
//! inbound frame or the next caller action queued by a [`SessionHandle`].
//! Nothing else touches the session, so there are no locks.
//!
//! When the socket closes, the task wipes the session, publishes
//! `disconnect` and exits. It never reconnects; [`SessionHandle::closed`]
//! hands back a fresh [`ChatClient`] with the same subscriptions so the
//! caller can decide.

pub(crate) mod codec;
mod tls;

use crate::command;
use crate::config::ClientConfig;
use crate::connection::codec::{Inbound, decode, encode};
use crate::connection::tls::install_crypto_provider;
use crate::dispatcher::Dispatcher;
use crate::error::CoreError;
use crate::error::connection::ConnectionError;
use crate::event_bus::{ClientEvent, EventBus, HandlerResult, Topic};
use crate::session::SessionStore;

use common::ErrorLocation;
use models::{ChannelOptions, Credentials, Request};

use std::ops::ControlFlow;
use std::panic::Location;
use std::time::Instant;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use uuid::Uuid;

const ACTION_QUEUE_DEPTH: usize = 64;
const CLIENT_CLOSE_REASON: &str = "closed by client";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type SocketWriter = SplitSink<Socket, Message>;
type SocketReader = SplitStream<Socket>;

/// A not-yet-connected client: configuration plus subscriptions.
#[derive(Debug)]
pub struct ChatClient {
    config: ClientConfig,
    dispatcher: Dispatcher,
}

impl ChatClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_bus(config, EventBus::new())
    }

    fn with_bus(config: ClientConfig, bus: EventBus) -> Self {
        let dispatcher = Dispatcher::new(bus, &config);
        Self { config, dispatcher }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Session state; empty until connected.
    pub fn store(&self) -> &SessionStore {
        self.dispatcher.store()
    }

    /// Register a handler. See [`EventBus::subscribe`].
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F)
    where
        F: FnMut(&ClientEvent) -> HandlerResult + Send + 'static,
    {
        self.dispatcher.bus_mut().subscribe(topic, handler);
    }

    /// Open the socket, log in and start the session task.
    ///
    /// The auth frame is sent before `connect` is published. Opening the
    /// socket is bounded by the configured connect timeout.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectFailure`] holding the client, subscriptions
    /// intact, so the caller can retry. Its error is one of:
    ///
    /// - [`ConnectionError::Timeout`] if the socket didn't open in time
    /// - [`ConnectionError::Connect`] if the handshake failed
    /// - [`ConnectionError::Encode`] / [`ConnectionError::Send`] if the auth frame couldn't go out
    ///
    /// An `error` event is published before returning.
    pub async fn connect(
        mut self,
        url: &str,
        credentials: &Credentials,
    ) -> Result<SessionHandle, ConnectFailure> {
        info!("Connecting to {url}");
        install_crypto_provider();

        let (socket, _) = match timeout(self.config.connect_timeout(), connect_async(url)).await {
            Ok(Ok(opened)) => opened,
            Ok(Err(e)) => {
                self.dispatcher.report_transport_error(e.to_string());
                let error = ConnectionError::Connect {
                    message: format!("Failed to connect to {url}: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                };
                return Err(self.failed(error));
            }
            Err(_) => {
                let message = format!(
                    "No connection to {url} after {}s",
                    self.config.server.connect_timeout_secs
                );
                self.dispatcher.report_transport_error(message.clone());
                let error = ConnectionError::Timeout {
                    message,
                    location: ErrorLocation::from(Location::caller()),
                };
                return Err(self.failed(error));
            }
        };

        let (mut writer, reader) = socket.split();

        let auth = credentials.to_request();
        debug!("Sending auth frame {:?}", auth.kind);
        if let Err(e) = send_frame(&mut writer, &auth).await {
            self.dispatcher.report_transport_error(e.to_string());
            return Err(self.failed(e));
        }

        self.dispatcher.emit(ClientEvent::Connect {
            url: url.to_string(),
        });

        let (actions, action_rx) = mpsc::channel(ACTION_QUEUE_DEPTH);
        let task = tokio::spawn(session_task(self.dispatcher, writer, reader, action_rx));

        Ok(SessionHandle {
            actions,
            task,
            config: self.config,
        })
    }

    fn failed(self, error: ConnectionError) -> ConnectFailure {
        warn!("Connect failed: {error}");
        ConnectFailure {
            client: Box::new(self),
            error,
        }
    }
}

/// A connect attempt that didn't produce a session.
///
/// Carries the client back so its subscriptions survive a retry.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ConnectFailure {
    pub client: Box<ChatClient>,
    #[source]
    pub error: ConnectionError,
}

impl ConnectFailure {
    pub fn into_parts(self) -> (ChatClient, ConnectionError) {
        (*self.client, self.error)
    }
}

enum Action {
    Send {
        request: Request,
        reply: oneshot::Sender<Result<(), ConnectionError>>,
    },
    Typing {
        channel: Uuid,
        reply: oneshot::Sender<Result<bool, ConnectionError>>,
    },
    Settings {
        channel: Uuid,
        topic: String,
        options: ChannelOptions,
        reply: oneshot::Sender<Result<usize, ConnectionError>>,
    },
    Disconnect {
        reply: oneshot::Sender<Result<(), ConnectionError>>,
    },
}

/// Caller side of a running session.
///
/// Every operation fails with [`ConnectionError::NotOpen`] once the
/// session has ended.
#[derive(Debug)]
pub struct SessionHandle {
    actions: mpsc::Sender<Action>,
    task: JoinHandle<Dispatcher>,
    config: ClientConfig,
}

impl SessionHandle {
    pub fn is_open(&self) -> bool {
        !self.actions.is_closed() && !self.task.is_finished()
    }

    /// Send a request as-is.
    pub async fn send_request(&self, request: Request) -> Result<(), ConnectionError> {
        let (reply, response) = oneshot::channel();
        self.submit(Action::Send { request, reply }).await?;
        await_reply(response).await?
    }

    /// Parse a command line typed in `channel` and send the result.
    ///
    /// # Errors
    ///
    /// [`CoreError::Command`] if the line doesn't parse; nothing is sent.
    pub async fn command(&self, channel: Uuid, line: &str) -> Result<(), CoreError> {
        let request = command::parse_line(channel, line)?;
        self.send_request(request).await?;
        Ok(())
    }

    pub async fn say(&self, channel: Uuid, text: impl Into<String>) -> Result<(), ConnectionError> {
        self.send_request(Request::message(channel, text)).await
    }

    /// Tell the channel we're typing, at most once per cool-down window.
    ///
    /// # Returns
    ///
    /// `true` if a ping was sent, `false` if it was throttled (or the channel is unknown).
    pub async fn typing(&self, channel: Uuid) -> Result<bool, ConnectionError> {
        let (reply, response) = oneshot::channel();
        self.submit(Action::Typing { channel, reply }).await?;
        await_reply(response).await?
    }

    pub async fn leave(&self, channel: Uuid) -> Result<(), ConnectionError> {
        self.send_request(Request::part(channel)).await
    }

    pub async fn kick(
        &self,
        channel: Uuid,
        user: Uuid,
        reason: impl Into<String>,
    ) -> Result<(), ConnectionError> {
        self.send_request(Request::kick(channel, user, reason)).await
    }

    pub async fn kill(&self, user: Uuid, reason: impl Into<String>) -> Result<(), ConnectionError> {
        self.send_request(Request::kill(user, reason)).await
    }

    /// Send whatever `Topic` / `SetChannelModes` requests are needed to
    /// bring `channel` to these settings.
    ///
    /// # Returns
    ///
    /// How many requests were sent (0 when nothing changed).
    pub async fn update_channel_settings(
        &self,
        channel: Uuid,
        topic: impl Into<String>,
        options: ChannelOptions,
    ) -> Result<usize, ConnectionError> {
        let (reply, response) = oneshot::channel();
        self.submit(Action::Settings {
            channel,
            topic: topic.into(),
            options,
            reply,
        })
        .await?;
        await_reply(response).await?
    }

    /// Close the socket. The session task publishes `disconnect` and exits.
    pub async fn disconnect(&self) -> Result<(), ConnectionError> {
        let (reply, response) = oneshot::channel();
        self.submit(Action::Disconnect { reply }).await?;
        await_reply(response).await?
    }

    /// Wait for the session to end and get a client ready to reconnect.
    ///
    /// The returned client keeps every subscription and starts with an
    /// empty session.
    pub async fn closed(self) -> ChatClient {
        match self.task.await {
            Ok(dispatcher) => ChatClient::with_bus(self.config, dispatcher.into_bus()),
            Err(e) => {
                error!("Session task failed, subscriptions lost: {e}");
                ChatClient::new(self.config)
            }
        }
    }

    async fn submit(&self, action: Action) -> Result<(), ConnectionError> {
        self.actions
            .send(action)
            .await
            .map_err(|_| ConnectionError::NotOpen {
                message: String::from("Session is closed"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

async fn await_reply<T>(response: oneshot::Receiver<T>) -> Result<T, ConnectionError> {
    response.await.map_err(|_| ConnectionError::NotOpen {
        message: String::from("Session closed before the request was handled"),
        location: ErrorLocation::from(Location::caller()),
    })
}

async fn send_frame(writer: &mut SocketWriter, request: &Request) -> Result<(), ConnectionError> {
    let message = encode(request)?;
    writer.send(message).await.map_err(|e| ConnectionError::Send {
        message: format!("Failed to send {:?}: {e}", request.kind),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// The session task.
///
/// Owns the dispatcher until the socket closes or every handle is gone,
/// then resets the session and returns the dispatcher.
async fn session_task(
    mut dispatcher: Dispatcher,
    mut writer: SocketWriter,
    mut reader: SocketReader,
    mut actions: mpsc::Receiver<Action>,
) -> Dispatcher {
    info!("Session task started");

    let reason = loop {
        tokio::select! {
            frame = reader.next() => match frame {
                Some(Ok(message)) => match decode(message) {
                    Ok(Inbound::Frame(event)) => {
                        for reply in dispatcher.dispatch(*event) {
                            if let Err(e) = send_frame(&mut writer, &reply).await {
                                error!("Failed to send reply: {e}");
                            }
                        }
                    }
                    Ok(Inbound::Control) => {}
                    Ok(Inbound::Closed(reason)) => {
                        info!("Server closed the connection: {reason:?}");
                        break reason;
                    }
                    Err(e) => {
                        warn!("Dropping frame: {e}");
                        dispatcher.report_decode_error(e.to_string());
                    }
                },
                Some(Err(e)) => {
                    error!("Socket error: {e}");
                    dispatcher.report_transport_error(e.to_string());
                    break Some(e.to_string());
                }
                None => {
                    info!("Socket stream ended");
                    break None;
                }
            },
            action = actions.recv() => match action {
                Some(action) => {
                    if handle_action(&mut dispatcher, &mut writer, action).await.is_break() {
                        break Some(CLIENT_CLOSE_REASON.to_string());
                    }
                }
                None => {
                    info!("All session handles dropped, closing socket");
                    if let Err(e) = writer.close().await {
                        debug!("Close after handles dropped failed: {e}");
                    }
                    break Some(CLIENT_CLOSE_REASON.to_string());
                }
            },
        }
    };

    // Pending callers get NotOpen instead of waiting on a dead session.
    actions.close();
    dispatcher.disconnect(reason);

    info!("Session task stopped");
    dispatcher
}

async fn handle_action(
    dispatcher: &mut Dispatcher,
    writer: &mut SocketWriter,
    action: Action,
) -> ControlFlow<()> {
    match action {
        Action::Send { request, reply } => {
            let result = send_frame(writer, &request).await;
            let _ = reply.send(result);
        }
        Action::Typing { channel, reply } => {
            let result = match dispatcher.typing_request(channel, Instant::now()) {
                Some(request) => send_frame(writer, &request).await.map(|_| true),
                None => Ok(false),
            };
            let _ = reply.send(result);
        }
        Action::Settings {
            channel,
            topic,
            options,
            reply,
        } => {
            let requests = dispatcher.settings_requests(&channel, &topic, options);
            let mut result = Ok(requests.len());
            for request in &requests {
                if let Err(e) = send_frame(writer, request).await {
                    result = Err(e);
                    break;
                }
            }
            let _ = reply.send(result);
        }
        Action::Disconnect { reply } => {
            info!("Disconnect requested");
            let result = writer.close().await.map_err(ConnectionError::from);
            let _ = reply.send(result);
            return ControlFlow::Break(());
        }
    }

    ControlFlow::Continue(())
}
