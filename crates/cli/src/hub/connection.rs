// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hub connection lifecycle.
//!
//! The [`ConnectionManager`] owns one logical connection to the hub and moves
//! it through `Disconnected → Connecting → Connected → Reconnecting`. When the
//! channel drops without an explicit [`ConnectionManager::disconnect`], a
//! background task retries with exponential backoff until it reconnects, runs
//! out of attempts, or finds the user signed out. Every successful connection
//! replays the group memberships.
//!
//! Ownership of the lifecycle is tracked with an epoch counter. Each connect
//! call, reconnect loop, and session captures the epoch current when it
//! started, and is ignored once a later owner has bumped it. `disconnect`
//! bumps the epoch and cancels the pending reconnect, so no stale attempt can
//! install a session afterwards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use invsync_core::protocol::{methods, ClientMessage, ServerMessage};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::auth::AuthProvider;
use super::backoff::Backoff;
use super::bus::{EventBus, ListenerHandle, Listeners};
use super::groups::GroupMembership;
use super::transport::{Channel, Transport, TransportError, TransportResult};

/// Local event emitted on the bus when the hub rejects the credential.
///
/// Carries one argument: the rejection message.
pub const UNAUTHORIZED_EVENT: &str = "unauthorized";

/// Configuration for the connection manager.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Hub URL.
    pub url: String,
    /// Reconnect delay policy.
    pub backoff: Backoff,
    /// Reconnect attempts before giving up.
    pub max_attempts: u32,
    /// Max time to wait for the server handshake after the socket opens.
    pub handshake_timeout: Duration,
    /// Max time to wait for an invocation to complete.
    pub invoke_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            url: "ws://localhost:5000/hubs/inventory".to_string(),
            backoff: Backoff::default(),
            max_attempts: 10,
            handshake_timeout: Duration::from_secs(10),
            invoke_timeout: Duration::from_secs(15),
        }
    }
}

/// Error type for connection operations.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The credential is missing or was rejected.
    #[error("authentication required")]
    AuthenticationRequired,

    /// Not connected.
    #[error("not connected to hub")]
    NotConnected,

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The hub method reported an error.
    #[error("hub method '{method}' failed: {message}")]
    Hub { method: String, message: String },

    /// No completion arrived in time.
    #[error("hub method '{0}' timed out")]
    InvokeTimeout(String),

    /// The session ended before the completion arrived.
    #[error("connection lost while waiting for '{0}'")]
    ConnectionLost(String),

    /// The completion could not be decoded.
    #[error("unexpected result from '{method}': {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for connection operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Disconnected => "disconnected",
            Phase::Connecting => "connecting",
            Phase::Connected => "connected",
            Phase::Reconnecting => "reconnecting",
        }
    }
}

/// Snapshot of the connection.
///
/// `connection_id` is only ever present while `phase` is `Connected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub phase: Phase,
    pub connection_id: Option<String>,
    pub last_error: Option<String>,
}

impl ConnectionState {
    fn disconnected() -> Self {
        ConnectionState {
            phase: Phase::Disconnected,
            connection_id: None,
            last_error: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.phase == Phase::Connected
    }
}

type Completion = Result<Option<Value>, String>;

struct Session {
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    pending: HashMap<u64, oneshot::Sender<Completion>>,
    reader: CancellationToken,
}

struct Inner {
    state: ConnectionState,
    attempt: u32,
    epoch: u64,
    session: Option<Session>,
    reconnect: Option<CancellationToken>,
    next_invocation_id: u64,
}

struct Shared {
    config: ConnectionConfig,
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthProvider>,
    bus: EventBus,
    groups: GroupMembership,
    state_listeners: Listeners<ConnectionState>,
    inner: Mutex<Inner>,
}

/// Why a live session ended.
enum DropCause {
    Closed(Option<String>),
    Unauthorized(String),
    Failed(TransportError),
}

/// Owner of the hub connection.
///
/// Cloning is cheap; clones control the same connection.
#[derive(Clone)]
pub struct ConnectionManager {
    shared: Arc<Shared>,
}

impl ConnectionManager {
    /// Create a manager. Nothing connects until [`connect`](Self::connect).
    pub fn new(
        config: ConnectionConfig,
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthProvider>,
        bus: EventBus,
    ) -> Self {
        ConnectionManager {
            shared: Arc::new(Shared {
                config,
                transport,
                auth,
                bus,
                groups: GroupMembership::new(),
                state_listeners: Listeners::new("connection state"),
                inner: Mutex::new(Inner {
                    state: ConnectionState::disconnected(),
                    attempt: 0,
                    epoch: 0,
                    session: None,
                    reconnect: None,
                    next_invocation_id: 0,
                }),
            }),
        }
    }

    /// The bus inbound hub events are published on.
    pub fn bus(&self) -> &EventBus {
        &self.shared.bus
    }

    /// The group membership set replayed on every connection.
    pub fn groups(&self) -> &GroupMembership {
        &self.shared.groups
    }

    /// Get a snapshot of the connection state.
    pub fn state(&self) -> ConnectionState {
        self.lock().state.clone()
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.lock().state.is_connected()
    }

    /// Consecutive failed reconnect attempts since the last success.
    pub fn attempt(&self) -> u32 {
        self.lock().attempt
    }

    /// Whether a reconnect loop is scheduled or running.
    pub fn has_pending_reconnect(&self) -> bool {
        self.lock()
            .reconnect
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Register a listener for phase transitions.
    pub fn on_state_change<F>(&self, listener: F) -> ListenerHandle<ConnectionState>
    where
        F: Fn(&ConnectionState) + Send + Sync + 'static,
    {
        self.shared.state_listeners.add(listener)
    }

    /// Identifier of the live session, if connected.
    pub(crate) fn session_epoch(&self) -> Option<u64> {
        let inner = self.lock();
        inner.state.is_connected().then_some(inner.epoch)
    }

    /// Connect to the hub.
    ///
    /// A no-op while a connection exists or is being established, and when
    /// the user is not authenticated. A transient failure leaves the manager
    /// `Disconnected` with a reconnect scheduled; an authorization failure
    /// schedules nothing and emits [`UNAUTHORIZED_EVENT`].
    pub async fn connect(&self) -> ConnectionResult<()> {
        let (epoch, change) = {
            let mut inner = self.lock();
            if inner.state.phase != Phase::Disconnected {
                tracing::debug!(phase = inner.state.phase.as_str(), "connect ignored");
                return Ok(());
            }
            if !self.shared.auth.is_authenticated() {
                tracing::debug!("not authenticated, skipping connect");
                return Ok(());
            }
            // A connect after a failed attempt supersedes its pending retry.
            if let Some(token) = inner.reconnect.take() {
                token.cancel();
            }
            inner.epoch += 1;
            let last_error = inner.state.last_error.clone();
            let change = transition(&mut inner, Phase::Connecting, None, last_error);
            (inner.epoch, change)
        };
        self.publish(change);

        match self.establish().await {
            Ok((channel, connection_id)) => {
                if self.install(epoch, channel, connection_id) {
                    self.shared.groups.on_reconnected(self, epoch).await;
                } else {
                    tracing::debug!("connect superseded by disconnect");
                }
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                self.reject(epoch, &e);
                Err(ConnectionError::AuthenticationRequired)
            }
            Err(e) => {
                tracing::warn!(error = %e, "hub connection failed");
                self.fail_and_schedule(epoch, &e);
                Err(e.into())
            }
        }
    }

    /// Tear down the connection and cancel any pending reconnect.
    ///
    /// Safe to call in any phase, any number of times.
    pub fn disconnect(&self) {
        let change = {
            let mut inner = self.lock();
            if let Some(token) = inner.reconnect.take() {
                token.cancel();
            }
            inner.epoch += 1;
            inner.attempt = 0;
            if let Some(session) = inner.session.take() {
                // Dropping the sender closes the socket; pending invocations fail.
                session.reader.cancel();
            }
            transition(&mut inner, Phase::Disconnected, None, None)
        };
        if change.is_some() {
            tracing::info!("disconnected from hub");
        }
        self.publish(change);
    }

    /// Invoke a hub method and wait for its result.
    pub async fn invoke(&self, method: &str, arguments: Vec<Value>) -> ConnectionResult<Value> {
        let (id, rx) = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            if !inner.state.is_connected() {
                return Err(ConnectionError::NotConnected);
            }
            let session = inner
                .session
                .as_mut()
                .ok_or(ConnectionError::NotConnected)?;
            inner.next_invocation_id += 1;
            let id = inner.next_invocation_id;
            let (tx, rx) = oneshot::channel();
            session.pending.insert(id, tx);
            if session
                .outgoing
                .send(ClientMessage::invocation(id, method, arguments))
                .is_err()
            {
                session.pending.remove(&id);
                return Err(ConnectionError::ConnectionLost(method.to_string()));
            }
            (id, rx)
        };

        match tokio::time::timeout(self.shared.config.invoke_timeout, rx).await {
            Err(_) => {
                if let Some(session) = self.lock().session.as_mut() {
                    session.pending.remove(&id);
                }
                Err(ConnectionError::InvokeTimeout(method.to_string()))
            }
            Ok(Err(_)) => Err(ConnectionError::ConnectionLost(method.to_string())),
            Ok(Ok(Err(message))) => Err(ConnectionError::Hub {
                method: method.to_string(),
                message,
            }),
            Ok(Ok(Ok(result))) => Ok(result.unwrap_or(Value::Null)),
        }
    }

    /// Number of clients connected to the hub.
    pub async fn get_connection_count(&self) -> ConnectionResult<u64> {
        let value = self.invoke(methods::GET_CONNECTION_COUNT, Vec::new()).await?;
        serde_json::from_value(value).map_err(|source| ConnectionError::Decode {
            method: methods::GET_CONNECTION_COUNT.to_string(),
            source,
        })
    }

    /// Add a group and join it now if connected.
    pub async fn join_group(&self, group: &str) -> ConnectionResult<()> {
        self.shared.groups.join(self, group).await
    }

    /// Remove a group and leave it now if connected.
    pub async fn leave_group(&self, group: &str) -> ConnectionResult<()> {
        self.shared.groups.leave(self, group).await
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, change: Option<ConnectionState>) {
        if let Some(state) = change {
            tracing::debug!(phase = state.phase.as_str(), "connection state changed");
            self.shared.state_listeners.notify(&state);
        }
    }

    /// Open a session and wait for the server handshake.
    async fn establish(&self) -> TransportResult<(Channel, String)> {
        let config = &self.shared.config;
        let credential = self.shared.auth.credential();
        let mut channel = self.shared.transport.open(&config.url, credential).await?;
        let connection_id = tokio::time::timeout(
            config.handshake_timeout,
            wait_for_handshake(&mut channel),
        )
        .await
        .map_err(|_| TransportError::Timeout("handshake"))??;
        Ok((channel, connection_id))
    }

    /// Make `channel` the live session. Returns `false` if `epoch` is stale.
    fn install(&self, epoch: u64, channel: Channel, connection_id: String) -> bool {
        let Channel { outgoing, incoming } = channel;
        let change = {
            let mut inner = self.lock();
            if inner.epoch != epoch {
                return false;
            }
            let reader = CancellationToken::new();
            inner.session = Some(Session {
                outgoing,
                pending: HashMap::new(),
                reader: reader.clone(),
            });
            inner.attempt = 0;
            inner.reconnect = None;
            tokio::spawn(self.clone().read_loop(epoch, incoming, reader));
            transition(&mut inner, Phase::Connected, Some(connection_id), None)
        };
        tracing::info!(url = %self.shared.config.url, "connected to hub");
        self.publish(change);
        true
    }

    /// Dispatch frames of one session until it ends.
    async fn read_loop(
        self,
        epoch: u64,
        mut incoming: mpsc::UnboundedReceiver<TransportResult<ServerMessage>>,
        cancel: CancellationToken,
    ) {
        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => return,
                frame = incoming.recv() => frame,
            };

            let cause = match frame {
                Some(Ok(ServerMessage::Event { target, arguments })) => {
                    self.shared.bus.emit(&target, &arguments);
                    continue;
                }
                Some(Ok(ServerMessage::Completion {
                    invocation_id,
                    result,
                    error,
                })) => {
                    let completion = match error {
                        Some(message) => Err(message),
                        None => Ok(result),
                    };
                    self.complete(epoch, invocation_id, completion);
                    continue;
                }
                Some(Ok(ServerMessage::Ping)) => {
                    self.pong(epoch);
                    continue;
                }
                Some(Ok(ServerMessage::Handshake { .. })) => continue,
                Some(Ok(ServerMessage::Close {
                    error,
                    unauthorized: true,
                })) => DropCause::Unauthorized(
                    error.unwrap_or_else(|| "session rejected by hub".to_string()),
                ),
                Some(Ok(ServerMessage::Close { error, .. })) => DropCause::Closed(error),
                Some(Err(e)) => DropCause::Failed(e),
                None => DropCause::Closed(None),
            };
            self.on_drop(epoch, cause);
            return;
        }
    }

    fn pong(&self, epoch: u64) {
        let inner = self.lock();
        if inner.epoch != epoch {
            return;
        }
        if let Some(session) = &inner.session {
            let _ = session.outgoing.send(ClientMessage::Ping);
        }
    }

    fn complete(&self, epoch: u64, invocation_id: u64, completion: Completion) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return;
        }
        let waiter = inner
            .session
            .as_mut()
            .and_then(|session| session.pending.remove(&invocation_id));
        match waiter {
            Some(tx) => {
                let _ = tx.send(completion);
            }
            None => tracing::debug!(invocation_id, "completion for unknown invocation"),
        }
    }

    /// The live session ended without an explicit disconnect.
    fn on_drop(&self, epoch: u64, cause: DropCause) {
        if let DropCause::Unauthorized(message) = &cause {
            self.reject(epoch, &TransportError::Unauthorized(message.clone()));
            return;
        }
        let reason = match cause {
            DropCause::Closed(Some(reason)) => reason,
            DropCause::Closed(None) => TransportError::ConnectionClosed.to_string(),
            DropCause::Failed(e) => e.to_string(),
            DropCause::Unauthorized(message) => message,
        };

        let change = {
            let mut inner = self.lock();
            if inner.epoch != epoch {
                return;
            }
            inner.session = None;
            inner.epoch += 1;
            let token = CancellationToken::new();
            inner.reconnect = Some(token.clone());
            tokio::spawn(self.clone().reconnect_loop(inner.epoch, token));
            transition(&mut inner, Phase::Reconnecting, None, Some(reason.clone()))
        };
        tracing::warn!(reason = %reason, "hub connection lost, reconnecting");
        self.publish(change);
    }

    /// Record an authorization failure. No reconnect is scheduled.
    fn reject(&self, epoch: u64, error: &TransportError) {
        let change = {
            let mut inner = self.lock();
            if inner.epoch != epoch {
                return;
            }
            inner.session = None;
            inner.reconnect = None;
            inner.attempt = 0;
            transition(
                &mut inner,
                Phase::Disconnected,
                None,
                Some(ConnectionError::AuthenticationRequired.to_string()),
            )
        };
        tracing::warn!(error = %error, "hub rejected credential");
        self.publish(change);
        self.shared
            .bus
            .emit(UNAUTHORIZED_EVENT, &[json!(error.to_string())]);
    }

    /// Record a failed initial connect and hand over to the reconnect loop.
    fn fail_and_schedule(&self, epoch: u64, error: &TransportError) {
        let change = {
            let mut inner = self.lock();
            if inner.epoch != epoch {
                return;
            }
            inner.epoch += 1;
            let token = CancellationToken::new();
            inner.reconnect = Some(token.clone());
            tokio::spawn(self.clone().reconnect_loop(inner.epoch, token));
            transition(
                &mut inner,
                Phase::Disconnected,
                None,
                Some(error.to_string()),
            )
        };
        self.publish(change);
    }

    /// Stop the reconnect loop owned by `epoch`, leaving the manager disconnected.
    fn abandon(&self, epoch: u64, reason: String) {
        let change = {
            let mut inner = self.lock();
            if inner.epoch != epoch {
                return;
            }
            inner.reconnect = None;
            transition(&mut inner, Phase::Disconnected, None, Some(reason))
        };
        self.publish(change);
    }

    /// Retry with exponential backoff until connected, cancelled, signed
    /// out, or out of attempts.
    async fn reconnect_loop(self, epoch: u64, cancel: CancellationToken) {
        let config = &self.shared.config;

        loop {
            if cancel.is_cancelled() {
                return;
            }
            if !self.shared.auth.is_authenticated() {
                tracing::info!("not authenticated, abandoning reconnect");
                self.abandon(epoch, ConnectionError::AuthenticationRequired.to_string());
                return;
            }

            let attempt = {
                let inner = self.lock();
                if inner.epoch != epoch {
                    return;
                }
                inner.attempt
            };
            if attempt >= config.max_attempts {
                tracing::warn!(attempts = attempt, "giving up on hub reconnect");
                self.abandon(
                    epoch,
                    format!("gave up reconnecting after {} attempts", attempt),
                );
                return;
            }

            let delay = config.backoff.jittered(attempt);
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "reconnect scheduled");
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            if !self.shared.auth.is_authenticated() {
                tracing::info!("not authenticated, abandoning reconnect");
                self.abandon(epoch, ConnectionError::AuthenticationRequired.to_string());
                return;
            }

            let change = {
                let mut inner = self.lock();
                if inner.epoch != epoch {
                    return;
                }
                let last_error = inner.state.last_error.clone();
                transition(&mut inner, Phase::Reconnecting, None, last_error)
            };
            self.publish(change);

            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                result = self.establish() => result,
            };

            match result {
                Ok((channel, connection_id)) => {
                    if self.install(epoch, channel, connection_id) {
                        self.shared.groups.on_reconnected(&self, epoch).await;
                    }
                    return;
                }
                Err(e) if e.is_unauthorized() => {
                    self.reject(epoch, &e);
                    return;
                }
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "reconnect attempt failed");
                    let mut inner = self.lock();
                    if inner.epoch != epoch {
                        return;
                    }
                    inner.attempt = inner.attempt.saturating_add(1);
                    inner.state.last_error = Some(e.to_string());
                }
            }
        }
    }
}

/// Replace the state, returning it when the phase changed.
fn transition(
    inner: &mut Inner,
    phase: Phase,
    connection_id: Option<String>,
    last_error: Option<String>,
) -> Option<ConnectionState> {
    let changed = inner.state.phase != phase;
    inner.state = ConnectionState {
        phase,
        connection_id: connection_id.filter(|_| phase == Phase::Connected),
        last_error,
    };
    changed.then(|| inner.state.clone())
}

async fn wait_for_handshake(channel: &mut Channel) -> TransportResult<String> {
    loop {
        match channel.incoming.recv().await {
            Some(Ok(ServerMessage::Handshake { connection_id })) => return Ok(connection_id),
            Some(Ok(ServerMessage::Close {
                error,
                unauthorized: true,
            })) => {
                return Err(TransportError::Unauthorized(
                    error.unwrap_or_else(|| "session rejected by hub".to_string()),
                ))
            }
            Some(Ok(ServerMessage::Close { error, .. })) => {
                return Err(TransportError::ConnectionFailed(
                    error.unwrap_or_else(|| "closed during handshake".to_string()),
                ))
            }
            Some(Ok(other)) => {
                tracing::debug!(?other, "ignoring frame before handshake");
            }
            Some(Err(e)) => return Err(e),
            None => return Err(TransportError::ConnectionClosed),
        }
    }
}
