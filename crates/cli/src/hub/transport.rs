// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the hub connection.
//!
//! A [`Transport`] opens one session at a time and hands back a [`Channel`]:
//! an outgoing sender and an incoming receiver. Dropping the outgoing sender
//! closes the session; the incoming receiver yields `None` once the server
//! side is gone. This keeps the connection manager independent of sockets
//! and lets tests script a fake hub.

use std::future::Future;
use std::pin::Pin;

use invsync_core::protocol::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;

/// Error type for transport operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The server rejected the credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// No handshake arrived in time.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

impl TransportError {
    /// Whether this failure is an authorization failure rather than a
    /// transient connectivity problem.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TransportError::Unauthorized(_))
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// An open hub session.
pub struct Channel {
    /// Frames to send. Dropping this closes the session.
    pub outgoing: mpsc::UnboundedSender<ClientMessage>,
    /// Frames received, or the error that ended the session.
    pub incoming: mpsc::UnboundedReceiver<TransportResult<ServerMessage>>,
}

/// Future returned by [`Transport::open`].
pub type OpenFuture<'a> = Pin<Box<dyn Future<Output = TransportResult<Channel>> + Send + 'a>>;

/// Factory for hub sessions.
pub trait Transport: Send + Sync {
    /// Open a session to `url`, presenting `credential` as a bearer token.
    fn open(&self, url: &str, credential: Option<String>) -> OpenFuture<'_>;
}

/// WebSocket transport implementation using tokio-tungstenite.
#[derive(Debug, Default, Clone)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        WebSocketTransport
    }
}

impl Transport for WebSocketTransport {
    fn open(&self, url: &str, credential: Option<String>) -> OpenFuture<'_> {
        let url = url.to_string();
        Box::pin(async move {
            use futures_util::{SinkExt, StreamExt};
            use tokio_tungstenite::tungstenite::client::IntoClientRequest;
            use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
            use tokio_tungstenite::tungstenite::Message;

            let mut request = url
                .as_str()
                .into_client_request()
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            if let Some(token) = credential {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
                request.headers_mut().insert(AUTHORIZATION, value);
            }

            let (ws_stream, _) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(map_connect_error)?;
            let (mut sink, mut stream) = ws_stream.split();

            let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
            let (in_tx, in_rx) = mpsc::unbounded_channel();

            // Writer: runs until the client drops its sender, then closes the socket.
            tokio::spawn(async move {
                while let Some(msg) = out_rx.recv().await {
                    let json = match msg.to_json() {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::warn!(error = %e, "dropping unserializable frame");
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(Message::Text(json.into())).await {
                        tracing::debug!(error = %e, "hub send failed");
                        break;
                    }
                }
                let _ = sink.close().await;
            });

            // Reader: forwards frames until the socket or the client goes away.
            tokio::spawn(async move {
                while let Some(frame) = stream.next().await {
                    let forwarded = match frame {
                        Ok(Message::Text(text)) => match ServerMessage::from_json(&text) {
                            Ok(msg) => in_tx.send(Ok(msg)),
                            Err(e) => {
                                tracing::warn!(error = %e, "ignoring malformed hub frame");
                                continue;
                            }
                        },
                        Ok(Message::Close(_)) => break,
                        // Ping/pong and binary frames carry nothing for us
                        Ok(_) => continue,
                        Err(e) => {
                            let _ = in_tx.send(Err(TransportError::ReceiveFailed(e.to_string())));
                            break;
                        }
                    };
                    if forwarded.is_err() {
                        break;
                    }
                }
            });

            Ok(Channel {
                outgoing: out_tx,
                incoming: in_rx,
            })
        })
    }
}

fn map_connect_error(e: tokio_tungstenite::tungstenite::Error) -> TransportError {
    use tokio_tungstenite::tungstenite::http::StatusCode;
    use tokio_tungstenite::tungstenite::Error;

    match e {
        Error::Http(response)
            if matches!(
                response.status(),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
            ) =>
        {
            TransportError::Unauthorized(format!("hub returned {}", response.status()))
        }
        other => TransportError::ConnectionFailed(other.to_string()),
    }
}
