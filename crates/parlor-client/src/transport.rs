//! WebSocket transport for the gateway.
//!
//! Provides [`ConnectedGateway`] which handles socket I/O for event
//! transport. This is a thin layer that just sends/receives envelopes;
//! synchronization logic lives entirely in the sans-IO store.
//!
//! The connection task owns reconnection: on socket loss it notifies the
//! consumer, backs off exponentially, fetches a fresh token, and dials
//! again. The consumer only ever sees [`GatewayNotification`] values.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use parlor_proto::{InboundEvent, OutboundEvent, ProtocolError};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::{
    credentials::CredentialProvider,
    error::{ClientError, Result},
};

/// Transport settings for the gateway socket.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway endpoint, e.g. `wss://gateway.example.com/socket`.
    pub url: String,
    /// Capacity of the channels bridging the connection task.
    pub channel_capacity: usize,
    /// First reconnect delay after a socket loss.
    pub initial_backoff: Duration,
    /// Ceiling for the doubling reconnect delay.
    pub max_backoff: Duration,
}

impl GatewayConfig {
    /// Config with standard backoff for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            channel_capacity: 32,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

/// Connection lifecycle and traffic, as seen by the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayNotification {
    /// The socket is up; the gateway accepted our token.
    Connected,
    /// The socket is down; the task is backing off before redialing.
    Disconnected,
    /// A decoded event arrived.
    Event(InboundEvent),
}

/// Handle to a running gateway connection.
///
/// Events are sent/received via the channels; an internal task handles the
/// socket I/O and reconnection.
pub struct ConnectedGateway {
    /// Send events to the gateway.
    pub to_gateway: mpsc::Sender<OutboundEvent>,
    /// Lifecycle notifications and incoming events.
    pub from_gateway: mpsc::Receiver<GatewayNotification>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedGateway {
    /// Stop the connection task.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for ConnectedGateway {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Start a gateway connection.
///
/// Returns immediately; the first [`GatewayNotification::Connected`]
/// signals that the socket is actually up.
pub fn connect(
    config: GatewayConfig,
    credentials: Arc<dyn CredentialProvider>,
) -> ConnectedGateway {
    let (to_gateway_tx, to_gateway_rx) = mpsc::channel(config.channel_capacity);
    let (from_gateway_tx, from_gateway_rx) = mpsc::channel(config.channel_capacity);

    let handle = tokio::spawn(run_connection(config, credentials, to_gateway_rx, from_gateway_tx));

    ConnectedGateway {
        to_gateway: to_gateway_tx,
        from_gateway: from_gateway_rx,
        abort_handle: handle.abort_handle(),
    }
}

/// Run the connection, bridging between channels and the socket, redialing
/// forever until the consumer goes away.
async fn run_connection(
    config: GatewayConfig,
    credentials: Arc<dyn CredentialProvider>,
    mut to_gateway: mpsc::Receiver<OutboundEvent>,
    from_gateway: mpsc::Sender<GatewayNotification>,
) {
    let mut backoff = config.initial_backoff;

    loop {
        // A fresh token every attempt; the previous one may have expired
        // during the outage.
        let token = match credentials.bearer_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "token fetch failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(config.max_backoff);
                continue;
            },
        };

        let url = format!("{}?token={token}", config.url);
        match connect_async(&url).await {
            Ok((stream, _response)) => {
                tracing::info!(url = %config.url, "gateway connected");
                backoff = config.initial_backoff;

                if from_gateway.send(GatewayNotification::Connected).await.is_err() {
                    return;
                }

                let reason = run_session(stream, &mut to_gateway, &from_gateway).await;
                match reason {
                    SessionEnd::ConsumerGone => return,
                    SessionEnd::SocketLost => {
                        tracing::warn!("gateway connection lost");
                        if from_gateway.send(GatewayNotification::Disconnected).await.is_err() {
                            return;
                        }
                    },
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "gateway dial failed");
            },
        }

        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(config.max_backoff);
    }
}

enum SessionEnd {
    /// Both consumer channels closed; no one is listening anymore.
    ConsumerGone,
    /// The socket dropped; the caller should back off and redial.
    SocketLost,
}

/// Pump one established socket until it drops or the consumer goes away.
async fn run_session(
    stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    to_gateway: &mut mpsc::Receiver<OutboundEvent>,
    from_gateway: &mpsc::Sender<GatewayNotification>,
) -> SessionEnd {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            outgoing = to_gateway.recv() => {
                let Some(event) = outgoing else {
                    return SessionEnd::ConsumerGone;
                };
                match send_event(&mut sink, &event).await {
                    Ok(()) => {},
                    Err(e) => {
                        tracing::warn!(event = event.name(), error = %e, "send failed");
                        return SessionEnd::SocketLost;
                    },
                }
            },
            incoming = source.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match decode_event(&text) {
                            Ok(Some(event)) => {
                                if from_gateway
                                    .send(GatewayNotification::Event(event))
                                    .await
                                    .is_err()
                                {
                                    return SessionEnd::ConsumerGone;
                                }
                            },
                            Ok(None) => {},
                            Err(e) => {
                                tracing::warn!(error = %e, "undecodable frame skipped");
                            },
                        }
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        if sink.send(Message::Pong(payload)).await.is_err() {
                            return SessionEnd::SocketLost;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        return SessionEnd::SocketLost;
                    },
                    Some(Ok(_)) => {
                        // Binary / pong frames carry nothing for us
                    },
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "socket read failed");
                        return SessionEnd::SocketLost;
                    },
                }
            },
        }
    }
}

/// Encode and write one event.
async fn send_event<S>(sink: &mut S, event: &OutboundEvent) -> Result<()>
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = event.encode()?;
    sink.send(Message::Text(text.into()))
        .await
        .map_err(|e| ClientError::Socket(e.to_string()))
}

/// Decode one text frame.
///
/// Unknown event names are tolerated (the gateway ships events faster than
/// clients update); everything else undecodable is an error for the caller
/// to log.
fn decode_event(text: &str) -> Result<Option<InboundEvent>> {
    match InboundEvent::decode(text) {
        Ok(event) => Ok(Some(event)),
        Err(ProtocolError::UnknownEvent { name }) => {
            tracing::debug!(event = %name, "unknown event skipped");
            Ok(None)
        },
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_is_skipped_not_fatal() {
        let result = decode_event(r#"{"event": "mystery", "data": {}}"#).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn known_event_decodes() {
        let result = decode_event(r#"{"event": "user_typing", "data": {"userId": "u2"}}"#).unwrap();
        assert!(matches!(result, Some(InboundEvent::UserTyping(n)) if n.user_id == "u2"));
    }

    #[test]
    fn malformed_frame_is_an_error() {
        assert!(decode_event("not json").is_err());
    }

    #[test]
    fn backoff_config_defaults() {
        let config = GatewayConfig::new("wss://gw.example.com/socket");
        assert_eq!(config.initial_backoff, Duration::from_millis(500));
        assert_eq!(config.max_backoff, Duration::from_secs(30));
    }
}
