//! WebSocket connection handler

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant, Interval};

use super::events::RelayMessage;
use super::session::ConnectionSession;
use super::state::RelayState;
use crate::types::ConnectionId;

/// How long the writer gets to flush its queue and send Close
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<RelayState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Fresh connection id for a socket
pub fn new_connection_id() -> ConnectionId {
    format!("conn_{}", uuid::Uuid::new_v4().simple())
}

/// Pong bookkeeping for one socket.
///
/// A ping counts as outstanding from the moment it is sent until any pong
/// arrives. The peer is considered dead once the oldest outstanding ping
/// is older than the pong timeout.
#[derive(Debug, Clone)]
pub struct Liveness {
    pong_timeout: Duration,
    awaiting_since: Option<Instant>,
}

impl Liveness {
    pub fn new(pong_timeout: Duration) -> Self {
        Self {
            pong_timeout,
            awaiting_since: None,
        }
    }

    pub fn ping_sent(&mut self, now: Instant) {
        self.awaiting_since.get_or_insert(now);
    }

    pub fn pong_received(&mut self) {
        self.awaiting_since = None;
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        match self.awaiting_since {
            Some(sent) => now.saturating_duration_since(sent) >= self.pong_timeout,
            None => false,
        }
    }
}

/// Drive one socket: a writer task drains the connection's outbound queue,
/// the reader loop feeds frames to the session in arrival order and keeps
/// the ping/pong schedule.
async fn handle_socket(socket: WebSocket, state: Arc<RelayState>) {
    let id = new_connection_id();
    let ping_interval = state.config().ping_interval();
    let mut liveness = Liveness::new(state.config().pong_timeout());
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<RelayMessage>();
    let (control_tx, control_rx) = mpsc::unbounded_channel::<Message>();

    let mut session = ConnectionSession::open(state, id.clone(), tx);
    let mut writer_handle = tokio::spawn(writer_task(ws_sender, rx, control_rx));
    let mut writer_done = false;
    let mut ping_timer = ping_interval.map(|period| interval_at(Instant::now() + period, period));

    tracing::info!(connection_id = %id, "WebSocket connected");

    loop {
        tokio::select! {
            incoming = ws_receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Err(err) = session.handle_text(&text) {
                        tracing::warn!(
                            connection_id = %id,
                            code = err.code(),
                            error = %err,
                            "Dropped client event"
                        );
                    }
                }
                Some(Ok(Message::Pong(_))) => liveness.pong_received(),
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(connection_id = %id, reason = ?frame, "Client initiated close");
                    break;
                }
                // tungstenite answers pings itself; binary frames carry nothing for us
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!(connection_id = %id, error = %err, "WebSocket receive error");
                    break;
                }
                None => break,
            },
            _ = next_ping(&mut ping_timer) => {
                let now = Instant::now();
                if liveness.is_expired(now) {
                    tracing::warn!(connection_id = %id, "Pong timeout, closing connection");
                    break;
                }
                if control_tx.send(Message::Ping(Vec::new())).is_err() {
                    break;
                }
                liveness.ping_sent(now);
            }
            _ = &mut writer_handle => {
                tracing::debug!(connection_id = %id, "Writer stopped");
                writer_done = true;
                break;
            }
        }
    }

    // Detaching drops the outbound sender, so the writer drains and closes.
    session.disconnect();
    drop(control_tx);

    if !writer_done {
        let abort = writer_handle.abort_handle();
        if timeout(CLOSE_TIMEOUT, writer_handle).await.is_err() {
            tracing::warn!(connection_id = %id, "Writer did not finish, aborting");
            abort.abort();
        }
    }

    tracing::info!(connection_id = %id, "WebSocket disconnected");
}

/// Forward queued messages and control frames to the socket.
/// Ends when the session releases its handle or the socket breaks, then
/// sends a Close frame.
async fn writer_task(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<RelayMessage>,
    mut control_rx: mpsc::UnboundedReceiver<Message>,
) {
    loop {
        tokio::select! {
            queued = rx.recv() => {
                let Some(msg) = queued else { break };
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(err) => {
                        tracing::error!(error = %err, "Failed to encode relay message");
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            Some(frame) = control_rx.recv() => {
                if ws_sender.send(frame).await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = ws_sender.close().await;
}

async fn next_ping(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_are_unique() {
        let a = new_connection_id();
        let b = new_connection_id();
        assert!(a.starts_with("conn_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_liveness_without_ping_never_expires() {
        let liveness = Liveness::new(Duration::from_secs(10));
        assert!(!liveness.is_expired(Instant::now() + Duration::from_secs(3600)));
    }

    #[test]
    fn test_liveness_expires_after_unanswered_ping() {
        let start = Instant::now();
        let mut liveness = Liveness::new(Duration::from_secs(10));
        liveness.ping_sent(start);

        assert!(!liveness.is_expired(start + Duration::from_secs(9)));
        assert!(liveness.is_expired(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_liveness_pong_resets_deadline() {
        let start = Instant::now();
        let mut liveness = Liveness::new(Duration::from_secs(10));
        liveness.ping_sent(start);
        liveness.pong_received();

        assert!(!liveness.is_expired(start + Duration::from_secs(60)));

        liveness.ping_sent(start + Duration::from_secs(60));
        assert!(liveness.is_expired(start + Duration::from_secs(70)));
    }

    #[test]
    fn test_liveness_measures_from_oldest_ping() {
        let start = Instant::now();
        let mut liveness = Liveness::new(Duration::from_secs(10));
        liveness.ping_sent(start);
        liveness.ping_sent(start + Duration::from_secs(8));

        assert!(liveness.is_expired(start + Duration::from_secs(10)));
    }
}
