//! Realtime change notifier.
//!
//! Clients send `{"event":"change"}` after mutating something. The server
//! passes it to every other connected socket so they can refetch, and does the
//! same after every successful REST write. Delivery is best-effort: a socket
//! that falls behind skips what it missed, and nothing is replayed.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use planner_shared::realtime::RealtimeMessage;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::state::AppState;

/// Fan-out of change signals, tagged with the connection that sent them.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<Uuid>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns how many sockets were listening.
    pub fn publish(&self, origin: Uuid) -> usize {
        self.sender.send(origin).unwrap_or(0)
    }

    /// Signal a write that came in over HTTP. No socket owns the nil id, so
    /// every connection hears it.
    pub fn announce(&self) -> usize {
        self.publish(Uuid::nil())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Uuid> {
        self.sender.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

pub async fn socket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.notifier))
}

async fn handle_socket(socket: WebSocket, notifier: ChangeNotifier) {
    let connection_id = Uuid::new_v4();
    tracing::debug!(%connection_id, "Socket connected");

    let (sink, stream) = socket.split();
    let changes = notifier.subscribe();

    let mut send_task = tokio::spawn(forward_changes(changes, connection_id, sink));
    let mut recv_task = tokio::spawn(relay_changes(stream, connection_id, notifier));

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!(%connection_id, "Socket disconnected");
}

/// Push a `change` frame for every signal that did not come from this
/// connection. Ends when the socket or the notifier goes away.
async fn forward_changes<S>(mut changes: broadcast::Receiver<Uuid>, connection_id: Uuid, mut sink: S)
where
    S: Sink<Message> + Unpin,
{
    let frame = match RealtimeMessage::Change.encode() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!("Failed to encode change frame: {}", e);
            return;
        }
    };

    loop {
        match changes.recv().await {
            Ok(origin) if origin == connection_id => continue,
            Ok(_) => {
                if sink.send(Message::Text(frame.clone())).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(%connection_id, skipped, "Socket lagged behind change signals");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Publish every `change` this connection sends; ignore anything else.
async fn relay_changes<St, E>(mut stream: St, connection_id: Uuid, notifier: ChangeNotifier)
where
    St: Stream<Item = Result<Message, E>> + Unpin,
{
    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                if RealtimeMessage::decode(&text) == Some(RealtimeMessage::Change) {
                    let listeners = notifier.publish(connection_id);
                    tracing::debug!(%connection_id, listeners, "Change signal broadcast");
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;

    fn change_text() -> Message {
        Message::Text(r#"{"event":"change"}"#.to_string())
    }

    #[test]
    fn publish_without_listeners_is_not_an_error() {
        let notifier = ChangeNotifier::default();
        assert_eq!(notifier.publish(Uuid::new_v4()), 0);
    }

    #[tokio::test]
    async fn announced_changes_reach_every_socket() {
        let notifier = ChangeNotifier::new(8);
        let (tx, rx) = mpsc::unbounded::<Message>();

        let changes = notifier.subscribe();
        assert_eq!(notifier.announce(), 1);
        drop(notifier);

        forward_changes(changes, Uuid::new_v4(), tx).await;
        assert_eq!(rx.collect::<Vec<_>>().await.len(), 1);
    }

    #[tokio::test]
    async fn forward_skips_own_changes() {
        let notifier = ChangeNotifier::new(8);
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded::<Message>();

        let changes = notifier.subscribe();
        notifier.publish(me);
        notifier.publish(other);
        notifier.publish(me);
        drop(notifier);

        forward_changes(changes, me, tx).await;

        let frames: Vec<Message> = rx.collect().await;
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            Message::Text(text) => assert_eq!(text, r#"{"event":"change"}"#),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[tokio::test]
    async fn relay_publishes_only_change_frames() {
        let notifier = ChangeNotifier::new(8);
        let mut listener = notifier.subscribe();
        let sender = Uuid::new_v4();

        let incoming = futures::stream::iter(vec![
            Ok::<_, axum::Error>(Message::Text("hello".to_string())),
            Ok(change_text()),
            Ok(Message::Ping(vec![1])),
            Ok(Message::Close(None)),
            Ok(change_text()),
        ]);

        relay_changes(incoming, sender, notifier).await;

        assert_eq!(listener.recv().await.unwrap(), sender);
        assert!(matches!(listener.recv().await, Err(RecvError::Closed)));
    }
}
