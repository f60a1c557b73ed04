//! WebSocket-backed [`Connection`] adapter.
//!
//! Each socket gets a bounded queue and one writer task. `write_message`
//! is a non-blocking `try_send` into the queue, so a slow peer drops its
//! own messages instead of stalling fan-out to everyone else.

use bytes::Bytes;
use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::debug;

use crate::comms::broadcast::{Connection, SendError};

/// Write half of one subscriber's WebSocket, fed through a bounded
/// queue.
pub struct WsConnection {
    queue: mpsc::Sender<Bytes>,
}

impl WsConnection {
    /// Take ownership of a socket's write half and spawn its writer
    /// task. `capacity` bounds the per-peer queue; once full, further
    /// messages to this peer are dropped.
    ///
    /// The read half stays with the caller's read loop, which detects
    /// the dead peer and removes it from the broadcaster.
    pub fn attach<S>(sink: SplitSink<WebSocketStream<S>, Message>, capacity: usize) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (queue, mut pending) = mpsc::channel::<Bytes>(capacity.max(1));
        tokio::spawn(async move {
            let mut sink = sink;
            while let Some(payload) = pending.recv().await {
                let message = match String::from_utf8(payload.to_vec()) {
                    Ok(text) => Message::Text(text),
                    Err(_) => Message::Binary(payload.to_vec()),
                };
                if let Err(err) = sink.send(message).await {
                    debug!(error = %err, "websocket write failed, stopping writer");
                    break;
                }
            }
        });
        Self { queue }
    }
}

impl Connection for WsConnection {
    fn write_message(&self, payload: Bytes) -> Result<(), SendError> {
        self.queue.try_send(payload).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => SendError::Full,
            mpsc::error::TrySendError::Closed(_) => SendError::Closed,
        })
    }
}
