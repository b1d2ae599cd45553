//! axum WebSocket implementation of the transport seams.
//!
//! After the HTTP upgrade, the `WebSocket` is split into independently owned
//! halves.  The write half becomes a [`WsSink`] and the read half a
//! [`WsSource`], so the relay can write to a client from any broadcasting
//! task while that client's own read loop keeps waiting for input.
//!
//! Both adapters are generic over the underlying sink/stream so they can be
//! exercised without a live socket.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tracing::debug;

use super::{MessageSink, MessageSource, TransportError};

/// Splits an upgraded WebSocket into the relay's sink and source halves.
pub fn split_websocket(
    socket: WebSocket,
) -> (
    WsSink<SplitSink<WebSocket, Message>>,
    WsSource<SplitStream<WebSocket>>,
) {
    let (tx, rx) = socket.split();
    (WsSink::new(tx), WsSource::new(rx))
}

/// Write half of a client WebSocket.
pub struct WsSink<S> {
    inner: S,
}

impl<S> WsSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

/// Read half of a client WebSocket.
pub struct WsSource<S> {
    inner: S,
}

impl<S> WsSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S> MessageSink for WsSink<S>
where
    S: Sink<Message, Error = axum::Error> + Unpin + Send,
{
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.inner
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))
    }

    async fn close(&mut self) {
        // Sends a Close frame if one has not been sent yet, then flushes.
        if let Err(e) = self.inner.close().await {
            debug!("WebSocket close did not complete cleanly: {e}");
        }
    }
}

#[async_trait]
impl<S> MessageSource for WsSource<S>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin + Send,
{
    async fn next_payload(&mut self) -> Result<Vec<u8>, TransportError> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().as_bytes().to_vec()),
                Some(Ok(Message::Binary(bytes))) => return Ok(bytes.to_vec()),
                Some(Ok(Message::Close(frame))) => {
                    debug!("WebSocket Close frame received: {frame:?}");
                    return Err(TransportError::Closed);
                }
                // Pong replies to pings are queued by the WebSocket layer.
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Err(e)) => return Err(TransportError::WebSocket(e.to_string())),
                None => return Err(TransportError::Closed),
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::ws::CloseFrame;
    use futures_util::stream;

    fn source_of(
        items: Vec<Result<Message, axum::Error>>,
    ) -> WsSource<impl Stream<Item = Result<Message, axum::Error>> + Unpin + Send> {
        WsSource::new(stream::iter(items))
    }

    /// A sink that records every message written to it.
    fn recording() -> (
        WsSink<impl Sink<Message, Error = axum::Error> + Unpin + Send>,
        Arc<Mutex<Vec<Message>>>,
    ) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&written);
        let sink = futures_util::sink::unfold(log, |log, msg: Message| async move {
            log.lock().unwrap().push(msg);
            Ok::<_, axum::Error>(log)
        });
        (WsSink::new(Box::pin(sink)), written)
    }

    #[tokio::test]
    async fn test_sink_sends_text_frame() {
        let (mut sink, written) = recording();

        sink.send_text(r#"{"data":"x","isUser":false}"#).await.unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        match &written[0] {
            Message::Text(text) => assert_eq!(text.as_str(), r#"{"data":"x","isUser":false}"#),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sink_write_error_is_websocket_error() {
        let failing = futures_util::sink::unfold((), |(), _msg: Message| async move {
            Err::<(), _>(axum::Error::new("broken pipe"))
        });
        let mut sink = WsSink::new(Box::pin(failing));

        let result = sink.send_text("x").await;

        assert!(matches!(result, Err(TransportError::WebSocket(_))));
    }

    #[tokio::test]
    async fn test_source_returns_text_and_binary_payloads() {
        let mut source = source_of(vec![
            Ok(Message::Text("hi".into())),
            Ok(Message::Binary(vec![1, 2, 3].into())),
        ]);

        assert_eq!(source.next_payload().await.unwrap(), b"hi".to_vec());
        assert_eq!(source.next_payload().await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_source_skips_ping_and_pong() {
        let mut source = source_of(vec![
            Ok(Message::Ping(vec![9].into())),
            Ok(Message::Pong(vec![9].into())),
            Ok(Message::Text("after ping".into())),
        ]);

        assert_eq!(source.next_payload().await.unwrap(), b"after ping".to_vec());
    }

    #[tokio::test]
    async fn test_source_reports_closed_on_close_frame() {
        let mut source = source_of(vec![
            Ok(Message::Close(Some(CloseFrame {
                code: 1000,
                reason: "bye".into(),
            }))),
            Ok(Message::Text("never read".into())),
        ]);

        assert_eq!(source.next_payload().await, Err(TransportError::Closed));
    }

    #[tokio::test]
    async fn test_source_reports_closed_at_end_of_stream() {
        let mut source = source_of(vec![]);

        assert_eq!(source.next_payload().await, Err(TransportError::Closed));
    }

    #[tokio::test]
    async fn test_source_read_error_is_websocket_error() {
        let mut source = source_of(vec![Err(axum::Error::new("bad frame"))]);

        let result = source.next_payload().await;

        assert!(matches!(result, Err(TransportError::WebSocket(_))));
    }
}
