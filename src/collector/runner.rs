use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use once_cell::sync::Lazy;
use rustls::crypto::{CryptoProvider, ring};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
    tungstenite::Utf8Bytes,
};

use crate::{error::FeedError, metrics::METRICS, schema::StopReason};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// rustls >= 0.23 requires an explicit CryptoProvider installation,
// exactly once per process. A host application may already have
// installed one; a second install fails and is ignored.
static CRYPTO_PROVIDER: Lazy<()> = Lazy::new(|| {
    let _ = CryptoProvider::install_default(ring::default_provider());
});

/// What to do when a text frame fails to decode as JSON.
///
/// The duration/limit contract implies resilience to individual
/// bad frames, so `Skip` is the default. `Abort` is available for
/// callers that treat any malformed frame as a poisoned feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeErrorPolicy {
    /// Drop the single malformed frame and keep collecting
    #[default]
    Skip,

    /// Fail the whole run with `FeedError::Decode`
    Abort,
}

/// Configuration for one collection run.
///
/// Constructed fresh per call, owns no shared state, and does not
/// outlive the run. Generic over the transformed message type so
/// adapters can buffer normalized samples or raw envelopes alike.
///
/// CONTRACT:
/// - `transform` must be pure protocol translation
/// - `should_include` decides what counts toward `message_limit`
/// - `handshake`, when set, is sent as one text frame right after
///   the connection is established
pub struct StreamRequest<T> {
    /// WebSocket endpoint for this run
    pub target: String,

    /// Cap on accepted messages, must be positive
    pub message_limit: usize,

    /// Wall-clock budget in milliseconds, must be positive
    pub duration_ms: u64,

    /// Optional subscription payload sent once on connect
    pub handshake: Option<Value>,

    /// Per-frame mapping from decoded JSON to the buffered type
    pub transform: Box<dyn Fn(&Value) -> T + Send + Sync>,

    /// Inclusion predicate; None means accept-all
    pub should_include: Option<Box<dyn Fn(&T) -> bool + Send + Sync>>,

    /// Malformed-frame policy for this run
    pub decode_errors: DecodeErrorPolicy,
}

impl<T> StreamRequest<T> {
    pub fn new(
        target: impl Into<String>,
        message_limit: usize,
        duration_ms: u64,
        transform: impl Fn(&Value) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            target: target.into(),
            message_limit,
            duration_ms,
            handshake: None,
            transform: Box::new(transform),
            should_include: None,
            decode_errors: DecodeErrorPolicy::default(),
        }
    }

    /// Attach a subscription handshake payload.
    pub fn handshake(mut self, payload: Value) -> Self {
        self.handshake = Some(payload);
        self
    }

    /// Attach an inclusion predicate.
    pub fn include(mut self, keep: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.should_include = Some(Box::new(keep));
        self
    }

    /// Override the malformed-frame policy.
    pub fn decode_errors(mut self, policy: DecodeErrorPolicy) -> Self {
        self.decode_errors = policy;
        self
    }
}

/// The outcome of one successful collection run.
#[derive(Debug)]
pub struct Collected<T> {
    /// Accepted messages in arrival order, len <= message_limit
    pub messages: Vec<T>,

    /// Which stop condition ended the run
    pub stopped_by: StopReason,

    /// Observed milliseconds from establishment to stop
    pub elapsed_ms: u64,
}

/// Runs one bounded collection window against `request.target`.
///
/// Lifecycle:
/// - Validate limits, connect, send the optional handshake
/// - Read frames until the message limit or the duration budget
///   is reached, whichever fires first
/// - Close the connection on every exit path, then resolve
///
/// GUARANTEES:
/// - The buffer preserves arrival order, no reordering or dedup
/// - `messages.len() <= message_limit` always
/// - A run that times out with zero or partial messages is a
///   successful result, not an error
/// - Connection-level failures (refused, reset, handshake send)
///   fail the run with no partial data
pub async fn collect<T>(request: StreamRequest<T>) -> Result<Collected<T>, FeedError> {
    if request.message_limit == 0 {
        return Err(FeedError::Config(
            "message_limit must be positive".to_string(),
        ));
    }
    if request.duration_ms == 0 {
        return Err(FeedError::Config("duration_ms must be positive".to_string()));
    }

    Lazy::force(&CRYPTO_PROVIDER);

    let (ws, _) = connect_async(request.target.as_str())
        .await
        .map_err(|e| FeedError::Connect(e.to_string()))?;
    METRICS.connections_opened.fetch_add(1, Ordering::Relaxed);

    let started = Instant::now();
    let (mut write, mut read) = ws.split();

    let outcome = run_window(&request, &mut write, &mut read).await;

    // Teardown happens exactly once, on success and error alike.
    let _ = write.close().await;

    match outcome {
        Ok((messages, stopped_by)) => {
            METRICS.runs_completed.fetch_add(1, Ordering::Relaxed);
            Ok(Collected {
                messages,
                stopped_by,
                elapsed_ms: started.elapsed().as_millis() as u64,
            })
        }
        Err(e) => {
            METRICS.runs_failed.fetch_add(1, Ordering::Relaxed);
            Err(e)
        }
    }
}

/// Handshake send plus the read loop, racing the duration budget.
///
/// Factored out so `collect` can close the sink regardless of
/// which path this returns on.
async fn run_window<T>(
    request: &StreamRequest<T>,
    write: &mut SplitSink<WsStream, Message>,
    read: &mut SplitStream<WsStream>,
) -> Result<(Vec<T>, StopReason), FeedError> {
    if let Some(payload) = &request.handshake {
        write
            .send(Message::Text(Utf8Bytes::from(payload.to_string())))
            .await
            .map_err(|e| {
                METRICS.subscription_errors.fetch_add(1, Ordering::Relaxed);
                FeedError::Subscribe(e.to_string())
            })?;
        METRICS.subscriptions_sent.fetch_add(1, Ordering::Relaxed);
    }

    let deadline = sleep(Duration::from_millis(request.duration_ms));
    tokio::pin!(deadline);

    let mut messages: Vec<T> = Vec::new();

    loop {
        tokio::select! {
            // The timer interrupts an in-progress wait deterministically.
            () = &mut deadline => {
                log::debug!(
                    "duration budget elapsed with {}/{} messages",
                    messages.len(),
                    request.message_limit
                );
                return Ok((messages, StopReason::Timeout));
            }

            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    METRICS.frames_received.fetch_add(1, Ordering::Relaxed);

                    let value: Value = match serde_json::from_str(text.as_str()) {
                        Ok(v) => v,
                        Err(e) => {
                            METRICS.decode_errors.fetch_add(1, Ordering::Relaxed);
                            match request.decode_errors {
                                DecodeErrorPolicy::Skip => {
                                    log::debug!("skipping malformed frame: {e}");
                                    continue;
                                }
                                DecodeErrorPolicy::Abort => return Err(FeedError::Decode(e)),
                            }
                        }
                    };

                    let message = (request.transform)(&value);
                    let included = request
                        .should_include
                        .as_ref()
                        .is_none_or(|keep| keep(&message));
                    if included {
                        messages.push(message);
                        METRICS.messages_accepted.fetch_add(1, Ordering::Relaxed);
                        if messages.len() >= request.message_limit {
                            return Ok((messages, StopReason::Limit));
                        }
                    }
                }

                Some(Ok(Message::Ping(payload))) => {
                    write
                        .send(Message::Pong(payload))
                        .await
                        .map_err(|e| FeedError::Stream(e.to_string()))?;
                }

                // Ignore other non-text frames (pong/binary)
                Some(Ok(Message::Pong(_) | Message::Binary(_) | Message::Frame(_))) => {}

                Some(Ok(Message::Close(_))) => {
                    return Err(FeedError::Stream(
                        "server closed the connection mid-run".to_string(),
                    ));
                }

                Some(Err(e)) => return Err(FeedError::Stream(e.to_string())),

                None => {
                    return Err(FeedError::Stream(
                        "stream ended before a stop condition fired".to_string(),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_message_limit_is_rejected_before_connecting() {
        // An unroutable target proves validation happens first.
        let request = StreamRequest::new("ws://0.0.0.0:1", 0, 1_000, Value::clone);
        let err = collect(request).await.unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[tokio::test]
    async fn zero_duration_is_rejected_before_connecting() {
        let request = StreamRequest::new("ws://0.0.0.0:1", 5, 0, Value::clone);
        let err = collect(request).await.unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[tokio::test]
    async fn unreachable_target_is_a_connect_error() {
        let request = StreamRequest::new("ws://127.0.0.1:1", 5, 500, Value::clone);
        let err = collect(request).await.unwrap_err();
        assert!(matches!(err, FeedError::Connect(_)));
    }

    #[test]
    fn decode_policy_defaults_to_skip() {
        let request = StreamRequest::new("ws://example", 1, 1, Value::clone);
        assert_eq!(request.decode_errors, DecodeErrorPolicy::Skip);
    }
}
