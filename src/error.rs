use thiserror::Error;

/// Error taxonomy for a collection run.
///
/// Config and Connect/Subscribe/Stream are fatal for the run and
/// surface to the caller with no partial samples. Decode is only
/// raised under `DecodeErrorPolicy::Abort`; the default policy
/// absorbs malformed frames and keeps collecting.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Rejected synchronously, before any connection attempt
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Connection establishment failed (refused, DNS, WS upgrade)
    #[error("connection failed: {0}")]
    Connect(String),

    /// Subscription handshake could not be transmitted
    #[error("subscription send failed: {0}")]
    Subscribe(String),

    /// Transport error or unexpected close while collecting
    #[error("stream error: {0}")]
    Stream(String),

    /// Malformed frame body, with the abort policy in effect
    #[error("malformed frame: {0}")]
    Decode(#[from] serde_json::Error),
}
