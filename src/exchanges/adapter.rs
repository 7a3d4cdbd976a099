use serde::Deserialize;

use crate::{error::FeedError, schema::FeedResult};

/// Logical request handed to a provider adapter.
///
/// Carries what the caller knows (symbol, logical channel, market
/// segment, limits); the adapter resolves it into a concrete
/// endpoint, stream identifier and handshake.
///
/// IMPORTANT:
/// - `channel`, `interval` and `market` are provider-interpreted;
///   each adapter documents its accepted values and defaults.
/// - Validation happens synchronously, before any connection.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedRequest {
    /// Symbol as the caller knows it (e.g. "BTCUSDT")
    pub symbol: String,

    /// Logical channel name; adapter-specific default when None
    pub channel: Option<String>,

    /// Candle interval, only meaningful for kline-style channels
    pub interval: Option<String>,

    /// Cap on collected samples, must be positive
    pub limit: usize,

    /// Wall-clock budget in milliseconds, must be positive
    pub duration_ms: u64,

    /// Market segment (e.g. "spot", "futures", "swap");
    /// adapter-specific default when None
    pub market: Option<String>,
}

impl FeedRequest {
    pub fn new(symbol: impl Into<String>, limit: usize, duration_ms: u64) -> Self {
        Self {
            symbol: symbol.into(),
            channel: None,
            interval: None,
            limit,
            duration_ms,
            market: None,
        }
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    /// Shared parameter checks, run before any connection attempt.
    pub(crate) fn validate(&self) -> Result<(), FeedError> {
        if self.symbol.trim().is_empty() {
            return Err(FeedError::Config("symbol must not be empty".to_string()));
        }
        if self.limit == 0 {
            return Err(FeedError::Config("limit must be positive".to_string()));
        }
        if self.duration_ms == 0 {
            return Err(FeedError::Config(
                "duration_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// ProviderAdapter is the abstraction layer between:
/// - Callers holding a logical `FeedRequest`
/// - Exchange-specific WebSocket protocols
///
/// Each provider implementation must:
/// - Resolve the connection target from its endpoint map
/// - Build the stream identifier or subscription handshake
/// - Normalize inbound messages into `Sample`s
///
/// THREAD SAFETY:
/// - Must be Send + Sync
/// - Adapter instances may be shared across concurrent runs;
///   per-run state lives in the collector, never here
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Canonical provider name, as used by the registry.
    fn name(&self) -> &'static str;

    /// Run one bounded collection window and return the uniform
    /// result. Resolves once the limit or the duration budget is
    /// reached; fails on configuration or connection errors.
    async fn stream(&self, request: FeedRequest) -> Result<FeedResult, FeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_symbol_is_rejected() {
        let err = FeedRequest::new("  ", 5, 1_000).validate().unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = FeedRequest::new("BTCUSDT", 0, 1_000).validate().unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let err = FeedRequest::new("BTCUSDT", 5, 0).validate().unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[test]
    fn builder_sets_optional_fields() {
        let request = FeedRequest::new("BTCUSDT", 5, 1_000)
            .channel("kline")
            .interval("5m")
            .market("spot");
        assert_eq!(request.channel.as_deref(), Some("kline"));
        assert_eq!(request.interval.as_deref(), Some("5m"));
        assert_eq!(request.market.as_deref(), Some("spot"));
        assert!(request.validate().is_ok());
    }
}
