use serde_json::Value;

use crate::{
    collector::{StreamRequest, collect},
    config::Endpoints,
    error::FeedError,
    schema::{FeedResult, FeedStats, Sample},
    util,
};

use super::adapter::{FeedRequest, ProviderAdapter};

// ------------------------------------------------------------
// Field alias tables
// ------------------------------------------------------------
//
// One ordered list per logical Sample field, evaluated first
// match wins. The order is load-bearing: the 24h ticker carries
// both "c" (last price) and "p" (price CHANGE), so "c" must come
// before "p"; only the trade event, which has no "c", falls
// through to "p". Kline payloads nest under "k".
//
const EVENT_TIME_KEYS: &[&str] = &["E", "T", "k.t"];
const PRICE_KEYS: &[&str] = &["c", "p", "k.c"];
const BID_KEYS: &[&str] = &["b"];
const ASK_KEYS: &[&str] = &["a"];
const VOLUME_KEYS: &[&str] = &["v", "q", "k.v"];

/// Market segment within the Binance wire-format family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinanceMarket {
    Spot,
    Futures,
    /// Aster, an alternate venue serving the Binance futures wire format
    Aster,
}

impl BinanceMarket {
    /// Futures is the default market segment.
    fn from_request(market: Option<&str>) -> Result<Self, FeedError> {
        match market {
            None | Some("futures") => Ok(Self::Futures),
            Some("spot") => Ok(Self::Spot),
            Some("aster") => Ok(Self::Aster),
            Some(other) => Err(FeedError::Config(format!(
                "unknown binance-family market '{other}'"
            ))),
        }
    }

    /// Resolved venue name reported in `FeedResult.provider`.
    fn provider(self) -> &'static str {
        match self {
            Self::Spot => "binance",
            Self::Futures => "binance-futures",
            Self::Aster => "aster",
        }
    }

    fn endpoint_key(self) -> (&'static str, &'static str) {
        match self {
            Self::Spot => ("binance", "spot"),
            Self::Futures => ("binance", "futures"),
            Self::Aster => ("aster", "futures"),
        }
    }
}

/// Supported stream channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinanceChannel {
    Ticker,
    Trade,
    Kline,
    MiniTicker,
    BookTicker,
}

impl BinanceChannel {
    /// Unspecified or unrecognized channel names fall back to the
    /// book ticker.
    fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("ticker") => Self::Ticker,
            Some("trade") => Self::Trade,
            Some("kline") => Self::Kline,
            Some("miniTicker") => Self::MiniTicker,
            _ => Self::BookTicker,
        }
    }

    fn suffix(self, interval: &str) -> String {
        match self {
            Self::Ticker => "ticker".to_string(),
            Self::Trade => "trade".to_string(),
            Self::Kline => format!("kline_{interval}"),
            Self::MiniTicker => "miniTicker".to_string(),
            Self::BookTicker => "bookTicker".to_string(),
        }
    }
}

/// Builds the stream identifier embedded in the connection path:
/// `<lowercased-symbol>@<channel>` or `<symbol>@kline_<interval>`.
fn stream_name(symbol: &str, channel: BinanceChannel, interval: &str) -> String {
    format!("{}@{}", symbol.to_lowercase(), channel.suffix(interval))
}

/// Normalizes one inbound event into a `Sample`.
///
/// Combined-stream frames wrap the event in "data"; single-stream
/// frames are the event itself. Every numeric field resolves
/// through its alias table and defaults to zero; the event time
/// falls back to the current clock only when no source key is
/// present (the spot book ticker carries none).
fn to_sample(raw: &Value) -> Sample {
    let event = raw.get("data").unwrap_or(raw);
    Sample {
        timestamp: util::int_at(event, EVENT_TIME_KEYS).unwrap_or_else(util::now_ms),
        price: util::num_at(event, PRICE_KEYS),
        bid: util::num_at(event, BID_KEYS),
        ask: util::num_at(event, ASK_KEYS),
        volume: util::num_at(event, VOLUME_KEYS),
        raw: raw.clone(),
    }
}

/// Adapter for Binance spot, Binance futures and Aster.
///
/// Binance market streams:
/// https://developers.binance.com/docs/binance-spot-api-docs/websocket-market-streams
///
/// The stream identifier goes into the connection path, so no
/// subscription handshake is required on any family venue.
pub struct BinanceFamily {
    endpoints: Endpoints,
}

impl BinanceFamily {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for BinanceFamily {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn stream(&self, request: FeedRequest) -> Result<FeedResult, FeedError> {
        request.validate()?;

        let market = BinanceMarket::from_request(request.market.as_deref())?;
        let channel = BinanceChannel::from_name(request.channel.as_deref());
        let interval = request.interval.as_deref().unwrap_or("1m");

        let (provider_key, market_key) = market.endpoint_key();
        let base = self.endpoints.resolve(provider_key, market_key)?;
        let stream = stream_name(&request.symbol, channel, interval);
        let target = format!("{base}/{stream}");

        log::info!("collecting {} from {}", stream, market.provider());

        // Every decoded frame becomes one sample: accept-all run.
        let run = StreamRequest::new(target, request.limit, request.duration_ms, to_sample);
        let collected = collect(run).await?;

        Ok(FeedResult {
            provider: market.provider().to_string(),
            channel: channel.suffix(interval),
            symbol: request.symbol,
            stats: FeedStats {
                count: collected.messages.len(),
                duration_ms: collected.elapsed_ms,
                stopped_by: collected.stopped_by,
            },
            samples: collected.messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stream_name_book_ticker() {
        assert_eq!(
            stream_name("BTCUSDT", BinanceChannel::BookTicker, "1m"),
            "btcusdt@bookTicker"
        );
    }

    #[test]
    fn stream_name_kline_with_interval() {
        assert_eq!(
            stream_name("ETHUSDT", BinanceChannel::Kline, "5m"),
            "ethusdt@kline_5m"
        );
    }

    #[test]
    fn channel_defaults_to_book_ticker() {
        assert_eq!(BinanceChannel::from_name(None), BinanceChannel::BookTicker);
        assert_eq!(
            BinanceChannel::from_name(Some("no-such-channel")),
            BinanceChannel::BookTicker
        );
    }

    #[test]
    fn market_defaults_to_futures() {
        assert_eq!(
            BinanceMarket::from_request(None).unwrap(),
            BinanceMarket::Futures
        );
    }

    #[test]
    fn unknown_market_is_config_error() {
        let err = BinanceMarket::from_request(Some("margin")).unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[test]
    fn provider_names_resolve_per_market() {
        assert_eq!(BinanceMarket::Spot.provider(), "binance");
        assert_eq!(BinanceMarket::Futures.provider(), "binance-futures");
        assert_eq!(BinanceMarket::Aster.provider(), "aster");
    }

    #[test]
    fn ticker_event_uses_last_price_not_price_change() {
        let raw = json!({
            "e": "24hrTicker", "E": 1704067200000u64, "s": "BTCUSDT",
            "p": "100.00", "c": "42500.50",
            "b": "42500.00", "a": "42501.00",
            "v": "12345.6", "q": "520000000.0"
        });
        let sample = to_sample(&raw);
        assert_eq!(sample.timestamp, 1704067200000);
        assert_eq!(sample.price, 42500.50);
        assert_eq!(sample.bid, 42500.00);
        assert_eq!(sample.ask, 42501.00);
        assert_eq!(sample.volume, 12345.6);
    }

    #[test]
    fn trade_event_falls_through_to_trade_price() {
        let raw = json!({
            "e": "trade", "E": 1704067200000u64, "s": "BTCUSDT",
            "t": 123456789, "p": "42500.50", "q": "0.001",
            "T": 1704067200123u64, "m": false
        });
        let sample = to_sample(&raw);
        // "E" wins over "T" for the event time
        assert_eq!(sample.timestamp, 1704067200000);
        assert_eq!(sample.price, 42500.50);
        assert_eq!(sample.volume, 0.001);
        // Trades carry no book sides
        assert_eq!(sample.bid, 0.0);
        assert_eq!(sample.ask, 0.0);
    }

    #[test]
    fn kline_event_reads_nested_payload() {
        let raw = json!({
            "e": "kline", "E": 1704067200000u64, "s": "ETHUSDT",
            "k": {
                "t": 1704067140000u64, "T": 1704067199999u64,
                "s": "ETHUSDT", "i": "5m",
                "o": "2200.0", "c": "2215.5", "h": "2216.0", "l": "2199.0",
                "v": "55.5", "n": 120
            }
        });
        let sample = to_sample(&raw);
        assert_eq!(sample.price, 2215.5);
        assert_eq!(sample.volume, 55.5);
    }

    #[test]
    fn spot_book_ticker_falls_back_to_clock_time() {
        let raw = json!({
            "u": 400900217u64, "s": "BNBUSDT",
            "b": "25.3519", "B": "31.21",
            "a": "25.3652", "A": "40.66"
        });
        let before = util::now_ms();
        let sample = to_sample(&raw);
        assert!(sample.timestamp >= before);
        assert_eq!(sample.bid, 25.3519);
        assert_eq!(sample.ask, 25.3652);
        // No price or volume source on the spot book ticker
        assert_eq!(sample.price, 0.0);
        assert_eq!(sample.volume, 0.0);
    }

    #[test]
    fn combined_stream_wrapper_is_unwrapped() {
        let raw = json!({
            "stream": "btcusdt@trade",
            "data": {
                "e": "trade", "E": 1704067200000u64, "s": "BTCUSDT",
                "p": "42500.50", "q": "0.001", "T": 1704067200123u64
            }
        });
        let sample = to_sample(&raw);
        assert_eq!(sample.price, 42500.50);
        // raw keeps the wrapper untouched
        assert!(sample.raw.get("stream").is_some());
    }

    #[tokio::test]
    async fn zero_limit_fails_before_any_connection() {
        // Endpoint resolution would fail too; Config must win first.
        let adapter = BinanceFamily::new(Endpoints::default());
        let err = adapter
            .stream(FeedRequest::new("BTCUSDT", 0, 1_000))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[tokio::test]
    async fn zero_duration_fails_before_any_connection() {
        let adapter = BinanceFamily::new(Endpoints::default());
        let err = adapter
            .stream(FeedRequest::new("BTCUSDT", 5, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }
}
