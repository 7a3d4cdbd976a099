use serde::{Serialize, Deserialize};
use serde_json::Value;

// ------------------------------------------------------------
// Sample
// ------------------------------------------------------------
//
// One normalized market observation.
//
// Produced by every provider adapter, regardless of which
// exchange or channel the run was pointed at. Field meaning is
// uniform; which source keys feed each field is adapter business.
//
// IMPORTANT:
// - `raw` always carries the original untransformed message
//   (or, for flattened feeds, the original per-entry record).
// - Numeric fields default to 0.0 when the source payload does
//   not carry them. A missing field must never drop a sample.
//
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Sample {
    /// Observation timestamp in milliseconds since Unix epoch
    pub timestamp: i64,

    /// Last / trade price
    pub price: f64,

    /// Best bid price
    pub bid: f64,

    /// Best ask price
    pub ask: f64,

    /// Volume figure (per-trade size or 24h volume, channel-dependent)
    pub volume: f64,

    /// Original inbound message, untouched
    pub raw: Value,
}

// ------------------------------------------------------------
// FeedResult
// ------------------------------------------------------------
//
// The uniform output of one collection run.
//
// Serializes to:
// { "provider": ..., "channel": ..., "symbol": ...,
//   "samples": [...], "stats": { "count": ..., "duration_ms": ...,
//   "stopped_by": ... } }
//
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeedResult {
    /// Resolved venue name (e.g. "binance-futures", "okx")
    pub provider: String,

    /// Resolved channel identifier (e.g. "bookTicker", "kline_5m", "tickers")
    pub channel: String,

    /// Symbol as the caller supplied it
    pub symbol: String,

    /// Collected samples in arrival order
    pub samples: Vec<Sample>,

    /// Run statistics
    pub stats: FeedStats,
}

/// Statistics for one finished collection run.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct FeedStats {
    /// Number of samples in the result.
    ///
    /// For flattening adapters this counts flattened samples,
    /// not raw envelopes.
    pub count: usize,

    /// Observed milliseconds from connection establishment to stop
    pub duration_ms: u64,

    /// Which stop condition ended the run
    pub stopped_by: StopReason,
}

/// The stop condition that terminated a run.
///
/// Reaching the duration budget with zero or partial samples is a
/// successful outcome, not an error.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The buffer reached the configured message limit
    Limit,

    /// The wall-clock budget elapsed first
    Timeout,
}
