use serde_json::{Value, json};

use crate::{
    collector::{StreamRequest, collect},
    config::Endpoints,
    error::FeedError,
    schema::{FeedResult, FeedStats, Sample},
    util,
};

use super::adapter::{FeedRequest, ProviderAdapter};

// Per-entry field aliases. Tickers carry "last"/"vol24h"; trades
// carry "px"/"sz". OKX ships every number as a decimal string.
const TS_KEYS: &[&str] = &["ts"];
const PRICE_KEYS: &[&str] = &["last", "px"];
const BID_KEYS: &[&str] = &["bidPx"];
const ASK_KEYS: &[&str] = &["askPx"];
const VOLUME_KEYS: &[&str] = &["vol24h", "sz"];

/// OKX market segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OkxMarket {
    Spot,
    Swap,
}

impl OkxMarket {
    /// Swap (perpetual) is the default market segment.
    fn from_request(market: Option<&str>) -> Result<Self, FeedError> {
        match market {
            None | Some("swap") => Ok(Self::Swap),
            Some("spot") => Ok(Self::Spot),
            Some(other) => Err(FeedError::Config(format!("unknown okx market '{other}'"))),
        }
    }
}

/// Derive the OKX instrument pair from a bare symbol by matching
/// the longest known quote-currency suffix.
///
/// Symbols with no known suffix silently assume USDT; logged at
/// warn level since an unusual pair can be misclassified this way.
fn derive_pair(symbol: &str) -> String {
    match util::split_quote(symbol) {
        Some((base, quote)) => format!("{base}-{quote}"),
        None => {
            log::warn!("no known quote suffix in '{symbol}', assuming USDT");
            format!("{}-USDT", symbol.to_uppercase())
        }
    }
}

fn instrument_id(pair: &str, market: OkxMarket) -> String {
    match market {
        OkxMarket::Spot => pair.to_string(),
        OkxMarket::Swap => format!("{pair}-SWAP"),
    }
}

fn subscribe_message(channel: &str, inst_id: &str) -> Value {
    json!({
        "op": "subscribe",
        "args": [{
            "channel": channel,
            "instId": inst_id
        }]
    })
}

/// Only envelopes carrying a non-empty `data` collection count.
/// Subscribe acks, heartbeats and empty pushes are excluded and
/// do not touch the message limit.
fn has_data(envelope: &Value) -> bool {
    envelope
        .get("data")
        .and_then(Value::as_array)
        .is_some_and(|rows| !rows.is_empty())
}

/// Expand accepted envelopes into individual samples, in envelope
/// arrival order, then intra-array order. `raw` on each sample is
/// the per-entry record, not the envelope.
fn flatten(envelopes: &[Value]) -> Vec<Sample> {
    let mut samples = Vec::new();
    for envelope in envelopes {
        let Some(rows) = envelope.get("data").and_then(Value::as_array) else {
            continue;
        };
        for row in rows {
            samples.push(Sample {
                timestamp: util::int_at(row, TS_KEYS).unwrap_or(0),
                price: util::num_at(row, PRICE_KEYS),
                bid: util::num_at(row, BID_KEYS),
                ask: util::num_at(row, ASK_KEYS),
                volume: util::num_at(row, VOLUME_KEYS),
                raw: row.clone(),
            });
        }
    }
    samples
}

/// OKX WebSocket adapter
///
/// OKX WS v5 public channels:
/// https://www.okx.com/docs-v5/en/#overview-websocket
///
/// One public endpoint for every market segment; the instrument
/// id selects spot vs. perpetual. Subscription goes over a
/// handshake frame after connect.
pub struct Okx {
    endpoints: Endpoints,
}

impl Okx {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for Okx {
    fn name(&self) -> &'static str {
        "okx"
    }

    async fn stream(&self, request: FeedRequest) -> Result<FeedResult, FeedError> {
        request.validate()?;

        let market = OkxMarket::from_request(request.market.as_deref())?;
        let channel = request
            .channel
            .clone()
            .unwrap_or_else(|| "tickers".to_string());
        let pair = derive_pair(&request.symbol);
        let inst_id = instrument_id(&pair, market);
        let target = self.endpoints.resolve("okx", "public")?.to_string();

        log::info!("collecting {channel} for {inst_id}");

        // The collector buffers whole envelopes; flattening into
        // per-entry samples happens after the run.
        let run = StreamRequest::new(target, request.limit, request.duration_ms, Value::clone)
            .handshake(subscribe_message(&channel, &inst_id))
            .include(has_data);
        let collected = collect(run).await?;

        let samples = flatten(&collected.messages);

        Ok(FeedResult {
            provider: "okx".to_string(),
            channel,
            symbol: request.symbol,
            stats: FeedStats {
                count: samples.len(),
                duration_ms: collected.elapsed_ms,
                stopped_by: collected.stopped_by,
            },
            samples,
        })
    }
}
