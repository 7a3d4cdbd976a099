//! Bounded WebSocket market-data sampler.
//!
//! Opens one streaming connection to an exchange, performs the
//! exchange-specific subscription handshake where one is needed,
//! buffers and normalizes inbound messages under a dual stop
//! condition (message-count limit OR wall-clock duration), and
//! returns a uniform ordered result regardless of which exchange
//! or channel was used.
//!
//! ```no_run
//! use market_feed_sampler::{Endpoints, FeedRequest, ProviderAdapter, get_adapter};
//!
//! # async fn demo() -> Result<(), market_feed_sampler::FeedError> {
//! let okx = get_adapter("okx", Endpoints::default()).unwrap();
//! let result = okx
//!     .stream(FeedRequest::new("ETHUSDT", 50, 10_000).channel("tickers"))
//!     .await?;
//! println!("{} samples, stopped by {:?}", result.stats.count, result.stats.stopped_by);
//! # Ok(())
//! # }
//! ```

// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// Each module represents a well-defined responsibility:
//
// - config:    Endpoint map keyed by (provider, market)
// - schema:    Strongly typed sample and result definitions
// - error:     Run-level error taxonomy
// - util:      Shared helpers (time, alias lookup, symbol handling)
// - metrics:   Process-wide lock-free runtime counters
// - collector: Bounded single-connection collection runtime
// - exchanges: Provider adapters and adapter registry
//
pub mod collector;
pub mod config;
pub mod error;
pub mod exchanges;
pub mod metrics;
pub mod schema;
pub mod util;

pub use collector::{Collected, DecodeErrorPolicy, StreamRequest, collect};
pub use config::Endpoints;
pub use error::FeedError;
pub use exchanges::adapter::{FeedRequest, ProviderAdapter};
pub use exchanges::binance::BinanceFamily;
pub use exchanges::get_adapter;
pub use exchanges::okx::Okx;
pub use schema::{FeedResult, FeedStats, Sample, StopReason};
