use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use once_cell::sync::Lazy;

/// Global runtime metrics for the collector.
///
/// Purpose:
/// - Track connection and subscription outcomes
/// - Track per-frame throughput and decode failures
/// - Track run outcomes
///
/// Design:
/// - Lock-free (Atomics)
/// - Cheap to update
/// - Safe across concurrent collection runs
#[derive(Default)]
pub struct RuntimeMetrics {
    // Connection level
    pub connections_opened: AtomicUsize,
    pub subscriptions_sent: AtomicUsize,
    pub subscription_errors: AtomicUsize,

    // Frame level
    pub frames_received: AtomicUsize,
    pub decode_errors: AtomicUsize,
    pub messages_accepted: AtomicUsize,

    // Run level
    pub runs_completed: AtomicUsize,
    pub runs_failed: AtomicUsize,
}

/// Global metrics registry (singleton)
pub static METRICS: Lazy<Arc<RuntimeMetrics>> =
    Lazy::new(|| Arc::new(RuntimeMetrics::default()));
