/// Collector module
///
/// This module groups all logic responsible for:
/// - Owning one WebSocket connection for one bounded run
/// - Sending the optional subscription handshake
/// - Accumulating transformed messages in arrival order
/// - Stopping on the first of message-limit or duration budget
///
/// The collector layer is protocol-agnostic:
/// - Exchange-specific logic MUST NOT live here
/// - Adapters inject targets, handshakes, transforms and
///   inclusion predicates through `StreamRequest`
pub mod runner;

pub use runner::{collect, Collected, DecodeErrorPolicy, StreamRequest};
