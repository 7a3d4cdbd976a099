//! Provider adapter registry and factory
//!
//! This module provides:
//! - Central registration of all supported providers
//! - A factory function to resolve adapters by name
//!
//! All exchange-specific logic must live in dedicated adapter
//! modules. Callers interact exclusively through the
//! `ProviderAdapter` trait.

pub mod adapter;
pub mod binance;
pub mod okx;

use std::sync::Arc;

use adapter::ProviderAdapter;

use crate::config::Endpoints;

/// Returns a provider adapter instance by name.
///
/// Acts as the central factory for all supported providers; the
/// caller-supplied `Endpoints` map is what makes targets
/// overridable per instance.
///
/// RETURNS:
/// - `Some(Arc<dyn ProviderAdapter>)` if the provider is supported
/// - `None` if the provider is unknown
///
/// The Binance family (spot, futures, Aster) is one adapter; the
/// market segment is selected per request.
pub fn get_adapter(name: &str, endpoints: Endpoints) -> Option<Arc<dyn ProviderAdapter>> {
    match name {
        "binance" => Some(Arc::new(binance::BinanceFamily::new(endpoints))),
        "okx" => Some(Arc::new(okx::Okx::new(endpoints))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_resolve() {
        assert!(get_adapter("binance", Endpoints::default()).is_some());
        assert!(get_adapter("okx", Endpoints::default()).is_some());
    }

    #[test]
    fn unknown_provider_is_none() {
        assert!(get_adapter("kraken", Endpoints::default()).is_none());
    }
}
