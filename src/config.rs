use std::collections::HashMap;

use crate::error::FeedError;

// ------------------------------------------------------------
// Endpoint configuration
// ------------------------------------------------------------
//
// WebSocket endpoints keyed by (provider, market segment).
//
// Adapters receive an `Endpoints` value at construction time and
// resolve their targets through it. There is no global mutable
// state; tests and additional venues override entries on their
// own copy.
//
// Adding an exchange is additive: insert its endpoint here (or
// via `with_endpoint`) and register its adapter in the factory.
//
#[derive(Debug, Clone)]
pub struct Endpoints {
    map: HashMap<(String, String), String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        let mut map = HashMap::new();
        let mut insert = |provider: &str, market: &str, url: &str| {
            map.insert((provider.to_string(), market.to_string()), url.to_string());
        };

        insert("binance", "spot", "wss://stream.binance.com:9443/ws");
        insert("binance", "futures", "wss://fstream.binance.com/ws");

        // Aster serves the Binance futures wire format.
        insert("aster", "futures", "wss://fstream.asterdex.com/ws");

        // OKX exposes one public endpoint for every market segment.
        insert("okx", "public", "wss://ws.okx.com:8443/ws/v5/public");

        Self { map }
    }
}

impl Endpoints {
    /// Override or add one endpoint, consuming and returning self
    /// so defaults and overrides chain.
    pub fn with_endpoint(
        mut self,
        provider: &str,
        market: &str,
        url: impl Into<String>,
    ) -> Self {
        self.map
            .insert((provider.to_string(), market.to_string()), url.into());
        self
    }

    /// Resolve the endpoint for a (provider, market) pair.
    ///
    /// Unknown keys are a configuration error, surfaced before
    /// any connection attempt.
    pub fn resolve(&self, provider: &str, market: &str) -> Result<&str, FeedError> {
        self.map
            .get(&(provider.to_string(), market.to_string()))
            .map(String::as_str)
            .ok_or_else(|| {
                FeedError::Config(format!(
                    "no endpoint configured for {provider}/{market}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_covers_all_venues() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.resolve("binance", "spot").unwrap(),
            "wss://stream.binance.com:9443/ws"
        );
        assert_eq!(
            endpoints.resolve("binance", "futures").unwrap(),
            "wss://fstream.binance.com/ws"
        );
        assert_eq!(
            endpoints.resolve("aster", "futures").unwrap(),
            "wss://fstream.asterdex.com/ws"
        );
        assert_eq!(
            endpoints.resolve("okx", "public").unwrap(),
            "wss://ws.okx.com:8443/ws/v5/public"
        );
    }

    #[test]
    fn override_replaces_default() {
        let endpoints =
            Endpoints::default().with_endpoint("binance", "spot", "ws://127.0.0.1:9999");
        assert_eq!(
            endpoints.resolve("binance", "spot").unwrap(),
            "ws://127.0.0.1:9999"
        );
    }

    #[test]
    fn unknown_key_is_config_error() {
        let endpoints = Endpoints::default();
        let err = endpoints.resolve("kraken", "spot").unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }
}
